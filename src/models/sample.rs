use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metric::Metric;

/// One timestamped snapshot of the tracked counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub total_views: i64,
    pub average_views: i64,
    pub favorites: i64,
    pub followers: i64,
    pub ratings: i64,
    pub pages: i64,
    pub timestamp: DateTime<Utc>,
}

/// Column name for the epoch-seconds timestamp.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

impl Sample {
    /// All counters zero, stamped with `timestamp`. Fill in with [`Sample::set`]
    /// or [`Sample::with`] so every value is paired with its metric by name.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            total_views: 0,
            average_views: 0,
            favorites: 0,
            followers: 0,
            ratings: 0,
            pages: 0,
            timestamp,
        }
    }

    /// [`Sample::at`] the current instant.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn with(mut self, metric: Metric, value: i64) -> Self {
        self.set(metric, value);
        self
    }

    pub fn set(&mut self, metric: Metric, value: i64) {
        let field = match metric {
            Metric::TotalViews => &mut self.total_views,
            Metric::AverageViews => &mut self.average_views,
            Metric::Followers => &mut self.followers,
            Metric::Favorites => &mut self.favorites,
            Metric::Ratings => &mut self.ratings,
            Metric::Pages => &mut self.pages,
        };
        *field = value;
    }

    pub fn value(&self, metric: Metric) -> i64 {
        match metric {
            Metric::TotalViews => self.total_views,
            Metric::AverageViews => self.average_views,
            Metric::Followers => self.followers,
            Metric::Favorites => self.favorites,
            Metric::Ratings => self.ratings,
            Metric::Pages => self.pages,
        }
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.timestamp.timestamp()
    }

    /// Every persisted column paired with its value, counters in canonical order
    /// and the timestamp (epoch seconds) last.
    pub fn column_values(&self) -> Vec<(&'static str, i64)> {
        Metric::ALL
            .iter()
            .map(|metric| (metric.column(), self.value(*metric)))
            .chain(std::iter::once((TIMESTAMP_COLUMN, self.epoch_seconds())))
            .collect()
    }
}
