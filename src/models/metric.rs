use serde::{Deserialize, Serialize};

/// The six tracked counters, in the store's column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    TotalViews,
    AverageViews,
    Followers,
    Favorites,
    Ratings,
    Pages,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::TotalViews,
        Metric::AverageViews,
        Metric::Followers,
        Metric::Favorites,
        Metric::Ratings,
        Metric::Pages,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalViews => "total_views",
            Metric::AverageViews => "average_views",
            Metric::Followers => "followers",
            Metric::Favorites => "favorites",
            Metric::Ratings => "ratings",
            Metric::Pages => "pages",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalViews => "Total Views",
            Metric::AverageViews => "Average Views",
            Metric::Followers => "Followers",
            Metric::Favorites => "Favorites",
            Metric::Ratings => "Ratings",
            Metric::Pages => "Pages",
        }
    }

    /// Settings-file spelling (`totalViews`, ...).
    pub fn key(self) -> &'static str {
        match self {
            Metric::TotalViews => "totalViews",
            Metric::AverageViews => "averageViews",
            Metric::Followers => "followers",
            Metric::Favorites => "favorites",
            Metric::Ratings => "ratings",
            Metric::Pages => "pages",
        }
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|metric| metric.key() == key)
    }
}
