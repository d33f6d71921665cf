use serde::{Deserialize, Serialize};

use super::metric::Metric;
use super::sample::Sample;

/// One metric's current value and its day-over-day change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub metric: Metric,
    pub current: i64,
    pub delta: Option<i64>, // None when no lag sample exists
}

impl MetricDelta {
    pub fn label(&self) -> &'static str {
        self.metric.label()
    }
}

/// Column-labelled rows handed to the chart sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub metrics: Vec<Metric>,
    pub rows: Vec<ChartRow>,
    pub x_min: i64,
    pub x_max: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub timestamp: i64,
    pub values: Vec<i64>, // same order as ChartData::metrics
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub columns: u16,
    pub rows: u16,
}

impl Default for TermSize {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOutcome {
    Rendered {
        current: Sample,
        lag: Sample,
        deltas: Vec<MetricDelta>,
    },
    /// History does not yet reach back a day from the latest sample.
    InsufficientHistory {
        current: Sample,
        deltas: Vec<MetricDelta>,
    },
}

impl DisplayOutcome {
    pub fn current(&self) -> &Sample {
        match self {
            DisplayOutcome::Rendered { current, .. } => current,
            DisplayOutcome::InsufficientHistory { current, .. } => current,
        }
    }

    pub fn deltas(&self) -> &[MetricDelta] {
        match self {
            DisplayOutcome::Rendered { deltas, .. } => deltas,
            DisplayOutcome::InsufficientHistory { deltas, .. } => deltas,
        }
    }
}
