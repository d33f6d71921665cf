//! Error taxonomy shared by the store, the scraper and the display pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    /// Store file missing in read-only mode, or no sample satisfies a lookup.
    #[error("not found: {entity} ({detail})")]
    NotFound { entity: &'static str, detail: String },

    /// Fetched page or stored row does not have the expected shape.
    #[error("malformed data: {0}")]
    Malformed(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("database failure: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Write attempted through a store opened read-only.
    #[error("store is opened read-only")]
    ReadOnly,

    /// External renderer (figlet, gnuplot) failed or could not be spawned.
    #[error("renderer failed: {0}")]
    Render(String),

    #[error("settings error: {0}")]
    Settings(String),
}

impl StatsError {
    pub fn not_found(entity: &'static str, detail: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            detail: detail.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
