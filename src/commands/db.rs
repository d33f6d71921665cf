use crate::error::{Result, StatsError};
use crate::models::metric::Metric;
use crate::models::sample::{Sample, TIMESTAMP_COLUMN};
use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, Value};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const STATS_TABLE: &str = "stats";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Creates the file if needed and may initialize the schema.
    ReadWrite,
    /// Never creates the file nor touches the schema.
    ReadOnly,
}

/// Append-only log of samples in a single SQLite file.
pub struct SampleStore {
    conn: Connection,
    path: PathBuf,
    mode: AccessMode,
}

/// `<data dir>/rr_stats/rr_stats.sqlite`
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rr_stats")
        .join("rr_stats.sqlite")
}

impl SampleStore {
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let conn = match mode {
            AccessMode::ReadWrite => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                Connection::open_with_flags(
                    &path,
                    OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
                )?
            }
            AccessMode::ReadOnly => {
                if !path.is_file() {
                    return Err(StatsError::not_found(
                        "sample store",
                        path.display().to_string(),
                    ));
                }
                Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)?
            }
        };
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let store = Self { conn, path, mode };
        if mode == AccessMode::ReadWrite {
            store.ensure_schema()?;
        }

        log::debug!("opened sample store {} ({:?})", store.path.display(), mode);
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Create the stats table if absent. Safe to call before every write.
    pub fn ensure_schema(&self) -> Result<()> {
        if self.mode == AccessMode::ReadOnly {
            return if self.has_table()? {
                Ok(())
            } else {
                Err(StatsError::ReadOnly)
            };
        }

        let columns: Vec<String> = Metric::ALL
            .iter()
            .map(|metric| format!("{} INTEGER NOT NULL", metric.column()))
            .chain(std::iter::once(format!("{TIMESTAMP_COLUMN} INTEGER NOT NULL")))
            .collect();

        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {STATS_TABLE} ({columns});
             CREATE INDEX IF NOT EXISTS idx_stats_timestamp ON {STATS_TABLE}({TIMESTAMP_COLUMN});",
            columns = columns.join(", "),
        ))?;

        Ok(())
    }

    /// Insert one row. Every value is bound through the named parameter of its
    /// own column.
    pub fn append(&self, sample: &Sample) -> Result<()> {
        if self.mode == AccessMode::ReadOnly {
            return Err(StatsError::ReadOnly);
        }

        let pairs = sample.column_values();
        let names: Vec<String> = pairs.iter().map(|(column, _)| format!(":{column}")).collect();
        let columns: Vec<&str> = pairs.iter().map(|(column, _)| *column).collect();
        let params: Vec<(&str, &dyn ToSql)> = names
            .iter()
            .zip(pairs.iter())
            .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
            .collect();

        self.conn.execute(
            &format!(
                "INSERT INTO {STATS_TABLE} ({}) VALUES ({})",
                columns.join(", "),
                names.join(", ")
            ),
            params.as_slice(),
        )?;

        log::info!(
            "recorded sample at {} (total views {})",
            sample.timestamp.to_rfc3339(),
            sample.total_views
        );
        Ok(())
    }

    /// Every stored sample, in no particular order.
    pub fn read_all(&self) -> Result<Vec<Sample>> {
        if !self.has_table()? {
            return Ok(Vec::new());
        }

        let columns: Vec<&str> = Metric::ALL
            .iter()
            .map(|metric| metric.column())
            .chain(std::iter::once(TIMESTAMP_COLUMN))
            .collect();
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM {STATS_TABLE}", columns.join(", ")))?;

        let rows = stmt.query_map([], |row| Ok(decode_row(row)))?;

        let mut samples = Vec::new();
        for row in rows {
            samples.push(row??);
        }
        Ok(samples)
    }

    /// `read_all` sorted by timestamp, oldest first.
    pub fn read_sorted(&self) -> Result<Vec<Sample>> {
        let mut samples = self.read_all()?;
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }

    fn has_table(&self) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [STATS_TABLE],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn decode_row(row: &Row<'_>) -> Result<Sample> {
    let timestamp = decode_timestamp(row.get::<_, Value>(TIMESTAMP_COLUMN)?)?;
    let mut sample = Sample::at(timestamp);

    // Looked up by column name so each value lands in the field of its own metric.
    for metric in Metric::ALL {
        let value = decode_integer(row.get::<_, Value>(metric.column())?, metric.column())?;
        sample.set(metric, value);
    }

    Ok(sample)
}

fn decode_integer(value: Value, column: &str) -> Result<i64> {
    match value {
        Value::Integer(v) if v >= 0 => Ok(v),
        other => Err(StatsError::Malformed(format!(
            "column {column} holds {other:?}, expected a non-negative integer"
        ))),
    }
}

// Older rows stored fractional epoch seconds.
fn decode_timestamp(value: Value) -> Result<DateTime<Utc>> {
    let secs = match value {
        Value::Integer(v) => v,
        Value::Real(v) if v.is_finite() => v.trunc() as i64,
        other => {
            return Err(StatsError::Malformed(format!(
                "timestamp holds {other:?}, expected epoch seconds"
            )))
        }
    };

    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StatsError::Malformed(format!("timestamp {secs} out of range")))
}
