use crate::error::{Result, StatsError};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// Run `on_change` once, then again after every debounced change to the store
/// file. Blocks until the watcher shuts down; runs never overlap.
pub fn watch_store<F>(store_path: &Path, debounce: Duration, on_change: F) -> Result<usize>
where
    F: FnMut() -> Result<()>,
{
    let store_path = store_path
        .canonicalize()
        .map_err(|_| StatsError::not_found("sample store", store_path.display().to_string()))?;
    // SQLite may replace side files, so watch the directory and filter by path.
    let directory = store_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(debounce, tx)
        .map_err(|e| StatsError::Io(std::io::Error::other(format!("watcher init error: {e}"))))?;
    debouncer
        .watcher()
        .watch(&directory, RecursiveMode::NonRecursive)
        .map_err(|e| StatsError::Io(std::io::Error::other(format!("watch error: {e}"))))?;

    log::info!("watching {} for changes", store_path.display());
    drive_rebuilds(&rx, &store_path, on_change)
}

/// Consume watcher batches until the channel closes, invoking `on_change`
/// synchronously for the initial render and for each batch that touches
/// `store_path`. Returns how many runs were made.
pub fn drive_rebuilds<F>(
    rx: &mpsc::Receiver<DebounceEventResult>,
    store_path: &Path,
    mut on_change: F,
) -> Result<usize>
where
    F: FnMut() -> Result<()>,
{
    let mut runs = 0;
    run_once(&mut on_change, &mut runs);

    for batch in rx.iter() {
        match batch {
            Ok(events) => {
                if events.iter().any(|event| event.path == store_path) {
                    log::debug!("store changed ({} events)", events.len());
                    run_once(&mut on_change, &mut runs);
                }
            }
            Err(e) => log::warn!("watch error: {e}"),
        }
    }

    Ok(runs)
}

fn run_once<F>(on_change: &mut F, runs: &mut usize)
where
    F: FnMut() -> Result<()>,
{
    *runs += 1;
    if let Err(e) = on_change() {
        log::error!("display run failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_debouncer_mini::{DebouncedEvent, DebouncedEventKind};

    fn event(path: &Path) -> DebouncedEvent {
        DebouncedEvent {
            path: path.to_path_buf(),
            kind: DebouncedEventKind::Any,
        }
    }

    #[test]
    fn reruns_only_for_store_changes() {
        let store = PathBuf::from("/data/rr_stats/rr_stats.sqlite");
        let journal = PathBuf::from("/data/rr_stats/rr_stats.sqlite-journal");
        let (tx, rx) = mpsc::channel();

        tx.send(Ok(vec![event(&journal)])).unwrap();
        tx.send(Ok(vec![event(&journal), event(&store)])).unwrap();
        tx.send(Ok(vec![event(&store)])).unwrap();
        drop(tx);

        let mut calls = 0;
        let runs = drive_rebuilds(&rx, &store, || {
            calls += 1;
            Ok(())
        })
        .expect("drive");

        assert_eq!(runs, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn failed_run_does_not_stop_the_loop() {
        let store = PathBuf::from("/tmp/store.sqlite");
        let (tx, rx) = mpsc::channel();
        tx.send(Ok(vec![event(&store)])).unwrap();
        drop(tx);

        let mut calls = 0;
        let runs = drive_rebuilds(&rx, &store, || {
            calls += 1;
            Err(StatsError::not_found("sample", "empty"))
        })
        .expect("drive");

        assert_eq!(runs, 2);
        assert_eq!(calls, 2);
    }

    #[test]
    fn missing_store_is_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = watch_store(&dir.path().join("nope.sqlite"), Duration::from_millis(50), || Ok(()))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
