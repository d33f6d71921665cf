use chrono::{TimeZone, Utc};
use rr_stats_lib::commands::db::{AccessMode, SampleStore};
use rr_stats_lib::commands::display::{run_display_internal, DisplaySinks};
use rr_stats_lib::commands::sample::record_sample;
use rr_stats_lib::error::{Result, StatsError};
use rr_stats_lib::models::display::{ChartData, DisplayOutcome, TermSize};
use rr_stats_lib::models::metric::Metric;
use rr_stats_lib::models::sample::Sample;
use rr_stats_lib::render::{ChartSink, Justification, NumeralRenderer};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DAY: i64 = 86_400;
const START: i64 = 1_700_000_000;
const TERMINAL: TermSize = TermSize {
    columns: 80,
    rows: 24,
};

#[derive(Default)]
struct RecordingNumerals {
    calls: RefCell<Vec<(String, Option<usize>, Justification)>>,
}

impl NumeralRenderer for RecordingNumerals {
    fn render(&self, text: &str, width: Option<usize>, justification: Justification) -> Result<String> {
        self.calls
            .borrow_mut()
            .push((text.to_string(), width, justification));
        Ok(format!("[{text}]\n"))
    }
}

#[derive(Default)]
struct RecordingChart {
    charts: Vec<(ChartData, TermSize)>,
}

impl ChartSink for RecordingChart {
    fn render(&mut self, chart: &ChartData, size: TermSize) -> Result<()> {
        self.charts.push((chart.clone(), size));
        Ok(())
    }
}

fn sample_at(secs: i64, total_views: i64, followers: i64) -> Sample {
    Sample::at(Utc.timestamp_opt(secs, 0).unwrap())
        .with(Metric::TotalViews, total_views)
        .with(Metric::AverageViews, total_views / 10)
        .with(Metric::Favorites, 3)
        .with(Metric::Followers, followers)
        .with(Metric::Ratings, 1)
        .with(Metric::Pages, 12)
}

fn store_with(samples: &[Sample]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("rr_stats").join("rr_stats.sqlite");
    let store = SampleStore::open(&path, AccessMode::ReadWrite).expect("open writer");
    for sample in samples {
        record_sample(&store, sample).expect("record sample");
    }
    (dir, path)
}

struct Run {
    outcome: Result<DisplayOutcome>,
    numerals: Vec<(String, Option<usize>, Justification)>,
    charts: Vec<(ChartData, TermSize)>,
    output: String,
}

fn display(path: &Path, with_chart: bool) -> Run {
    let store = SampleStore::open(path, AccessMode::ReadOnly).expect("open reader");
    let numerals = RecordingNumerals::default();
    let mut chart = RecordingChart::default();
    let mut output = Vec::new();

    let outcome = {
        let mut sinks = DisplaySinks {
            numerals: &numerals,
            lines: &mut output,
            chart: if with_chart {
                Some(&mut chart as &mut dyn ChartSink)
            } else {
                None
            },
        };
        run_display_internal(&store, Metric::TotalViews, &mut sinks, TERMINAL)
    };

    Run {
        outcome,
        numerals: numerals.calls.into_inner(),
        charts: chart.charts,
        output: String::from_utf8(output).expect("utf-8 output"),
    }
}

#[test]
fn three_days_of_history_show_day_over_day_delta() {
    // Inserted out of order on purpose.
    let (_tmp, path) = store_with(&[
        sample_at(START + 2 * DAY, 200, 9),
        sample_at(START, 100, 5),
        sample_at(START + DAY, 140, 7),
    ]);

    let run = display(&path, true);
    let outcome = run.outcome.expect("display");

    let DisplayOutcome::Rendered { current, lag, deltas } = outcome else {
        panic!("expected a rendered display");
    };
    assert_eq!(current.total_views, 200);
    assert_eq!(lag.total_views, 140);
    assert_eq!(deltas[0].metric, Metric::TotalViews);
    assert_eq!(deltas[0].delta, Some(60));

    assert_eq!(
        run.numerals,
        vec![
            ("200".to_string(), None, Justification::Left),
            ("+60".to_string(), Some(80 - "[200]".len()), Justification::Right),
        ]
    );
    assert!(run.output.starts_with("Total Views\n[200][+60]\n"));
    assert!(run.output.contains("Followers"));
    assert!(run.output.contains("(+2)"));
    assert!(!run.output.contains("insufficient history"));
}

#[test]
fn chart_receives_rate_series_and_time_bounds() {
    let (_tmp, path) = store_with(&[
        sample_at(START, 100, 5),
        sample_at(START + DAY, 140, 7),
        sample_at(START + 2 * DAY, 200, 9),
    ]);

    let run = display(&path, true);
    run.outcome.expect("display");

    assert_eq!(run.charts.len(), 1);
    let (chart, size) = &run.charts[0];
    assert_eq!(*size, TERMINAL);
    assert_eq!(chart.metrics, Metric::ALL.to_vec());
    assert_eq!(chart.x_min, START + DAY);
    assert_eq!(chart.x_max, START + 2 * DAY);

    let total_views: Vec<i64> = chart.rows.iter().map(|row| row.values[0]).collect();
    assert_eq!(total_views, vec![40, 60]);
}

#[test]
fn fresh_install_reports_insufficient_history() {
    let (_tmp, path) = store_with(&[sample_at(START, 100, 5)]);

    let run = display(&path, true);
    let outcome = run.outcome.expect("display");

    assert!(matches!(outcome, DisplayOutcome::InsufficientHistory { .. }));
    assert_eq!(outcome.current().total_views, 100);
    assert!(outcome.deltas().iter().all(|d| d.delta.is_none()));
    assert_eq!(run.numerals.len(), 1);
    assert!(run.output.contains("insufficient history"));
    assert!(run.charts.is_empty(), "a chart needs at least one day-old baseline");
}

#[test]
fn partial_day_uses_oldest_sample_as_baseline() {
    let (_tmp, path) = store_with(&[
        sample_at(START, 100, 5),
        sample_at(START + 3_600, 104, 5),
        sample_at(START + 7_200, 110, 6),
    ]);

    let run = display(&path, false);
    let DisplayOutcome::Rendered { lag, .. } = run.outcome.expect("display") else {
        panic!("expected a rendered display");
    };
    assert_eq!(lag.epoch_seconds(), START);
    assert_eq!(run.numerals[1].0, "+10");
}

#[test]
fn counter_anomaly_renders_negative_delta() {
    let (_tmp, path) = store_with(&[sample_at(START, 100, 5), sample_at(START + DAY, 90, 4)]);

    let run = display(&path, false);
    let outcome = run.outcome.expect("display");

    assert_eq!(outcome.deltas()[0].delta, Some(-10));
    assert_eq!(run.numerals[1].0, "-10");
    assert!(run.output.contains("(-1)"));
    assert!(run.charts.is_empty());
}

#[test]
fn empty_store_is_not_found() {
    let (_tmp, path) = store_with(&[]);

    let run = display(&path, true);
    let err = run.outcome.expect_err("empty history must fail");
    assert!(err.is_not_found());
    assert!(run.numerals.is_empty());
}

#[test]
fn read_only_open_never_creates_the_store() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("rr_stats.sqlite");

    let err = SampleStore::open(&path, AccessMode::ReadOnly)
        .err()
        .expect("missing store must fail");
    assert!(matches!(err, StatsError::NotFound { .. }));
    assert!(!path.exists());
}

#[test]
fn appended_sample_is_read_back_exactly() {
    let sample = sample_at(START + 17, 123_456, 789);
    let (_tmp, path) = store_with(&[sample.clone()]);

    let reader = SampleStore::open(&path, AccessMode::ReadOnly).expect("open reader");
    assert_eq!(reader.read_all().expect("read"), vec![sample]);
}
