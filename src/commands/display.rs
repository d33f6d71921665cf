use crate::analysis::delta::{build_chart_data, compute_deltas, format_count, format_delta};
use crate::analysis::lag::{lag_series, resolve_lag};
use crate::commands::db::SampleStore;
use crate::error::{Result, StatsError};
use crate::models::display::{DisplayOutcome, MetricDelta, TermSize};
use crate::models::metric::Metric;
use crate::render::{block_width, concat_blocks, ChartSink, Justification, NumeralRenderer};
use std::io::Write;

/// Where one display run sends its output.
pub struct DisplaySinks<'a> {
    pub numerals: &'a dyn NumeralRenderer,
    pub lines: &'a mut dyn Write,
    /// `None` disables the chart.
    pub chart: Option<&'a mut dyn ChartSink>,
}

/// Read the history and render the latest sample against its day-old baseline.
pub fn run_display_internal(
    store: &SampleStore,
    primary: Metric,
    sinks: &mut DisplaySinks<'_>,
    size: TermSize,
) -> Result<DisplayOutcome> {
    let history = store.read_sorted()?;
    let current = history
        .last()
        .cloned()
        .ok_or_else(|| StatsError::not_found("sample", format!("no samples in {}", store.path().display())))?;

    let lag = match resolve_lag(&history, &current) {
        Ok(lag) => Some(lag.clone()),
        Err(err) if err.is_not_found() => None,
        Err(err) => return Err(err),
    };

    let deltas = compute_deltas(&current, lag.as_ref());
    render_primary(&deltas, primary, sinks, size)?;
    render_secondary(&deltas, primary, sinks)?;

    if lag.is_none() {
        writeln!(
            sinks.lines,
            "insufficient history: no sample within a day before {}",
            current.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        )?;
    }

    // The chart process writes straight to the terminal.
    sinks.lines.flush()?;

    if let Some(chart_sink) = sinks.chart.as_mut() {
        let series = lag_series(&history);
        match build_chart_data(&series) {
            Some(chart) => chart_sink.render(&chart, size)?,
            None => log::info!("skipping chart: no sample has a day-old baseline yet"),
        }
    }

    Ok(match lag {
        Some(lag) => DisplayOutcome::Rendered {
            current,
            lag,
            deltas,
        },
        None => DisplayOutcome::InsufficientHistory { current, deltas },
    })
}

/// Large count on the left, signed delta right-aligned in the columns left over.
fn render_primary(
    deltas: &[MetricDelta],
    primary: Metric,
    sinks: &mut DisplaySinks<'_>,
    size: TermSize,
) -> Result<()> {
    let Some(row) = deltas.iter().find(|d| d.metric == primary) else {
        return Ok(());
    };

    let count = sinks
        .numerals
        .render(&format_count(row.current), None, Justification::Left)?;

    let block = match row.delta {
        Some(delta) => {
            let budget = (size.columns as usize).saturating_sub(block_width(&count));
            let annotation = sinks
                .numerals
                .render(&format_delta(delta), Some(budget), Justification::Right)?;
            concat_blocks(&count, &annotation)
        }
        None => count,
    };

    writeln!(sinks.lines, "{}", row.label())?;
    writeln!(sinks.lines, "{}", block.trim_end_matches('\n'))?;
    Ok(())
}

fn render_secondary(deltas: &[MetricDelta], primary: Metric, sinks: &mut DisplaySinks<'_>) -> Result<()> {
    let label_width = Metric::ALL.iter().map(|m| m.label().len()).max().unwrap_or(0);

    for row in deltas.iter().filter(|d| d.metric != primary) {
        writeln!(sinks.lines, "{}", secondary_line(row, label_width))?;
    }
    Ok(())
}

/// `Followers      1,234 (+12)`
pub fn secondary_line(row: &MetricDelta, label_width: usize) -> String {
    let value = format_count(row.current);
    match row.delta {
        Some(delta) => format!("{:<label_width$}  {value} ({})", row.label(), format_delta(delta)),
        None => format!("{:<label_width$}  {value}", row.label()),
    }
}
