use std::io::Write;
use std::process::{Command, Stdio};

use super::ChartSink;
use crate::error::{Result, StatsError};
use crate::models::display::{ChartData, TermSize};

const GNUPLOT_PROGRAM: &str = "gnuplot";
const TIMESTAMP_HEADER: &str = "Timestamp";

/// Plots charts with gnuplot's `dumb` terminal, one panel per metric.
#[derive(Debug, Clone)]
pub struct Gnuplot {
    /// Each panel gets `rows / rows_divisor` terminal lines.
    pub rows_divisor: u16,
}

impl Gnuplot {
    pub fn new(rows_divisor: u16) -> Self {
        Self {
            rows_divisor: rows_divisor.max(1),
        }
    }

    pub fn script(&self, chart: &ChartData, size: TermSize) -> String {
        let header: Vec<String> = std::iter::once(TIMESTAMP_HEADER)
            .chain(chart.metrics.iter().map(|m| m.label()))
            .map(|name| format!("\"{name}\""))
            .collect();

        let mut lines = vec!["$Data << EOD".to_string(), header.join("\t")];
        for row in &chart.rows {
            let cells: Vec<String> = std::iter::once(row.timestamp)
                .chain(row.values.iter().copied())
                .map(|v| v.to_string())
                .collect();
            lines.push(cells.join("\t"));
        }
        lines.push("EOD".to_string());

        let panel_rows = (size.rows / self.rows_divisor.max(1)).max(1);
        lines.extend([
            format!("set terminal dumb ansirgb size {} {} enhanced", size.columns, panel_rows),
            "set colorsequence classic".to_string(),
            "set xlabel \"Date\"".to_string(),
            "set xdata time".to_string(),
            "set timefmt \"%s\"".to_string(),
            format!("set xrange [{}:{}]", chart.x_min, chart.x_max),
            "set format x \"%y/%m/%d %H:%M\"".to_string(),
            "set xtics out".to_string(),
            "set ytics out".to_string(),
            "set lmargin 15".to_string(),
        ]);

        for metric in &chart.metrics {
            lines.push(format!("set title \"{{/:Bold {} per day}}\" enhanced", metric.label()));
            lines.push(format!(
                "plot $Data using \"{TIMESTAMP_HEADER}\":\"{}\" notitle with points pt \"o\"",
                metric.label()
            ));
        }

        lines.join("\n")
    }
}

impl ChartSink for Gnuplot {
    fn render(&mut self, chart: &ChartData, size: TermSize) -> Result<()> {
        let script = self.script(chart, size);

        let mut child = Command::new(GNUPLOT_PROGRAM)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| StatsError::Render(format!("could not start {GNUPLOT_PROGRAM}: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes())?;
        }

        // Blocks until the chart has been drawn.
        let status = child.wait()?;
        if !status.success() {
            return Err(StatsError::Render(format!("{GNUPLOT_PROGRAM} exited with {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::display::ChartRow;
    use crate::models::metric::Metric;

    fn chart() -> ChartData {
        ChartData {
            metrics: vec![Metric::TotalViews, Metric::Followers],
            rows: vec![
                ChartRow { timestamp: 100, values: vec![5, 1] },
                ChartRow { timestamp: 200, values: vec![7, -1] },
            ],
            x_min: 100,
            x_max: 200,
        }
    }

    #[test]
    fn script_inlines_data_and_bounds() {
        let script = Gnuplot::new(6).script(&chart(), TermSize { columns: 120, rows: 60 });
        let lines: Vec<&str> = script.lines().collect();

        assert_eq!(lines[0], "$Data << EOD");
        assert_eq!(lines[1], "\"Timestamp\"\t\"Total Views\"\t\"Followers\"");
        assert_eq!(lines[2], "100\t5\t1");
        assert_eq!(lines[3], "200\t7\t-1");
        assert_eq!(lines[4], "EOD");
        assert!(script.contains("set terminal dumb ansirgb size 120 10 enhanced"));
        assert!(script.contains("set xrange [100:200]"));
        assert_eq!(script.matches("plot $Data").count(), 2);
    }

    #[test]
    fn tiny_terminal_still_gets_a_row() {
        let script = Gnuplot::new(6).script(&chart(), TermSize { columns: 40, rows: 3 });
        assert!(script.contains("size 40 1 enhanced"));
    }
}
