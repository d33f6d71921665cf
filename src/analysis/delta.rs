use crate::models::display::{ChartData, ChartRow, MetricDelta};
use crate::models::metric::Metric;
use crate::models::sample::Sample;

/// Per-metric change from `lag` to `current`, in canonical metric order.
/// Counter anomalies (current below lag) stay negative.
pub fn compute_deltas(current: &Sample, lag: Option<&Sample>) -> Vec<MetricDelta> {
    Metric::ALL
        .iter()
        .map(|&metric| MetricDelta {
            metric,
            current: current.value(metric),
            delta: lag.map(|lag| current.value(metric) - lag.value(metric)),
        })
        .collect()
}

/// Day-over-day rate rows for the chart sink; `None` when no sample has a lag.
pub fn build_chart_data(series: &[(&Sample, &Sample)]) -> Option<ChartData> {
    let rows: Vec<ChartRow> = series
        .iter()
        .map(|(sample, lag)| ChartRow {
            timestamp: sample.epoch_seconds(),
            values: Metric::ALL
                .iter()
                .map(|&metric| sample.value(metric) - lag.value(metric))
                .collect(),
        })
        .collect();

    let x_min = rows.iter().map(|row| row.timestamp).min()?;
    let x_max = rows.iter().map(|row| row.timestamp).max()?;

    Some(ChartData {
        metrics: Metric::ALL.to_vec(),
        rows,
        x_min,
        x_max,
    })
}

/// `1234567` → `1,234,567`
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Always signed: `+50`, `-3`, `+0`.
pub fn format_delta(delta: i64) -> String {
    if delta < 0 {
        format_count(delta)
    } else {
        format!("+{}", format_count(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64, total_views: i64, followers: i64) -> Sample {
        Sample::at(Utc.timestamp_opt(secs, 0).unwrap())
            .with(Metric::TotalViews, total_views)
            .with(Metric::AverageViews, 7)
            .with(Metric::Followers, followers)
    }

    #[test]
    fn delta_is_current_minus_lag() {
        let deltas = compute_deltas(&at(90_000, 150, 10), Some(&at(3_600, 100, 4)));

        assert_eq!(deltas[0].metric, Metric::TotalViews);
        assert_eq!(deltas[0].current, 150);
        assert_eq!(deltas[0].delta, Some(50));
        assert_eq!(format_delta(deltas[0].delta.unwrap()), "+50");

        let followers = deltas.iter().find(|d| d.metric == Metric::Followers).unwrap();
        assert_eq!(followers.delta, Some(6));
    }

    #[test]
    fn counter_anomaly_stays_negative() {
        let deltas = compute_deltas(&at(90_000, 90, 0), Some(&at(3_600, 100, 0)));
        assert_eq!(deltas[0].delta, Some(-10));
        assert_eq!(format_delta(-10), "-10");
    }

    #[test]
    fn missing_lag_leaves_delta_empty() {
        let deltas = compute_deltas(&at(0, 5, 0), None);
        assert!(deltas.iter().all(|d| d.delta.is_none()));
        assert_eq!(deltas.len(), Metric::ALL.len());
    }

    #[test]
    fn formats_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
        assert_eq!(format_count(-45_000), "-45,000");
        assert_eq!(format_delta(0), "+0");
        assert_eq!(format_delta(12_345), "+12,345");
    }

    #[test]
    fn chart_rows_carry_rates_and_bounds() {
        let a = at(0, 100, 1);
        let b = at(50_000, 130, 2);
        let c = at(100_000, 200, 5);
        let chart = build_chart_data(&[(&b, &a), (&c, &b)]).expect("chart data");

        assert_eq!(chart.x_min, 50_000);
        assert_eq!(chart.x_max, 100_000);
        assert_eq!(chart.rows[0].values[0], 30);
        assert_eq!(chart.rows[1].values[0], 70);
        assert_eq!(chart.rows[1].values.len(), chart.metrics.len());
    }

    #[test]
    fn empty_series_has_no_chart() {
        assert!(build_chart_data(&[]).is_none());
    }
}
