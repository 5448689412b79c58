use std::fmt::Write;

use chrono::FixedOffset;
use serde::Serialize;

use crate::dates;
use crate::models::DataPoint;
use crate::period::TimePeriod;
use crate::series::Metric;
use crate::trend::{self, smooth_trend};

/// A built series together with its trend line.
#[derive(Debug, Clone)]
pub struct MetricSeries {
    pub metric: Metric,
    pub points: Vec<DataPoint>,
    pub trend: Vec<DataPoint>,
}

impl MetricSeries {
    pub fn new(metric: Metric, points: Vec<DataPoint>) -> Self {
        let trend = smooth_trend(&points);
        Self {
            metric,
            points,
            trend,
        }
    }
}

#[derive(Serialize)]
struct SeriesRow<'a> {
    label: &'a str,
    timestamp: i64,
    value: f64,
    trend: f64,
}

pub fn write_series_csv<W: std::io::Write>(writer: W, series: &MetricSeries) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (point, trend) in series.points.iter().zip(&series.trend) {
        csv_writer.serialize(SeriesRow {
            label: &point.label,
            timestamp: point.timestamp,
            value: point.value,
            trend: trend.value,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn build_report(
    period: TimePeriod,
    generated_at: i64,
    tz: &FixedOffset,
    series: &[MetricSeries],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Volunteer Statistics Report");
    let _ = writeln!(
        output,
        "Window: {} (generated {})",
        period.display_name(),
        dates::format_timestamp(generated_at, tz)
    );

    for entry in series {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", entry.metric.title());

        let Some(summary) = trend::summarize(&entry.points) else {
            let _ = writeln!(output, "No data recorded for this window.");
            continue;
        };

        let _ = writeln!(
            output,
            "Latest {:.0}, max {:.0}, min {:.0}, average {:.1}",
            summary.latest, summary.max, summary.min, summary.average
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "| {} | Value | Trend |", period.unit_label());
        let _ = writeln!(output, "|---|---:|---:|");
        for (point, trend) in entry.points.iter().zip(&entry.trend) {
            let _ = writeln!(
                output,
                "| {} | {:.0} | {:.1} |",
                point.label, point.value, trend.value
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::utc;

    fn points(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| DataPoint {
                label: format!("Mon {}", index + 1),
                value: *value,
                timestamp: index as i64 * 1000,
            })
            .collect()
    }

    #[test]
    fn report_lists_every_metric() {
        let series = vec![
            MetricSeries::new(Metric::ActiveVolunteers, points(&[1.0, 3.0])),
            MetricSeries::new(Metric::TotalShifts, Vec::new()),
        ];
        let report = build_report(TimePeriod::OneWeek, 0, &utc(), &series);

        assert!(report.starts_with("# Volunteer Statistics Report"));
        assert!(report.contains("Window: 1 Week (generated 1970-01-01 00:00)"));
        assert!(report.contains("## Active Volunteers"));
        assert!(report.contains("Latest 3, max 3, min 1, average 2.0"));
        assert!(report.contains("| Mon 2 | 3 | 1.6 |"));
        assert!(report.contains("## Total Shifts\nNo data recorded for this window."));
    }

    #[test]
    fn csv_has_trend_column() {
        let series = MetricSeries::new(Metric::FreeDrinks, points(&[0.0, 10.0]));
        let mut buffer = Vec::new();
        write_series_csv(&mut buffer, &series).expect("csv writes");

        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "label,timestamp,value,trend");
        assert_eq!(lines[1], "Mon 1,0,0.0,0.0");
        assert_eq!(lines[2], "Mon 2,1000,10.0,3.0");
    }
}
