use chrono::{Datelike, FixedOffset};
use clap::ValueEnum;

use crate::dates::{self, DAY_MS, WEEK_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimePeriod {
    OneWeek,
    TwoWeeks,
    OneMonth,
    SixMonths,
    OneYear,
    /// Whole history; the window follows the data.
    Max,
}

impl TimePeriod {
    pub fn display_name(self) -> &'static str {
        match self {
            TimePeriod::OneWeek => "1 Week",
            TimePeriod::TwoWeeks => "2 Weeks",
            TimePeriod::OneMonth => "1 Month",
            TimePeriod::SixMonths => "6 Months",
            TimePeriod::OneYear => "1 Year",
            TimePeriod::Max => "All Time",
        }
    }

    /// Window length in days; 0 for `Max`.
    pub fn days(self) -> i64 {
        match self {
            TimePeriod::OneWeek => 7,
            TimePeriod::TwoWeeks => 14,
            TimePeriod::OneMonth => 30,
            TimePeriod::SixMonths => 180,
            TimePeriod::OneYear => 365,
            TimePeriod::Max => 0,
        }
    }

    pub fn unit_label(self) -> &'static str {
        match self {
            TimePeriod::OneWeek | TimePeriod::TwoWeeks | TimePeriod::OneMonth => "Day",
            TimePeriod::SixMonths => "Week",
            TimePeriod::OneYear => "Month",
            TimePeriod::Max => "Dynamic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// `Mon 5`
    Day,
    /// `W12`, ISO week number
    Week,
    /// `Jan`
    Month,
}

impl LabelStyle {
    pub fn format(self, timestamp: i64, tz: &FixedOffset) -> String {
        let local = dates::to_local(timestamp, tz);
        match self {
            LabelStyle::Day => local.format("%a %-d").to_string(),
            LabelStyle::Week => format!("W{}", local.iso_week().week()),
            LabelStyle::Month => local.format("%b").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSpec {
    pub width_ms: i64,
    pub labels: LabelStyle,
}

/// Bucket width and label style for a reporting window.
///
/// Only `Max` looks at `extent_start`: the span up to `now` decides between
/// daily, weekly and weekly-with-month-labels buckets.
pub fn bucket_granularity(period: TimePeriod, extent_start: i64, now: i64) -> BucketSpec {
    let daily = BucketSpec {
        width_ms: DAY_MS,
        labels: LabelStyle::Day,
    };
    let weekly = BucketSpec {
        width_ms: WEEK_MS,
        labels: LabelStyle::Week,
    };
    let monthly = BucketSpec {
        width_ms: WEEK_MS,
        labels: LabelStyle::Month,
    };

    match period {
        TimePeriod::OneWeek | TimePeriod::TwoWeeks | TimePeriod::OneMonth => daily,
        TimePeriod::SixMonths => weekly,
        TimePeriod::OneYear => monthly,
        TimePeriod::Max => match (now - extent_start) / DAY_MS {
            days if days <= 30 => daily,
            days if days <= 180 => weekly,
            _ => monthly,
        },
    }
}
