use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * HOUR_MS;
pub const WEEK_MS: i64 = 7 * DAY_MS;
pub const YEAR_MS: i64 = 365 * DAY_MS;

const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Out-of-range offsets fall back to UTC.
pub fn utc_offset(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(utc)
}

pub fn utc() -> FixedOffset {
    Utc.fix()
}

pub fn to_local(timestamp: i64, tz: &FixedOffset) -> DateTime<FixedOffset> {
    DateTime::from_timestamp_millis(timestamp)
        .unwrap_or_default()
        .with_timezone(tz)
}

pub fn local_date(timestamp: i64, tz: &FixedOffset) -> NaiveDate {
    to_local(timestamp, tz).date_naive()
}

fn local_millis(local: NaiveDateTime, tz: &FixedOffset) -> i64 {
    local.and_utc().timestamp_millis() - i64::from(tz.local_minus_utc()) * 1000
}

pub fn local_midnight(date: NaiveDate, tz: &FixedOffset) -> i64 {
    local_millis(date.and_time(NaiveTime::MIN), tz)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    if date.month() == 12 {
        first_of_month(date.year() + 1, 1)
    } else {
        first_of_month(date.year(), date.month() + 1)
    }
}

/// Shifts `instant` by a configured hour count, saturating at the `i64` range.
fn shift_hours(instant: i64, offset_hours: i64) -> i64 {
    instant.saturating_add(offset_hours.saturating_mul(HOUR_MS))
}

/// Local midnight of the timestamp's day, shifted by the day-change offset.
pub fn start_of_day_with_offset(timestamp: i64, offset_hours: i64, tz: &FixedOffset) -> i64 {
    shift_hours(local_midnight(local_date(timestamp, tz), tz), offset_hours)
}

/// Last millisecond before the next day begins, shifted by the day-change offset.
pub fn end_of_day_with_offset(timestamp: i64, offset_hours: i64, tz: &FixedOffset) -> i64 {
    start_of_day_with_offset(timestamp, offset_hours, tz).saturating_add(DAY_MS - 1)
}

pub fn start_of_month_with_offset(timestamp: i64, offset_hours: i64, tz: &FixedOffset) -> i64 {
    let date = local_date(timestamp, tz);
    shift_hours(local_midnight(first_of_month(date.year(), date.month()), tz), offset_hours)
}

pub fn end_of_month_with_offset(timestamp: i64, offset_hours: i64, tz: &FixedOffset) -> i64 {
    let next = first_of_next_month(local_date(timestamp, tz));
    shift_hours(local_midnight(next, tz), offset_hours).saturating_sub(1)
}

pub fn start_of_next_month(timestamp: i64, tz: &FixedOffset) -> i64 {
    local_midnight(first_of_next_month(local_date(timestamp, tz)), tz)
}

/// First day of the same month one year later.
pub fn start_of_month_next_year(timestamp: i64, tz: &FixedOffset) -> i64 {
    let date = local_date(timestamp, tz);
    local_midnight(first_of_month(date.year() + 1, date.month()), tz)
}

/// Accepts epoch millis, RFC 3339, `YYYY-MM-DD HH:MM[:SS]` or `YYYY-MM-DD`.
/// Local forms are read in `tz`. Millis outside chrono's range are rejected.
pub fn parse_timestamp(raw: &str, tz: &FixedOffset) -> Option<i64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(millis) = value.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis).map(|_| millis);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.timestamp_millis());
    }

    for format in LOCAL_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(local_millis(parsed, tz));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| local_midnight(date, tz))
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn format_timestamp(timestamp: i64, tz: &FixedOffset) -> String {
    to_local(timestamp, tz).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: &str) -> i64 {
        parse_timestamp(value, &utc()).expect("valid timestamp")
    }

    #[test]
    fn parses_supported_formats() {
        let tz = utc();
        assert_eq!(parse_timestamp("0", &tz), Some(0));
        assert_eq!(parse_timestamp("1970-01-02", &tz), Some(DAY_MS));
        assert_eq!(parse_timestamp("1970-01-01 01:00", &tz), Some(HOUR_MS));
        assert_eq!(parse_timestamp("1970-01-01T02:00:00+01:00", &tz), Some(HOUR_MS));
        assert_eq!(parse_timestamp("  ", &tz), None);
        assert_eq!(parse_timestamp("next tuesday", &tz), None);
    }

    #[test]
    fn local_forms_respect_offset() {
        let plus_two = utc_offset(120);
        assert_eq!(parse_timestamp("1970-01-02", &plus_two), Some(DAY_MS - 2 * HOUR_MS));
    }

    #[test]
    fn day_boundaries_apply_offset() {
        let tz = utc();
        let shift = at("2026-03-14 21:00");
        assert_eq!(start_of_day_with_offset(shift, 0, &tz), at("2026-03-14"));
        assert_eq!(end_of_day_with_offset(shift, 0, &tz), at("2026-03-15") - 1);
        assert_eq!(end_of_day_with_offset(shift, 3, &tz), at("2026-03-15 03:00") - 1);
    }

    #[test]
    fn month_boundaries_wrap_year() {
        let tz = utc();
        let december = at("2025-12-20 12:00");
        assert_eq!(start_of_month_with_offset(december, 0, &tz), at("2025-12-01"));
        assert_eq!(end_of_month_with_offset(december, 0, &tz), at("2026-01-01") - 1);
        assert_eq!(start_of_next_month(december, &tz), at("2026-01-01"));
        assert_eq!(start_of_month_next_year(december, &tz), at("2026-12-01"));
    }

    #[test]
    fn rejects_millis_outside_calendar_range() {
        let tz = utc();
        assert_eq!(parse_timestamp("-9223372036854775000", &tz), None);
        assert_eq!(parse_timestamp(&i64::MAX.to_string(), &tz), None);
        assert_eq!(parse_timestamp("-86400000", &tz), Some(-DAY_MS));
    }

    #[test]
    fn extreme_offsets_do_not_overflow() {
        assert_eq!(utc_offset(i32::MAX).local_minus_utc(), 0);
        assert_eq!(utc_offset(24 * 60).local_minus_utc(), 0);

        let tz = utc();
        let shift = at("2026-03-14 21:00");
        assert_eq!(end_of_day_with_offset(shift, i64::MAX, &tz), i64::MAX);
        let start = start_of_month_with_offset(shift, i64::MIN, &tz);
        let end = end_of_month_with_offset(shift, i64::MIN, &tz);
        assert!(start < 0 && start < end);
    }
}
