use std::collections::BTreeMap;

use chrono::FixedOffset;

use crate::activity;
use crate::benefits::BenefitRules;
use crate::dates::{DAY_MS, YEAR_MS};
use crate::models::{DataPoint, Job, Volunteer};
use crate::period::{bucket_granularity, BucketSpec, TimePeriod};
use crate::replay::{self, History};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    ActiveVolunteers,
    FreeDrinks,
    GuestListVolunteers,
    VolunteerInvites,
    /// Guest-list volunteers plus the invites they can hand out.
    TotalGuestList,
    TotalShifts,
    VenueShifts(String),
}

impl Metric {
    pub fn title(&self) -> String {
        match self {
            Metric::ActiveVolunteers => "Active Volunteers".to_string(),
            Metric::FreeDrinks => "Free Drinks".to_string(),
            Metric::GuestListVolunteers => "Volunteers on Guest List".to_string(),
            Metric::VolunteerInvites => "Volunteer Invites".to_string(),
            Metric::TotalGuestList => "Total Guest List".to_string(),
            Metric::TotalShifts => "Total Shifts".to_string(),
            Metric::VenueShifts(venue) => format!("Shifts at {venue}"),
        }
    }
}

/// Bucket boundaries from `start` to `end` inclusive, `spec.width_ms` apart.
#[derive(Debug, Clone)]
pub struct BucketGrid {
    pub start: i64,
    pub end: i64,
    pub spec: BucketSpec,
    pub tz: FixedOffset,
}

impl BucketGrid {
    pub fn new(
        period: TimePeriod,
        earliest_record: Option<i64>,
        now: i64,
        tz: FixedOffset,
    ) -> Self {
        let start = match period {
            TimePeriod::Max => earliest_record.unwrap_or(now - YEAR_MS).min(now),
            _ => now - period.days() * DAY_MS,
        };

        Self {
            start,
            end: now,
            spec: bucket_granularity(period, start, now),
            tz,
        }
    }

    pub fn boundaries(&self) -> impl Iterator<Item = i64> {
        let width = self.spec.width_ms;
        let end = self.end;
        std::iter::successors(Some(self.start), move |bucket| bucket.checked_add(width))
            .take_while(move |bucket| *bucket <= end)
    }

    /// One point per boundary, valued by `value_at(boundary)`.
    pub fn collect(&self, mut value_at: impl FnMut(i64) -> f64) -> Vec<DataPoint> {
        self.boundaries()
            .map(|bucket| DataPoint {
                label: self.spec.labels.format(bucket, &self.tz),
                value: value_at(bucket),
                timestamp: bucket,
            })
            .collect()
    }
}

/// Sums a per-entity metric over all entities at every bucket boundary.
pub fn sum_over<E>(
    grid: &BucketGrid,
    entities: &[E],
    metric: impl Fn(&E, i64) -> f64,
) -> Vec<DataPoint> {
    grid.collect(|cutoff| entities.iter().map(|entity| metric(entity, cutoff)).sum())
}

fn indicator(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

/// Builds the series of `metric` over `period`, ending at `now`.
///
/// Every bucket only sees jobs dated at or before its own boundary. Empty
/// inputs give an empty series.
pub fn build_series(
    volunteers: &[Volunteer],
    jobs: &[Job],
    period: TimePeriod,
    metric: &Metric,
    rules: &BenefitRules,
    now: i64,
) -> Vec<DataPoint> {
    let history = History::new(jobs);
    let grid = BucketGrid::new(period, history.earliest_date(), now, rules.tz);

    let points = match metric {
        Metric::TotalGuestList => {
            let build =
                |metric: &Metric| build_series(volunteers, jobs, period, metric, rules, now);
            let guests = build(&Metric::GuestListVolunteers);
            let invites = build(&Metric::VolunteerInvites);
            combine_series(&guests, &invites)
        }
        Metric::TotalShifts | Metric::VenueShifts(_) if jobs.is_empty() => Vec::new(),
        Metric::TotalShifts => shift_counts(&grid, jobs, |_| true),
        Metric::VenueShifts(venue) => {
            let venue = venue.to_lowercase();
            shift_counts(&grid, jobs, |job| job.venue_name.to_lowercase() == venue)
        }
        _ if volunteers.is_empty() => Vec::new(),
        Metric::ActiveVolunteers => sum_over(&grid, volunteers, |volunteer, cutoff| {
            indicator(activity::is_active_at(history.last_job_date(volunteer.id, cutoff), cutoff))
        }),
        Metric::FreeDrinks => sum_over(&grid, volunteers, |volunteer, cutoff| {
            let status = replay::status_as_of(volunteer.id, &history, rules, cutoff);
            if status.benefits.is_active {
                f64::from(status.benefits.drink_tokens)
            } else {
                0.0
            }
        }),
        Metric::GuestListVolunteers => sum_over(&grid, volunteers, |volunteer, cutoff| {
            let status = replay::status_as_of(volunteer.id, &history, rules, cutoff);
            indicator(status.benefits.grants_guest_list_at(cutoff))
        }),
        Metric::VolunteerInvites => sum_over(&grid, volunteers, |volunteer, cutoff| {
            let status = replay::status_as_of(volunteer.id, &history, rules, cutoff);
            if status.benefits.grants_guest_list_at(cutoff) {
                f64::from(status.benefits.invite_count)
            } else {
                0.0
            }
        }),
    };

    log::debug!(
        "Built {} points for {} over {}",
        points.len(),
        metric.title(),
        period.display_name()
    );
    points
}

/// Jobs matching `keep` dated in the trailing bucket `(cutoff - width, cutoff]`.
fn shift_counts(grid: &BucketGrid, jobs: &[Job], keep: impl Fn(&Job) -> bool) -> Vec<DataPoint> {
    let width = grid.spec.width_ms;
    sum_over(grid, jobs, |job, cutoff| {
        indicator(job.date > cutoff - width && job.date <= cutoff && keep(job))
    })
}

/// Adds two series point by point, matching on timestamp.
pub fn combine_series(first: &[DataPoint], second: &[DataPoint]) -> Vec<DataPoint> {
    let mut totals: BTreeMap<i64, DataPoint> = BTreeMap::new();
    for point in first.iter().chain(second) {
        totals
            .entry(point.timestamp)
            .and_modify(|total| total.value += point.value)
            .or_insert_with(|| point.clone());
    }
    totals.into_values().collect()
}
