//! Point-in-time evaluation.
//!
//! A status "as of" a cutoff is the live evaluation run over the part of a
//! volunteer's history dated at or before that cutoff. Live call sites use
//! the same entry points with `cutoff = now`.

use std::collections::HashMap;

use crate::benefits::{self, BenefitRules};
use crate::models::{Job, Volunteer, VolunteerBenefitStatus, VolunteerId};

/// Jobs grouped per volunteer and sorted by date.
#[derive(Debug, Default)]
pub struct History<'a> {
    by_volunteer: HashMap<VolunteerId, Vec<&'a Job>>,
    earliest: Option<i64>,
}

impl<'a> History<'a> {
    pub fn new(jobs: &'a [Job]) -> Self {
        let mut by_volunteer: HashMap<VolunteerId, Vec<&'a Job>> = HashMap::new();
        for job in jobs {
            by_volunteer.entry(job.volunteer_id).or_default().push(job);
        }
        // Same-date jobs keep a stable order by id.
        for entries in by_volunteer.values_mut() {
            entries.sort_by_key(|job| (job.date, job.id));
        }

        Self {
            by_volunteer,
            earliest: jobs.iter().map(|job| job.date).min(),
        }
    }

    /// The volunteer's jobs dated at or before `cutoff`.
    pub fn as_of(&self, volunteer_id: VolunteerId, cutoff: i64) -> &[&'a Job] {
        match self.by_volunteer.get(&volunteer_id) {
            Some(jobs) => {
                let end = jobs.partition_point(|job| job.date <= cutoff);
                &jobs[..end]
            }
            None => &[],
        }
    }

    pub fn last_job_date(&self, volunteer_id: VolunteerId, cutoff: i64) -> Option<i64> {
        self.as_of(volunteer_id, cutoff).last().map(|job| job.date)
    }

    pub fn earliest_date(&self) -> Option<i64> {
        self.earliest
    }
}

pub fn status_as_of(
    volunteer_id: VolunteerId,
    history: &History<'_>,
    rules: &BenefitRules,
    cutoff: i64,
) -> VolunteerBenefitStatus {
    let jobs = history.as_of(volunteer_id, cutoff);
    benefits::volunteer_benefit_status(volunteer_id, jobs, rules, cutoff)
}

/// Drink tokens held by every volunteer whose benefits are active at `at`.
pub fn total_free_drinks(
    volunteers: &[Volunteer],
    history: &History<'_>,
    rules: &BenefitRules,
    at: i64,
) -> u32 {
    volunteers
        .iter()
        .map(|volunteer| status_as_of(volunteer.id, history, rules, at))
        .filter(|status| status.benefits.is_active)
        .map(|status| status.benefits.drink_tokens)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{utc, DAY_MS};
    use crate::models::{BenefitSystemType, JobTypeConfig, ManualRewards, ShiftTime};

    const NOW: i64 = 20_000 * DAY_MS;

    fn job(volunteer_id: VolunteerId, job_type_name: &str, date: i64) -> Job {
        Job {
            id: date,
            volunteer_id,
            job_type_name: job_type_name.to_string(),
            venue_name: "Groove".to_string(),
            date,
            shift_time: ShiftTime::BeforeMidnight,
        }
    }

    fn volunteer(id: VolunteerId) -> Volunteer {
        Volunteer {
            id,
            name: format!("Volunteer {id}"),
            last_name_abbreviation: String::new(),
            email: String::new(),
            date_of_birth: String::new(),
            gender: None,
            last_shift_date: None,
            is_active: true,
        }
    }

    fn manual(name: &str, free_drinks: u32) -> JobTypeConfig {
        JobTypeConfig {
            name: name.to_string(),
            is_active: true,
            is_shift_job: false,
            is_orion_job: false,
            benefit_system: BenefitSystemType::Manual,
            manual_rewards: Some(ManualRewards {
                duration_days: 7,
                free_drinks,
                ..ManualRewards::default()
            }),
        }
    }

    fn rules() -> BenefitRules {
        BenefitRules {
            job_types: vec![manual("Two drinks", 2), manual("Three drinks", 3)],
            day_change_offset_hours: 0,
            tz: utc(),
        }
    }

    #[test]
    fn as_of_returns_sorted_prefix() {
        let jobs = vec![
            job(1, "Bar", NOW),
            job(1, "Bar", NOW - 2 * DAY_MS),
            job(1, "Bar", NOW + DAY_MS),
            job(2, "Bar", NOW - DAY_MS),
        ];
        let history = History::new(&jobs);

        let dates: Vec<i64> = history.as_of(1, NOW).iter().map(|job| job.date).collect();
        assert_eq!(dates, vec![NOW - 2 * DAY_MS, NOW]);
        assert!(history.as_of(1, NOW - 3 * DAY_MS).is_empty());
        assert!(history.as_of(99, NOW).is_empty());
        assert_eq!(history.earliest_date(), Some(NOW - 2 * DAY_MS));
        assert_eq!(history.last_job_date(1, NOW + 5 * DAY_MS), Some(NOW + DAY_MS));
    }

    #[test]
    fn historical_status_ignores_later_jobs() {
        let jobs = vec![job(1, "Two drinks", NOW)];
        let history = History::new(&jobs);

        let before = status_as_of(1, &history, &rules(), NOW - DAY_MS);
        assert!(!before.benefits.is_active);
        assert_eq!(before.last_job_date, None);

        let after = status_as_of(1, &history, &rules(), NOW + DAY_MS);
        assert!(after.benefits.is_active);
        assert_eq!(after.benefits.drink_tokens, 2);
    }

    #[test]
    fn free_drinks_sum_over_active_volunteers() {
        let jobs = vec![
            job(1, "Two drinks", NOW - DAY_MS),
            job(2, "Three drinks", NOW - 2 * DAY_MS),
            job(3, "Three drinks", NOW - 30 * DAY_MS),
        ];
        let history = History::new(&jobs);
        let volunteers = vec![volunteer(1), volunteer(2), volunteer(3)];

        assert_eq!(total_free_drinks(&volunteers, &history, &rules(), NOW), 5);
    }

    #[test]
    fn same_date_jobs_are_ordered_by_id() {
        let mut second = job(1, "Bar", NOW);
        second.id = 2;
        let mut first = job(1, "Bar", NOW);
        first.id = 1;
        let jobs = vec![second, first];
        let history = History::new(&jobs);

        let ids: Vec<i64> = history.as_of(1, NOW).iter().map(|job| job.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(status_as_of(1, &history, &rules(), NOW).volunteer_id, 1);
    }
}
