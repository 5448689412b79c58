use crate::dates::{DAY_MS, YEAR_MS};
use crate::models::Volunteer;
use crate::replay::History;

const ACTIVE_THRESHOLD_YEARS: i64 = 1;
const CLEANUP_THRESHOLD_YEARS: i64 = 4;

/// A volunteer is active while their latest shift is less than a year old.
pub fn is_active_at(last_shift_date: Option<i64>, at: i64) -> bool {
    last_shift_date.is_some_and(|last| last >= at - ACTIVE_THRESHOLD_YEARS * YEAR_MS)
}

pub fn should_cleanup(last_shift_date: Option<i64>, at: i64) -> bool {
    last_shift_date.is_some_and(|last| last < at - CLEANUP_THRESHOLD_YEARS * YEAR_MS)
}

pub fn days_since_last_shift(last_shift_date: Option<i64>, at: i64) -> Option<i64> {
    last_shift_date.map(|last| (at - last) / DAY_MS)
}

pub fn activity_status_text(last_shift_date: Option<i64>, at: i64) -> String {
    match days_since_last_shift(last_shift_date, at) {
        None => "Never worked".to_string(),
        Some(0) => "Active (today)".to_string(),
        Some(days) if days < 30 => format!("Active ({days} days ago)"),
        Some(days) if days < 365 => format!("Active ({} months ago)", days / 30),
        Some(days) => format!("Inactive ({} years ago)", days / 365),
    }
}

/// Recomputes `last_shift_date` and `is_active` from the job history as of `at`.
pub fn refresh_from_jobs(
    volunteers: &[Volunteer],
    history: &History<'_>,
    at: i64,
) -> Vec<Volunteer> {
    volunteers
        .iter()
        .map(|volunteer| {
            let last_shift_date = history.last_job_date(volunteer.id, at);
            Volunteer {
                last_shift_date,
                is_active: is_active_at(last_shift_date, at),
                ..volunteer.clone()
            }
        })
        .collect()
}

pub fn cleanup_candidates(volunteers: &[Volunteer], at: i64) -> Vec<&Volunteer> {
    volunteers
        .iter()
        .filter(|volunteer| should_cleanup(volunteer.last_shift_date, at))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, ShiftTime};

    const NOW: i64 = 20_000 * DAY_MS;

    fn volunteer(id: i64) -> Volunteer {
        Volunteer {
            id,
            name: format!("Volunteer {id}"),
            last_name_abbreviation: "V.".to_string(),
            email: format!("v{id}@example.com"),
            date_of_birth: String::new(),
            gender: None,
            last_shift_date: None,
            is_active: true,
        }
    }

    fn job(volunteer_id: i64, date: i64) -> Job {
        Job {
            id: date,
            volunteer_id,
            job_type_name: "Bar".to_string(),
            venue_name: "Groove".to_string(),
            date,
            shift_time: ShiftTime::BeforeMidnight,
        }
    }

    #[test]
    fn active_window_is_one_year() {
        assert!(is_active_at(Some(NOW - YEAR_MS), NOW));
        assert!(!is_active_at(Some(NOW - YEAR_MS - 1), NOW));
        assert!(!is_active_at(None, NOW));
    }

    #[test]
    fn cleanup_after_four_years() {
        assert!(should_cleanup(Some(NOW - 4 * YEAR_MS - 1), NOW));
        assert!(!should_cleanup(Some(NOW - 4 * YEAR_MS), NOW));
        assert!(!should_cleanup(None, NOW));
    }

    #[test]
    fn status_text_tiers() {
        assert_eq!(activity_status_text(None, NOW), "Never worked");
        assert_eq!(activity_status_text(Some(NOW - 3 * 3_600_000), NOW), "Active (today)");
        assert_eq!(activity_status_text(Some(NOW - 12 * DAY_MS), NOW), "Active (12 days ago)");
        assert_eq!(activity_status_text(Some(NOW - 95 * DAY_MS), NOW), "Active (3 months ago)");
        assert_eq!(activity_status_text(Some(NOW - 800 * DAY_MS), NOW), "Inactive (2 years ago)");
    }

    #[test]
    fn refresh_uses_latest_job_up_to_now() {
        let volunteers = vec![volunteer(1), volunteer(2), volunteer(3)];
        let jobs = vec![
            job(1, NOW - 10 * DAY_MS),
            job(1, NOW - 400 * DAY_MS),
            job(2, NOW - 500 * DAY_MS),
            job(3, NOW + DAY_MS),
        ];
        let history = History::new(&jobs);

        let refreshed = refresh_from_jobs(&volunteers, &history, NOW);
        assert_eq!(refreshed[0].last_shift_date, Some(NOW - 10 * DAY_MS));
        assert!(refreshed[0].is_active);
        assert!(!refreshed[1].is_active);
        assert_eq!(refreshed[2].last_shift_date, None);
        assert!(!refreshed[2].is_active);
    }

    #[test]
    fn lists_cleanup_candidates() {
        let mut stale = volunteer(1);
        stale.last_shift_date = Some(NOW - 5 * YEAR_MS);
        let mut recent = volunteer(2);
        recent.last_shift_date = Some(NOW - DAY_MS);

        let volunteers = vec![stale, recent, volunteer(3)];
        let candidates = cleanup_candidates(&volunteers, NOW);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, 1);
    }
}
