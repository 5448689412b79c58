use chrono::FixedOffset;

use crate::dates::{self, DAY_MS, YEAR_MS};
use crate::models::{
    Benefit, BenefitSystemType, Job, JobTypeConfig, ShiftTime, VolunteerBenefitStatus,
    VolunteerId, VolunteerRank,
};

const ETOILE_VALIDITY_DAYS: i64 = 31;
const GALAXIE_MONTHLY_SHIFTS: usize = 3;

const NOVA_DESCRIPTION: &str =
    "Free entry + 1 guest for the same-night event; 2 drink tokens; 50% bar discount (same night)";
const ETOILE_DESCRIPTION: &str =
    "Free entry (same night); plus within 31 days: free entry + 1 guest for another event";

/// Job-type configuration plus the calendar settings every benefit rule needs.
#[derive(Debug, Clone)]
pub struct BenefitRules {
    pub job_types: Vec<JobTypeConfig>,
    pub day_change_offset_hours: i64,
    pub tz: FixedOffset,
}

impl BenefitRules {
    fn config_for(&self, job_type_name: &str) -> Option<&JobTypeConfig> {
        self.job_types.iter().find(|config| config.name == job_type_name)
    }

    fn is_shift_job(&self, job: &Job) -> bool {
        self.config_for(&job.job_type_name)
            .is_some_and(|config| config.is_active && config.is_shift_job)
    }

    fn is_orion_job(&self, job: &Job) -> bool {
        self.config_for(&job.job_type_name)
            .is_some_and(|config| config.is_active && config.is_orion_job)
    }

    fn month_window(&self, at: i64) -> (i64, i64) {
        let offset = self.day_change_offset_hours;
        (
            dates::start_of_month_with_offset(at, offset, &self.tz),
            dates::end_of_month_with_offset(at, offset, &self.tz).saturating_add(1),
        )
    }
}

/// Evaluates a volunteer's benefits as of `at`.
///
/// `jobs` must already be restricted to this volunteer. The function never
/// looks at the wall clock, so the same code serves the live view (`at` =
/// now) and historical replay (`at` = a bucket boundary, jobs filtered to
/// that boundary).
pub fn volunteer_benefit_status(
    volunteer_id: VolunteerId,
    jobs: &[&Job],
    rules: &BenefitRules,
    at: i64,
) -> VolunteerBenefitStatus {
    let last_job_date = jobs.iter().map(|job| job.date).max();
    let monthly_shifts = monthly_shift_count(jobs, rules, at);
    let after_midnight = has_shift_this_month(jobs, rules, at, ShiftTime::AfterMidnight);
    let before_midnight = has_shift_this_month(jobs, rules, at, ShiftTime::BeforeMidnight);

    let status = |rank, benefits, active_benefits| VolunteerBenefitStatus {
        volunteer_id,
        rank,
        benefits,
        active_benefits,
        last_job_date,
        monthly_shifts,
        is_eligible_for_galaxie: monthly_shifts >= GALAXIE_MONTHLY_SHIFTS,
        is_eligible_for_etoile: after_midnight,
        is_eligible_for_nova: before_midnight,
    };

    if let Some(manual) = manual_rewards_benefit(jobs, rules, at).filter(|b| b.is_active) {
        return status(Some(VolunteerRank::Special), manual.clone(), vec![manual]);
    }

    let orion_start = jobs
        .iter()
        .filter(|job| rules.is_orion_job(job))
        .map(|job| job.date)
        .max();

    let mut candidates = Vec::new();
    if let Some(start) = orion_start {
        if at >= start + YEAR_MS && at < start + 2 * YEAR_MS {
            candidates.push(VolunteerRank::Veteran);
        }
        if at >= start && at < start + YEAR_MS {
            candidates.push(VolunteerRank::Orion);
        }
    }
    if monthly_shifts >= GALAXIE_MONTHLY_SHIFTS {
        candidates.push(VolunteerRank::Galaxie);
    }
    if after_midnight {
        candidates.push(VolunteerRank::Etoile);
    }
    if before_midnight {
        candidates.push(VolunteerRank::Nova);
    }

    let mut primary_rank = None;
    let mut active_benefits = Vec::new();
    // Candidates are pushed in priority order.
    for rank in candidates {
        let benefit = benefit_for_rank(rank, jobs, rules, at, orion_start);
        if benefit.is_active {
            primary_rank.get_or_insert(rank);
            active_benefits.push(benefit);
        }
    }

    let benefits = if active_benefits.is_empty() {
        Benefit::none()
    } else {
        aggregate_benefits(&active_benefits)
    };

    status(primary_rank, benefits, active_benefits)
}

fn monthly_shift_count(jobs: &[&Job], rules: &BenefitRules, at: i64) -> usize {
    let (start, end) = rules.month_window(at);
    jobs.iter()
        .filter(|job| job.date >= start && job.date < end && rules.is_shift_job(job))
        .count()
}

fn has_shift_this_month(jobs: &[&Job], rules: &BenefitRules, at: i64, shift: ShiftTime) -> bool {
    let (start, end) = rules.month_window(at);
    jobs.iter().any(|job| {
        job.date >= start && job.date < end && job.shift_time == shift && rules.is_shift_job(job)
    })
}

fn benefit_for_rank(
    rank: VolunteerRank,
    jobs: &[&Job],
    rules: &BenefitRules,
    at: i64,
    orion_start: Option<i64>,
) -> Benefit {
    match rank {
        VolunteerRank::Nova => {
            let valid_until = jobs
                .iter()
                .filter(|job| job.shift_time == ShiftTime::BeforeMidnight)
                .map(|job| job.date)
                .max()
                .map(|date| {
                    dates::end_of_day_with_offset(date, rules.day_change_offset_hours, &rules.tz)
                });
            Benefit {
                rank: Some(rank),
                description: NOVA_DESCRIPTION.to_string(),
                free_entry: true,
                friend_invitation: true,
                invite_count: 1,
                drink_tokens: 2,
                bar_discount: 50,
                guest_list_access: true,
                extraordinary_benefits: false,
                valid_until,
                is_active: valid_until.is_some_and(|until| at <= until),
            }
        }
        VolunteerRank::Etoile => {
            let last_shift = jobs
                .iter()
                .filter(|job| {
                    job.shift_time == ShiftTime::AfterMidnight && rules.is_shift_job(job)
                })
                .map(|job| job.date)
                .max()
                .unwrap_or(at);
            let valid_until = last_shift + ETOILE_VALIDITY_DAYS * DAY_MS;
            Benefit {
                rank: Some(rank),
                description: ETOILE_DESCRIPTION.to_string(),
                free_entry: true,
                friend_invitation: true,
                invite_count: 1,
                drink_tokens: 0,
                bar_discount: 0,
                guest_list_access: true,
                extraordinary_benefits: false,
                valid_until: Some(valid_until),
                is_active: at <= valid_until,
            }
        }
        VolunteerRank::Galaxie => {
            let valid_until = dates::start_of_next_month(at, &rules.tz);
            Benefit {
                rank: Some(rank),
                description: "Free entry + 50% bar discount for all events this month".to_string(),
                free_entry: true,
                friend_invitation: false,
                invite_count: 0,
                drink_tokens: 0,
                bar_discount: 50,
                guest_list_access: true,
                extraordinary_benefits: false,
                valid_until: Some(valid_until),
                is_active: at < valid_until,
            }
        }
        VolunteerRank::Orion | VolunteerRank::Veteran => {
            let years = if rank == VolunteerRank::Orion { 1 } else { 2 };
            let valid_until = orion_start
                .map(|start| start + years * YEAR_MS)
                .unwrap_or_else(|| dates::start_of_month_next_year(at, &rules.tz));
            let description = if rank == VolunteerRank::Orion {
                "1 guest per event; 50% bar discount; partner benefits (1 year from ORION start)"
            } else {
                "1 guest per event; 50% bar discount; partner benefits (1 year after ORION)"
            };
            Benefit {
                rank: Some(rank),
                description: description.to_string(),
                free_entry: true,
                friend_invitation: true,
                invite_count: 1,
                drink_tokens: 0,
                bar_discount: 50,
                guest_list_access: true,
                extraordinary_benefits: true,
                valid_until: Some(valid_until),
                is_active: at < valid_until,
            }
        }
        VolunteerRank::Special => Benefit {
            rank: Some(rank),
            ..Benefit::none()
        },
    }
}

fn manual_rewards_benefit(jobs: &[&Job], rules: &BenefitRules, at: i64) -> Option<Benefit> {
    let (job, rewards) = jobs
        .iter()
        .filter_map(|job| {
            let config = rules.config_for(&job.job_type_name)?;
            if config.benefit_system != BenefitSystemType::Manual {
                return None;
            }
            config.manual_rewards.as_ref().map(|rewards| (*job, rewards))
        })
        .max_by_key(|(job, _)| job.date)?;

    let valid_until = job
        .date
        .saturating_add(rewards.duration_days.saturating_mul(DAY_MS));

    let mut parts = Vec::new();
    if rewards.free_entry {
        parts.push("Free entry".to_string());
    }
    if rewards.invites > 0 {
        parts.push(format!("{} invites", rewards.invites));
    }
    if rewards.free_drinks > 0 {
        parts.push(format!("{} free drinks", rewards.free_drinks));
    }
    if rewards.bar_discount_percentage > 0 {
        parts.push(format!("{}% bar discount", rewards.bar_discount_percentage));
    }
    if !rewards.other_notes.is_empty() {
        parts.push(rewards.other_notes.clone());
    }
    let description = if parts.is_empty() {
        format!("Manual rewards ({} days)", rewards.duration_days)
    } else {
        format!(
            "Manual rewards: {} ({} days)",
            parts.join(", "),
            rewards.duration_days
        )
    };

    Some(Benefit {
        rank: Some(VolunteerRank::Special),
        description,
        free_entry: rewards.free_entry,
        friend_invitation: rewards.invites > 0,
        invite_count: rewards.invites,
        drink_tokens: rewards.free_drinks,
        bar_discount: rewards.bar_discount_percentage,
        guest_list_access: rewards.free_entry || rewards.invites > 0,
        extraordinary_benefits: false,
        valid_until: Some(valid_until),
        is_active: at <= valid_until,
    })
}

/// Folds every active rank benefit into one.
pub fn aggregate_benefits(benefits: &[Benefit]) -> Benefit {
    let free_entry = benefits.iter().any(|b| b.free_entry);
    let friend_invitation = benefits.iter().any(|b| b.friend_invitation);
    let invite_count = benefits.iter().map(|b| b.invite_count).sum();
    let drink_tokens = benefits.iter().map(|b| b.drink_tokens).sum();
    let bar_discount = benefits.iter().map(|b| b.bar_discount).max().unwrap_or(0);
    let guest_list_access = benefits.iter().any(|b| b.guest_list_access);
    let extraordinary_benefits = benefits.iter().any(|b| b.extraordinary_benefits);

    let mut parts = Vec::new();
    if free_entry {
        parts.push("Free entry".to_string());
    }
    if friend_invitation {
        parts.push("Friend invitation".to_string());
    }
    if invite_count > 0 {
        parts.push(format!("{invite_count} invites"));
    }
    if drink_tokens > 0 {
        parts.push(format!("{drink_tokens} drink tokens"));
    }
    if bar_discount > 0 {
        parts.push(format!("{bar_discount}% bar discount"));
    }
    if guest_list_access {
        parts.push("Guest list access".to_string());
    }
    if extraordinary_benefits {
        parts.push("Extraordinary benefits".to_string());
    }
    let description = if parts.is_empty() {
        "Aggregated benefits".to_string()
    } else {
        format!("Aggregated benefits: {}", parts.join(", "))
    };

    Benefit {
        rank: None,
        description,
        free_entry,
        friend_invitation,
        invite_count,
        drink_tokens,
        bar_discount,
        guest_list_access,
        extraordinary_benefits,
        valid_until: benefits.iter().filter_map(|b| b.valid_until).max(),
        is_active: benefits.iter().any(|b| b.is_active),
    }
}
