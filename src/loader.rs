use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;

use crate::dates;
use crate::models::{Gender, Job, ShiftTime, Volunteer, VolunteerId};

/// Immutable snapshot every analytics call works from.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub volunteers: Vec<Volunteer>,
    pub jobs: Vec<Job>,
}

impl Dataset {
    pub fn load(volunteers: &Path, jobs: &Path, tz: &FixedOffset) -> anyhow::Result<Self> {
        let volunteers = load_volunteers(volunteers)?;
        let jobs = load_jobs(jobs, tz)?;
        log::info!(
            "Loaded {} volunteers and {} jobs",
            volunteers.len(),
            jobs.len()
        );
        Ok(Self { volunteers, jobs })
    }
}

#[derive(Deserialize)]
struct VolunteerRow {
    id: VolunteerId,
    name: String,
    #[serde(default)]
    last_name_abbreviation: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    date_of_birth: String,
    gender: Option<Gender>,
}

#[derive(Deserialize)]
struct JobRow {
    id: i64,
    volunteer_id: VolunteerId,
    job_type_name: String,
    venue_name: String,
    date: String,
    shift_time: ShiftTime,
}

pub fn load_volunteers(path: &Path) -> anyhow::Result<Vec<Volunteer>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_volunteers(file).with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_volunteers<R: Read>(source: R) -> anyhow::Result<Vec<Volunteer>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut volunteers = Vec::new();

    for result in reader.deserialize::<VolunteerRow>() {
        let row = result?;
        volunteers.push(Volunteer {
            id: row.id,
            name: row.name,
            last_name_abbreviation: row.last_name_abbreviation,
            email: row.email,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            last_shift_date: None,
            is_active: false,
        });
    }

    Ok(volunteers)
}

pub fn load_jobs(path: &Path, tz: &FixedOffset) -> anyhow::Result<Vec<Job>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_jobs(file, tz).with_context(|| format!("failed to read {}", path.display()))
}

/// Rows whose date is missing or unreadable are skipped, not fatal.
pub fn read_jobs<R: Read>(source: R, tz: &FixedOffset) -> anyhow::Result<Vec<Job>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut jobs = Vec::new();
    let mut skipped = 0usize;

    for result in reader.deserialize::<JobRow>() {
        let row = result?;
        let Some(date) = dates::parse_timestamp(&row.date, tz) else {
            log::warn!("Skipping job {}: unreadable date {:?}", row.id, row.date);
            skipped += 1;
            continue;
        };

        jobs.push(Job {
            id: row.id,
            volunteer_id: row.volunteer_id,
            job_type_name: row.job_type_name,
            venue_name: row.venue_name,
            date,
            shift_time: row.shift_time,
        });
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} jobs without a usable date");
    }

    Ok(jobs)
}
