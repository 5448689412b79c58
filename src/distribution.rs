use std::collections::HashMap;
use std::hash::Hash;

use chrono::{Datelike, NaiveDate};

use crate::models::{Gender, Volunteer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeRange {
    Under18,
    Age18To20,
    Age21To23,
    Age24To26,
    Age27To30,
    Over31,
    Unknown,
}

impl AgeRange {
    pub fn from_age(age: Option<u32>) -> Self {
        match age {
            None => AgeRange::Unknown,
            Some(0..=17) => AgeRange::Under18,
            Some(18..=20) => AgeRange::Age18To20,
            Some(21..=23) => AgeRange::Age21To23,
            Some(24..=26) => AgeRange::Age24To26,
            Some(27..=30) => AgeRange::Age27To30,
            Some(_) => AgeRange::Over31,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeRange::Under18 => "Under 18",
            AgeRange::Age18To20 => "18-20",
            AgeRange::Age21To23 => "21-23",
            AgeRange::Age24To26 => "24-26",
            AgeRange::Age27To30 => "27-30",
            AgeRange::Over31 => "31+",
            AgeRange::Unknown => "Unknown",
        }
    }
}

pub fn gender_label(gender: Option<Gender>) -> &'static str {
    match gender {
        Some(Gender::Female) => "Female",
        Some(Gender::Male) => "Male",
        Some(Gender::NonBinary) => "Non-binary",
        Some(Gender::Other) => "Other",
        Some(Gender::PreferNotToDisclose) => "Prefer not to disclose",
        None => "Unspecified",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment<K> {
    pub key: K,
    pub count: usize,
    pub percentage: f64,
}

/// Completed years between `date_of_birth` (`YYYY-MM-DD`) and `today`.
pub fn age_on(date_of_birth: &str, today: NaiveDate) -> Option<u32> {
    let birth = NaiveDate::parse_from_str(date_of_birth.trim(), "%Y-%m-%d").ok()?;
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

fn segments<K: Copy + Eq + Hash>(keys: impl Iterator<Item = K>) -> Vec<Segment<K>> {
    let mut counts: HashMap<K, usize> = HashMap::new();
    let mut total = 0usize;
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
        total += 1;
    }

    let mut segments: Vec<Segment<K>> = counts
        .into_iter()
        .map(|(key, count)| Segment {
            key,
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect();
    segments.sort_by(|a, b| b.count.cmp(&a.count));
    segments
}

pub fn gender_distribution(volunteers: &[Volunteer]) -> Vec<Segment<Option<Gender>>> {
    segments(volunteers.iter().map(|volunteer| volunteer.gender))
}

pub fn age_distribution(volunteers: &[Volunteer], today: NaiveDate) -> Vec<Segment<AgeRange>> {
    segments(
        volunteers
            .iter()
            .map(|volunteer| AgeRange::from_age(age_on(&volunteer.date_of_birth, today))),
    )
}
