use serde::Deserialize;

pub type VolunteerId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    Other,
    PreferNotToDisclose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftTime {
    BeforeMidnight,
    AfterMidnight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolunteerRank {
    Nova,
    Etoile,
    Galaxie,
    Orion,
    Veteran,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BenefitSystemType {
    #[default]
    Stellar,
    Manual,
}

#[derive(Debug, Clone)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub name: String,
    pub last_name_abbreviation: String,
    pub email: String,
    pub date_of_birth: String,
    pub gender: Option<Gender>,
    pub last_shift_date: Option<i64>,
    pub is_active: bool,
}

/// A dated shift or meeting worked by a volunteer. `date` is epoch millis.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: i64,
    pub volunteer_id: VolunteerId,
    pub job_type_name: String,
    pub venue_name: String,
    pub date: i64,
    pub shift_time: ShiftTime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManualRewards {
    pub duration_days: i64,
    pub free_drinks: u32,
    pub bar_discount_percentage: u32,
    pub free_entry: bool,
    pub invites: u32,
    pub other_notes: String,
}

impl Default for ManualRewards {
    fn default() -> Self {
        Self {
            duration_days: 1,
            free_drinks: 0,
            bar_discount_percentage: 0,
            free_entry: false,
            invites: 0,
            other_notes: String::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobTypeConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Counts towards Nova, Etoile and Galaxie.
    #[serde(default = "default_true")]
    pub is_shift_job: bool,
    /// Starts an Orion year.
    #[serde(default)]
    pub is_orion_job: bool,
    #[serde(default)]
    pub benefit_system: BenefitSystemType,
    #[serde(default)]
    pub manual_rewards: Option<ManualRewards>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Benefit {
    pub rank: Option<VolunteerRank>,
    pub description: String,
    pub free_entry: bool,
    pub friend_invitation: bool,
    pub invite_count: u32,
    pub drink_tokens: u32,
    pub bar_discount: u32,
    pub guest_list_access: bool,
    pub extraordinary_benefits: bool,
    pub valid_until: Option<i64>,
    pub is_active: bool,
}

impl Benefit {
    pub fn none() -> Self {
        Self {
            rank: None,
            description: "No benefits - no rank earned".to_string(),
            free_entry: false,
            friend_invitation: false,
            invite_count: 0,
            drink_tokens: 0,
            bar_discount: 0,
            guest_list_access: false,
            extraordinary_benefits: false,
            valid_until: None,
            is_active: false,
        }
    }

    /// Guest-list access that is still usable at `at`.
    pub fn grants_guest_list_at(&self, at: i64) -> bool {
        self.is_active
            && self.guest_list_access
            && self.valid_until.map_or(true, |until| at < until)
    }
}

#[derive(Debug, Clone)]
pub struct VolunteerBenefitStatus {
    pub volunteer_id: VolunteerId,
    pub rank: Option<VolunteerRank>,
    pub benefits: Benefit,
    pub active_benefits: Vec<Benefit>,
    pub last_job_date: Option<i64>,
    pub monthly_shifts: usize,
    pub is_eligible_for_galaxie: bool,
    pub is_eligible_for_etoile: bool,
    pub is_eligible_for_nova: bool,
}

/// One bucket of an analytics series.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
    pub timestamp: i64,
}
