use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::benefits::BenefitRules;
use crate::dates;
use crate::models::JobTypeConfig;

pub const CONFIG_ENV: &str = "EVENTMANAGER_STATS_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub job_types: Vec<JobTypeConfig>,
    /// Hours after midnight at which the event day rolls over.
    pub day_change_offset_hours: i64,
    pub utc_offset_minutes: i32,
}

impl AnalyticsConfig {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid analytics config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&raw)?;
        log::info!(
            "Loaded {} job types from {}",
            config.job_types.len(),
            path.display()
        );
        Ok(config)
    }

    /// Explicit path first, then the environment, then built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load(&path),
            None => {
                log::warn!("No config given; job types default to none");
                Ok(Self::default())
            }
        }
    }

    pub fn rules(&self) -> BenefitRules {
        BenefitRules {
            job_types: self.job_types.clone(),
            day_change_offset_hours: self.day_change_offset_hours,
            tz: dates::utc_offset(self.utc_offset_minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BenefitSystemType;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "day_change_offset_hours": 3,
        "utc_offset_minutes": 60,
        "job_types": [
            { "name": "Bar" },
            { "name": "Committee", "is_shift_job": false, "is_orion_job": true },
            {
                "name": "Festival",
                "benefit_system": "MANUAL",
                "manual_rewards": { "duration_days": 3, "free_drinks": 4 }
            }
        ]
    }"#;

    #[test]
    fn parses_job_types_with_defaults() {
        let config = AnalyticsConfig::from_json(SAMPLE).expect("config parses");
        assert_eq!(config.day_change_offset_hours, 3);
        assert_eq!(config.job_types.len(), 3);

        let bar = &config.job_types[0];
        assert!(bar.is_active && bar.is_shift_job && !bar.is_orion_job);
        assert_eq!(bar.benefit_system, BenefitSystemType::Stellar);

        let festival = &config.job_types[2];
        assert_eq!(festival.benefit_system, BenefitSystemType::Manual);
        let rewards = festival.manual_rewards.as_ref().expect("rewards");
        assert_eq!(rewards.duration_days, 3);
        assert_eq!(rewards.free_drinks, 4);
        assert_eq!(rewards.invites, 0);
    }

    #[test]
    fn rules_carry_offsets() {
        let rules = AnalyticsConfig::from_json(SAMPLE).expect("config parses").rules();
        assert_eq!(rules.tz.local_minus_utc(), 3600);
        assert_eq!(rules.day_change_offset_hours, 3);
    }

    #[test]
    fn empty_object_is_default() {
        let config = AnalyticsConfig::from_json("{}").expect("config parses");
        assert!(config.job_types.is_empty());
        assert_eq!(config.utc_offset_minutes, 0);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write config");
        let config = AnalyticsConfig::load(file.path()).expect("config loads");
        assert_eq!(config.job_types[1].name, "Committee");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(AnalyticsConfig::from_json("{ not json").is_err());
    }

    // Single test so no other test races on the environment variable.
    #[test]
    fn resolve_prefers_explicit_path_then_environment() {
        let mut explicit = tempfile::NamedTempFile::new().expect("temp file");
        explicit.write_all(SAMPLE.as_bytes()).expect("write config");
        let mut from_env = tempfile::NamedTempFile::new().expect("temp file");
        from_env
            .write_all(br#"{ "day_change_offset_hours": 5 }"#)
            .expect("write config");

        std::env::set_var(CONFIG_ENV, from_env.path());
        let config = AnalyticsConfig::resolve(Some(explicit.path())).expect("explicit config");
        assert_eq!(config.day_change_offset_hours, 3);
        assert_eq!(config.job_types.len(), 3);

        let config = AnalyticsConfig::resolve(None).expect("environment config");
        assert_eq!(config.day_change_offset_hours, 5);
        assert!(config.job_types.is_empty());

        std::env::remove_var(CONFIG_ENV);
        let config = AnalyticsConfig::resolve(None).expect("default config");
        assert_eq!(config.day_change_offset_hours, 0);
        assert!(config.job_types.is_empty());

        assert!(AnalyticsConfig::resolve(Some(Path::new("/nonexistent/rules.json"))).is_err());
    }
}
