//! User preferences persisted in `config.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(rename = "session_duration")]
    pub session_duration_minutes: u32,
    pub daily_session_goal: u32,
    pub work_start_hour: u32,
    pub work_end_hour: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_duration_minutes: 60,
            daily_session_goal: 8,
            work_start_hour: 8,
            work_end_hour: 16,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        validation::validate_session_duration(self.session_duration_minutes)?;
        validation::validate_daily_goal(self.daily_session_goal)?;
        validation::validate_work_hours(self.work_start_hour, self.work_end_hour)
    }
}

/// Raw text fields as typed by the user, before parsing.
#[derive(Debug, Clone, Default)]
pub struct ConfigInput {
    pub session_duration: String,
    pub daily_session_goal: String,
    pub work_start_hour: String,
    pub work_end_hour: String,
}

impl ConfigInput {
    pub fn from_config(config: &Config) -> Self {
        Self {
            session_duration: config.session_duration_minutes.to_string(),
            daily_session_goal: config.daily_session_goal.to_string(),
            work_start_hour: config.work_start_hour.to_string(),
            work_end_hour: config.work_end_hour.to_string(),
        }
    }

    /// Parses and validates every field, failing on the first bad one.
    pub fn parse(&self) -> anyhow::Result<Config> {
        use validation::*;

        let session_duration_minutes = parse_field(
            &self.session_duration,
            "session duration",
            "session duration must be between 1-180 minutes",
        )?;
        validate_session_duration(session_duration_minutes)?;

        let daily_session_goal = parse_field(
            &self.daily_session_goal,
            "daily session goal",
            "daily goal must be between 1-24 sessions",
        )?;
        validate_daily_goal(daily_session_goal)?;

        let work_start_hour = parse_field(
            &self.work_start_hour,
            "work start hour",
            "start hour must be between 0-23",
        )?;
        let work_end_hour = parse_field(
            &self.work_end_hour,
            "work end hour",
            "end hour must be between 0-23",
        )?;
        validate_work_hours(work_start_hour, work_end_hour)?;

        Ok(Config {
            session_duration_minutes,
            daily_session_goal,
            work_start_hour,
            work_end_hour,
        })
    }
}

/// Validation functions for config values
pub mod validation {
    use anyhow::{bail, Result};
    use std::ops::RangeInclusive;

    pub const SESSION_DURATION_RANGE: RangeInclusive<u32> = 1..=180;
    pub const DAILY_GOAL_RANGE: RangeInclusive<u32> = 1..=24;
    pub const HOUR_RANGE: RangeInclusive<u32> = 0..=23;

    pub fn validate_session_duration(minutes: u32) -> Result<()> {
        if !SESSION_DURATION_RANGE.contains(&minutes) {
            bail!("session duration must be between 1-180 minutes");
        }
        Ok(())
    }

    pub fn validate_daily_goal(goal: u32) -> Result<()> {
        if !DAILY_GOAL_RANGE.contains(&goal) {
            bail!("daily goal must be between 1-24 sessions");
        }
        Ok(())
    }

    pub fn validate_work_hours(start: u32, end: u32) -> Result<()> {
        if !HOUR_RANGE.contains(&start) {
            bail!("start hour must be between 0-23");
        }
        if !HOUR_RANGE.contains(&end) {
            bail!("end hour must be between 0-23");
        }
        if end <= start {
            bail!("end hour must be greater than start hour");
        }
        Ok(())
    }

    pub(super) fn parse_field(raw: &str, name: &str, range_message: &str) -> Result<u32> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("{name} is required");
        }
        trimmed
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("{range_message}"))
    }
}
