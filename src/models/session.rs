//! Session record as persisted in `sessions.json`.
//!
//! The bucket keys (`date`, `week`, `month`, `year`) are derived from the
//! start time once, at creation, and never recomputed.

use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    #[serde(default, with = "timestamp")]
    pub start_time: Option<DateTime<Local>>,
    #[serde(default, with = "timestamp")]
    pub end_time: Option<DateTime<Local>>,
    /// Planned length in minutes.
    #[serde(rename = "duration")]
    pub planned_minutes: u32,
    pub completed: bool,
    /// `YYYY-MM-DD`
    pub date: String,
    /// ISO week number
    pub week: u32,
    /// `YYYY-MM`
    pub month: String,
    pub year: i32,
    pub active: bool,
    #[serde(default)]
    pub elapsed_seconds: u64,
    #[serde(default)]
    pub paused: bool,
}

impl Session {
    /// A fresh in-flight session starting at `started_at`.
    pub fn begin(planned_minutes: u32, started_at: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time: Some(started_at),
            end_time: None,
            planned_minutes,
            completed: false,
            date: date_key(&started_at),
            week: started_at.iso_week().week(),
            month: month_key(started_at.year(), started_at.month()),
            year: started_at.year(),
            active: true,
            elapsed_seconds: 0,
            paused: false,
        }
    }

    pub fn planned_seconds(&self) -> u64 {
        u64::from(self.planned_minutes) * 60
    }

    pub fn is_in_flight(&self) -> bool {
        self.active && !self.completed
    }

    /// Minutes this session counts for in every rollup.
    ///
    /// Elapsed seconds win when nonzero, then the wall-clock span between
    /// start and end, then the planned duration.
    pub fn actual_minutes(&self) -> u64 {
        let from_elapsed = self.elapsed_seconds / 60;
        if from_elapsed > 0 {
            return from_elapsed;
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            let span = (end - start).num_minutes();
            if span > 0 {
                return span as u64;
            }
        }

        u64::from(self.planned_minutes)
    }
}

pub fn date_key(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d").to_string()
}

pub fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Parses the month number out of a `YYYY-MM` key.
pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.split_once('-')?;
    let year = year.parse().ok()?;
    let month = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// RFC 3339 timestamps where an unset value is written as the zero instant
/// `0001-01-01T00:00:00Z`. Anything dated year 1 or earlier reads back as unset.
mod timestamp {
    use chrono::{DateTime, Datelike, Local, SecondsFormat};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const UNSET: &str = "0001-01-01T00:00:00Z";

    pub fn serialize<S>(value: &Option<DateTime<Local>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(at) => serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            None => serializer.serialize_str(UNSET),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };

        let parsed = DateTime::parse_from_rfc3339(&raw)
            .map_err(|err| de::Error::custom(format!("invalid timestamp '{raw}': {err}")))?;

        if parsed.year() <= 1 {
            return Ok(None);
        }

        Ok(Some(parsed.with_timezone(&Local)))
    }
}
