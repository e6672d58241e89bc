//! Rollup views derived from the session log. Never persisted.

use serde::{Deserialize, Serialize};

use super::Session;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DayStats {
    pub date: String,
    pub sessions_count: u32,
    pub total_minutes: u64,
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeekStats {
    pub week: u32,
    pub year: i32,
    pub sessions_count: u32,
    pub total_minutes: u64,
    pub daily_stats: Vec<DayStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthStats {
    /// `YYYY-MM`
    pub month: String,
    pub year: i32,
    pub sessions_count: u32,
    pub total_minutes: u64,
    pub weekly_stats: Vec<WeekStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct YearStats {
    pub year: i32,
    pub sessions_count: u32,
    pub total_minutes: u64,
    pub monthly_stats: Vec<MonthStats>,
}
