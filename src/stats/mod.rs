//! Day / week / month / year rollups, recomputed from the session log on
//! every call.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{Datelike, Local};

use crate::{
    models::{
        session::{date_key, month_key, parse_month_key},
        DayStats, MonthStats, Session, WeekStats, YearStats,
    },
    storage::Storage,
};

pub mod goal;
pub mod report;

pub use goal::GoalProgress;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone)]
pub struct StatsAggregator {
    storage: Storage,
}

/// Count and minutes over the completed sessions in `sessions`.
fn completed_totals<'a, I>(sessions: I) -> (u32, u64)
where
    I: IntoIterator<Item = &'a Session>,
{
    sessions
        .into_iter()
        .filter(|session| session.completed)
        .fold((0, 0), |(count, minutes), session| {
            (count + 1, minutes + session.actual_minutes())
        })
}

fn day_from(date: String, sessions: Vec<Session>) -> DayStats {
    let (sessions_count, total_minutes) = completed_totals(&sessions);
    DayStats {
        date,
        sessions_count,
        total_minutes,
        sessions,
    }
}

impl StatsAggregator {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn day_stats(&self, date: &str) -> Result<DayStats> {
        Ok(day_from(date.to_string(), self.storage.sessions_by_date(date)?))
    }

    pub fn week_stats(&self, year: i32, week: u32) -> Result<WeekStats> {
        let sessions = self.storage.sessions_by_week(year, week)?;
        let (sessions_count, total_minutes) = completed_totals(&sessions);

        let mut by_date: BTreeMap<String, Vec<Session>> = BTreeMap::new();
        for session in sessions.into_iter().filter(|session| session.completed) {
            by_date.entry(session.date.clone()).or_default().push(session);
        }

        let daily_stats = by_date
            .into_iter()
            .map(|(date, sessions)| day_from(date, sessions))
            .collect();

        Ok(WeekStats {
            week,
            year,
            sessions_count,
            total_minutes,
            daily_stats,
        })
    }

    pub fn month_stats(&self, year: i32, month: u32) -> Result<MonthStats> {
        let sessions = self.storage.sessions_by_month(year, month)?;
        let (sessions_count, total_minutes) = completed_totals(&sessions);

        let mut by_week: BTreeMap<u32, Vec<Session>> = BTreeMap::new();
        for session in sessions.into_iter().filter(|session| session.completed) {
            by_week.entry(session.week).or_default().push(session);
        }

        let weekly_stats = by_week
            .into_iter()
            .map(|(week, sessions)| {
                let (sessions_count, total_minutes) = completed_totals(&sessions);
                WeekStats {
                    week,
                    year,
                    sessions_count,
                    total_minutes,
                    daily_stats: Vec::new(),
                }
            })
            .collect();

        Ok(MonthStats {
            month: month_key(year, month),
            year,
            sessions_count,
            total_minutes,
            weekly_stats,
        })
    }

    pub fn year_stats(&self, year: i32) -> Result<YearStats> {
        let sessions = self.storage.sessions_by_year(year)?;
        let (sessions_count, total_minutes) = completed_totals(&sessions);

        let mut months = Vec::new();
        for session in sessions.iter().filter(|session| session.completed) {
            match parse_month_key(&session.month) {
                Some((_, month)) => months.push(month),
                None => crate::log_warn!(
                    "Session {} has malformed month key '{}'",
                    session.id,
                    session.month
                ),
            }
        }
        months.sort_unstable();
        months.dedup();

        let monthly_stats = months
            .into_iter()
            .map(|month| self.month_stats(year, month))
            .collect::<Result<Vec<_>>>()?;

        Ok(YearStats {
            year,
            sessions_count,
            total_minutes,
            monthly_stats,
        })
    }

    pub fn today(&self) -> Result<DayStats> {
        Ok(day_from(date_key(&Local::now()), self.storage.today_sessions()?))
    }

    pub fn current_week(&self) -> Result<WeekStats> {
        let now = Local::now();
        self.week_stats(now.year(), now.iso_week().week())
    }

    pub fn current_month(&self) -> Result<MonthStats> {
        let now = Local::now();
        self.month_stats(now.year(), now.month())
    }

    pub fn current_year(&self) -> Result<YearStats> {
        self.year_stats(Local::now().year())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{cancelled_at, completed_at};
    use super::*;
    use crate::storage::test_support::temp_storage;

    fn aggregator_with(sessions: &[Session]) -> (tempfile::TempDir, StatsAggregator) {
        let (dir, storage) = temp_storage();
        for session in sessions {
            storage.append_or_update(session).unwrap();
        }
        (dir, StatsAggregator::new(storage))
    }

    #[test]
    fn day_counts_completed_but_lists_everything() {
        let (_dir, stats) = aggregator_with(&[
            completed_at(2024, 3, 5, 9, 1500),
            cancelled_at(2024, 3, 5, 11),
            completed_at(2024, 3, 5, 14, 3000),
            completed_at(2024, 3, 6, 9, 1500),
        ]);

        let day = stats.day_stats("2024-03-05").unwrap();

        assert_eq!(day.date, "2024-03-05");
        assert_eq!(day.sessions_count, 2);
        assert_eq!(day.total_minutes, 75);
        assert_eq!(day.sessions.len(), 3);
    }

    #[test]
    fn empty_day_is_zeroed() {
        let (_dir, stats) = aggregator_with(&[]);
        let day = stats.day_stats("2024-03-05").unwrap();
        assert_eq!(day.sessions_count, 0);
        assert_eq!(day.total_minutes, 0);
        assert!(day.sessions.is_empty());
    }

    #[test]
    fn week_ten_of_2024_single_session() {
        let (_dir, stats) = aggregator_with(&[completed_at(2024, 3, 6, 10, 1800)]);

        let week = stats.week_stats(2024, 10).unwrap();

        assert_eq!(week.sessions_count, 1);
        assert_eq!(week.total_minutes, 30);
        assert_eq!(week.daily_stats.len(), 1);
        assert_eq!(week.daily_stats[0].sessions_count, 1);
        assert_eq!(week.daily_stats[0].total_minutes, 30);
    }

    #[test]
    fn week_groups_completed_sessions_by_date_in_order() {
        let (_dir, stats) = aggregator_with(&[
            completed_at(2024, 3, 7, 9, 600),
            completed_at(2024, 3, 4, 9, 1200),
            cancelled_at(2024, 3, 5, 9),
            completed_at(2024, 3, 7, 15, 1200),
            completed_at(2024, 3, 11, 9, 1200),
        ]);

        let week = stats.week_stats(2024, 10).unwrap();

        assert_eq!(week.sessions_count, 3);
        assert_eq!(week.total_minutes, 50);
        let days: Vec<_> = week
            .daily_stats
            .iter()
            .map(|day| (day.date.as_str(), day.sessions_count, day.total_minutes))
            .collect();
        assert_eq!(days, vec![("2024-03-04", 1, 20), ("2024-03-07", 2, 30)]);

        let summed: u64 = week.daily_stats.iter().map(|day| day.total_minutes).sum();
        assert_eq!(summed, week.total_minutes);
    }

    #[test]
    fn month_groups_by_iso_week() {
        let (_dir, stats) = aggregator_with(&[
            completed_at(2024, 3, 4, 9, 1500),
            completed_at(2024, 3, 12, 9, 1500),
            completed_at(2024, 3, 13, 9, 0),
            cancelled_at(2024, 3, 20, 9),
            completed_at(2024, 4, 1, 9, 1500),
        ]);

        let month = stats.month_stats(2024, 3).unwrap();

        assert_eq!(month.month, "2024-03");
        assert_eq!(month.sessions_count, 3);
        // zero elapsed and end == start: counts as the 30 min plan
        assert_eq!(month.total_minutes, 25 + 25 + 30);
        let weeks: Vec<_> = month
            .weekly_stats
            .iter()
            .map(|week| (week.week, week.sessions_count, week.total_minutes))
            .collect();
        assert_eq!(weeks, vec![(10, 1, 25), (11, 2, 55)]);
    }

    #[test]
    fn year_nests_month_rollups() {
        let (_dir, stats) = aggregator_with(&[
            completed_at(2024, 5, 2, 9, 1200),
            completed_at(2024, 1, 10, 9, 1800),
            completed_at(2024, 5, 20, 9, 600),
            cancelled_at(2024, 7, 1, 9),
            completed_at(2023, 12, 30, 9, 1800),
        ]);

        let year = stats.year_stats(2024).unwrap();

        assert_eq!(year.sessions_count, 3);
        assert_eq!(year.total_minutes, 60);
        let months: Vec<_> = year
            .monthly_stats
            .iter()
            .map(|month| (month.month.as_str(), month.sessions_count, month.total_minutes))
            .collect();
        assert_eq!(months, vec![("2024-01", 1, 30), ("2024-05", 2, 30)]);
        assert_eq!(year.monthly_stats[1].weekly_stats.len(), 2);
    }

    #[test]
    fn current_period_helpers_see_todays_session() {
        let (_dir, storage) = temp_storage();
        let mut session = Session::begin(25, Local::now());
        session.active = false;
        session.completed = true;
        session.elapsed_seconds = 1500;
        storage.append_or_update(&session).unwrap();
        let stats = StatsAggregator::new(storage);

        assert_eq!(stats.today().unwrap().sessions_count, 1);
        assert_eq!(stats.current_week().unwrap().sessions_count, 1);
        assert_eq!(stats.current_month().unwrap().sessions_count, 1);
        assert_eq!(stats.current_year().unwrap().total_minutes, 25);
    }
}
