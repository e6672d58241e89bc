//! Plain-text statistics export.

use std::{
    collections::BTreeSet,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate};

use crate::models::{session::date_key, Session};

use super::StatsAggregator;

const ENABLE_LOGS: bool = true;

/// `"{h}h {m}m"` from one hour up, `"{m}m"` below.
pub fn format_minutes(total: u64) -> String {
    let (hours, minutes) = (total / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn clock(at: Option<DateTime<Local>>) -> String {
    at.map(|at| at.format("%-I:%M %p").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn month_name(key: &str) -> String {
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
        .map(|date| date.format("%B").to_string())
        .unwrap_or_else(|_| key.to_string())
}

fn weekday_name(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|date| date.format("%A").to_string())
        .unwrap_or_else(|_| date.to_string())
}

pub fn render_report(stats: &StatsAggregator, now: DateTime<Local>) -> Result<String> {
    let sessions = stats.storage().all_sessions()?;
    let mut out = String::new();

    writeln!(out, "Focus Sessions - Statistics Report")?;
    writeln!(out, "Generated: {}", now.format("%B %-d, %Y %-I:%M %p"))?;
    writeln!(out, "=====================================")?;
    writeln!(out)?;

    let completed: Vec<&Session> = sessions.iter().filter(|session| session.completed).collect();
    let total_minutes: u64 = completed.iter().map(|session| session.actual_minutes()).sum();

    writeln!(out, "OVERALL STATISTICS")?;
    writeln!(out, "------------------")?;
    writeln!(out, "Total Sessions: {}", sessions.len())?;
    writeln!(out, "Completed Sessions: {}", completed.len())?;
    writeln!(out, "Total Focus Time: {}", format_minutes(total_minutes))?;
    if !completed.is_empty() {
        writeln!(
            out,
            "Average Session Duration: {} minutes",
            total_minutes / completed.len() as u64
        )?;
    }
    writeln!(out)?;

    let years: BTreeSet<i32> = completed.iter().map(|session| session.year).collect();
    for year in years {
        let year_stats = stats.year_stats(year)?;
        writeln!(out, "YEAR {year}")?;
        writeln!(out, "--------")?;
        writeln!(out, "Sessions: {}", year_stats.sessions_count)?;
        writeln!(out, "Total Time: {}", format_minutes(year_stats.total_minutes))?;
        writeln!(
            out,
            "Average: {:.1} sessions per day",
            f64::from(year_stats.sessions_count) / 365.0
        )?;
        writeln!(out)?;

        for month in &year_stats.monthly_stats {
            writeln!(out, "  {}:", month_name(&month.month))?;
            writeln!(out, "    Sessions: {}", month.sessions_count)?;
            writeln!(out, "    Total Time: {}", format_minutes(month.total_minutes))?;
        }
        writeln!(out)?;
    }

    let week = stats.week_stats(now.year(), now.iso_week().week())?;
    if week.sessions_count > 0 {
        writeln!(out, "CURRENT WEEK (Week {}, {})", week.week, week.year)?;
        writeln!(out, "------------------------")?;
        writeln!(out, "Sessions: {}", week.sessions_count)?;
        writeln!(out, "Total Time: {}", format_minutes(week.total_minutes))?;
        for day in &week.daily_stats {
            writeln!(
                out,
                "  {}: {} sessions ({})",
                weekday_name(&day.date),
                day.sessions_count,
                format_minutes(day.total_minutes)
            )?;
        }
        writeln!(out)?;
    }

    let today = stats.day_stats(&date_key(&now))?;
    if today.sessions_count > 0 {
        writeln!(out, "TODAY ({})", now.format("%A, %B %-d, %Y"))?;
        writeln!(out, "-------------------------------")?;
        writeln!(out, "Sessions: {}", today.sessions_count)?;
        writeln!(out, "Total Time: {}", format_minutes(today.total_minutes))?;
        writeln!(out)?;
        writeln!(out, "Session Details:")?;
        for (index, session) in today.sessions.iter().filter(|s| s.completed).enumerate() {
            writeln!(
                out,
                "  Session {}: {} - {} ({} min)",
                index + 1,
                clock(session.start_time),
                clock(session.end_time),
                session.actual_minutes()
            )?;
        }
    }

    Ok(out)
}

pub fn report_file_name(now: DateTime<Local>) -> String {
    format!("focussessions-stats-{}.txt", now.format("%Y-%m-%d-%H%M%S"))
}

/// Writes the report into `preferred_dir`, falling back to the data directory
/// when that is missing or unwritable. Returns the path written.
pub fn export_report_to(
    stats: &StatsAggregator,
    preferred_dir: Option<&Path>,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let report = render_report(stats, now)?;
    let file_name = report_file_name(now);

    if let Some(dir) = preferred_dir {
        let path = dir.join(&file_name);
        match fs::write(&path, &report) {
            Ok(()) => {
                crate::log_info!("Exported statistics to {}", path.display());
                return Ok(path);
            }
            Err(err) => crate::log_warn!(
                "Could not write {} ({err}); falling back to the data directory",
                path.display()
            ),
        }
    }

    let path = stats.storage().data_dir().join(&file_name);
    fs::write(&path, &report)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    crate::log_info!("Exported statistics to {}", path.display());
    Ok(path)
}

/// Exports to the user's downloads directory.
pub fn export_report(stats: &StatsAggregator) -> Result<PathBuf> {
    let downloads = dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")));
    export_report_to(stats, downloads.as_deref(), Local::now())
        .map_err(|err| anyhow!("export failed: {err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stats::test_support::completed_at, storage::test_support::temp_storage};
    use chrono::TimeZone;

    fn fixture() -> (tempfile::TempDir, StatsAggregator) {
        let (dir, storage) = temp_storage();
        for session in [
            completed_at(2024, 3, 4, 9, 1500),
            completed_at(2024, 3, 6, 9, 3000),
            completed_at(2024, 3, 6, 14, 1800),
            completed_at(2023, 11, 2, 9, 1200),
        ] {
            storage.append_or_update(&session).unwrap();
        }
        let mut cancelled = completed_at(2024, 3, 6, 16, 600);
        cancelled.completed = false;
        storage.append_or_update(&cancelled).unwrap();
        (dir, StatsAggregator::new(storage))
    }

    fn report_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 6, 18, 30, 0).unwrap()
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(59), "59m");
        assert_eq!(format_minutes(60), "1h 0m");
        assert_eq!(format_minutes(135), "2h 15m");
    }

    #[test]
    fn report_covers_every_section() {
        let (_dir, stats) = fixture();
        let report = render_report(&stats, report_now()).unwrap();

        assert!(report.starts_with("Focus Sessions - Statistics Report\n"));
        assert!(report.contains("Generated: March 6, 2024 6:30 PM"));
        assert!(report.contains("Total Sessions: 5\n"));
        assert!(report.contains("Completed Sessions: 4\n"));
        assert!(report.contains("Total Focus Time: 2h 5m\n"));
        assert!(report.contains("Average Session Duration: 31 minutes\n"));

        let year_2023 = report.find("YEAR 2023").unwrap();
        let year_2024 = report.find("YEAR 2024").unwrap();
        assert!(year_2023 < year_2024);
        assert!(report.contains("  November:\n    Sessions: 1\n    Total Time: 20m\n"));
        assert!(report.contains("  March:\n    Sessions: 3\n    Total Time: 1h 45m\n"));

        assert!(report.contains("CURRENT WEEK (Week 10, 2024)"));
        assert!(report.contains("  Monday: 1 sessions (25m)\n"));
        assert!(report.contains("  Wednesday: 2 sessions (1h 20m)\n"));

        assert!(report.contains("TODAY (Wednesday, March 6, 2024)"));
        assert!(report.contains("  Session 1: 9:00 AM - 9:50 AM (50 min)\n"));
        assert!(report.contains("  Session 2: 2:00 PM - 2:30 PM (30 min)\n"));
        assert!(!report.contains("Session 3:"));
    }

    #[test]
    fn empty_log_reports_only_totals() {
        let (_dir, storage) = temp_storage();
        let report = render_report(&StatsAggregator::new(storage), report_now()).unwrap();

        assert!(report.contains("Total Sessions: 0\n"));
        assert!(report.contains("Total Focus Time: 0m\n"));
        assert!(!report.contains("Average Session Duration"));
        assert!(!report.contains("YEAR"));
        assert!(!report.contains("CURRENT WEEK"));
        assert!(!report.contains("TODAY"));
    }

    #[test]
    fn export_writes_timestamped_file() {
        let (_dir, stats) = fixture();
        let target = tempfile::tempdir().unwrap();

        let path = export_report_to(&stats, Some(target.path()), report_now()).unwrap();

        assert_eq!(path, target.path().join("focussessions-stats-2024-03-06-183000.txt"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("OVERALL STATISTICS"));
    }

    #[test]
    fn export_falls_back_to_data_dir() {
        let (dir, stats) = fixture();
        let missing = dir.path().join("no-such-dir");

        let path = export_report_to(&stats, Some(missing.as_path()), report_now()).unwrap();

        assert_eq!(path.parent(), Some(stats.storage().data_dir()));
        assert!(path.exists());
    }
}
