pub mod cli;
pub mod models;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod utils;
pub mod views;

use clap::Parser;

pub use models::{Config, DayStats, MonthStats, Session, WeekStats, YearStats};
pub use stats::{GoalProgress, StatsAggregator};
pub use storage::Storage;
pub use timer::{SessionTimer, TimerDriver, TimerOptions, TimerStatus};
pub use views::{Period, ViewAction, ViewState};

pub fn run() -> anyhow::Result<()> {
    utils::logging::init();
    cli::execute(cli::Cli::parse())
}
