pub mod config;
pub mod session;
pub mod stats;

pub use config::{Config, ConfigInput};
pub use session::Session;
pub use stats::{DayStats, MonthStats, WeekStats, YearStats};
