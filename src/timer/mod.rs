pub mod commands;
pub mod controller;
pub mod driver;
pub mod options;
pub mod state;

pub use controller::{SessionTimer, TickOutcome, TimerSnapshot};
pub use driver::{TimerCommand, TimerDriver, TimerEvent};
pub use options::{RecoveryPolicy, TimerOptions};
pub use state::{TimerState, TimerStatus};
