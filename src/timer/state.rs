use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Session;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Completed => "completed",
            TimerStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a session is in flight (running or paused).
    pub fn is_live(&self) -> bool {
        matches!(self, TimerStatus::Running | TimerStatus::Paused)
    }

    /// States reachable from `self` in one transition.
    pub fn allowed_transitions(&self) -> &'static [TimerStatus] {
        use TimerStatus::*;
        match self {
            Idle | Completed | Cancelled => &[Running],
            Running => &[Paused, Completed, Cancelled],
            Paused => &[Running, Cancelled],
        }
    }

    pub fn can_transition_to(&self, next: TimerStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory bookkeeping for the single in-flight session.
#[derive(Debug, Clone, Default)]
pub struct TimerState {
    pub status: TimerStatus,
    /// Working copy of the session; written back to the store after every event.
    pub session: Option<Session>,
    pub elapsed_seconds: u64,
    pub target_seconds: u64,
    /// Ticks counted since the last write to the store.
    pub ticks_since_checkpoint: u32,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining_seconds(&self) -> u64 {
        match self.status {
            TimerStatus::Idle => 0,
            _ => self.target_seconds.saturating_sub(self.elapsed_seconds),
        }
    }

    /// Fraction of the planned duration that has elapsed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.target_seconds == 0 {
            return 0.0;
        }
        (self.elapsed_seconds as f64 / self.target_seconds as f64).min(1.0)
    }

    pub fn begin_session(&mut self, session: Session) {
        *self = Self {
            status: TimerStatus::Running,
            target_seconds: session.planned_seconds(),
            elapsed_seconds: session.elapsed_seconds,
            session: Some(session),
            ticks_since_checkpoint: 0,
        };
    }

    pub fn restore(&mut self, session: Session, status: TimerStatus, elapsed_seconds: u64) {
        *self = Self {
            status,
            target_seconds: session.planned_seconds(),
            elapsed_seconds,
            session: Some(session),
            ticks_since_checkpoint: 0,
        };
    }

    /// The working session with the current elapsed value folded in.
    pub fn session_snapshot(&self) -> Option<Session> {
        self.session.clone().map(|mut session| {
            session.elapsed_seconds = self.elapsed_seconds;
            session
        })
    }
}
