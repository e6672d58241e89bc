use anyhow::{anyhow, bail, Result};
use chrono::Local;
use serde::Serialize;

use crate::{models::Session, storage::Storage};

use super::{RecoveryPolicy, TimerOptions, TimerState, TimerStatus};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub session_id: Option<String>,
    pub elapsed_seconds: u64,
    pub target_seconds: u64,
    pub remaining_seconds: u64,
    /// Elapsed share of the plan, `0.0..=1.0`.
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The timer was not running; nothing changed.
    Ignored,
    Advanced { elapsed_seconds: u64, checkpointed: bool },
    Completed(Session),
}

/// State machine for the single in-flight focus session.
///
/// Every state-changing event writes the working session back to the store
/// before the in-memory state moves, so a failed write leaves both sides on
/// the previous state.
pub struct SessionTimer {
    state: TimerState,
    storage: Storage,
    options: TimerOptions,
}

impl SessionTimer {
    pub fn new(storage: Storage, options: TimerOptions) -> Self {
        Self {
            state: TimerState::new(),
            storage,
            options,
        }
    }

    /// Rebuilds the timer from whatever session the store still marks active.
    pub fn recover(storage: Storage, options: TimerOptions) -> Result<Self> {
        let mut timer = Self::new(storage, options);
        let Some(session) = timer.storage.get_active()? else {
            return Ok(timer);
        };

        let target = session.planned_seconds();
        let (status, elapsed) = if session.paused {
            (TimerStatus::Paused, session.elapsed_seconds.min(target))
        } else {
            let elapsed = match (options.recovery, session.start_time) {
                (RecoveryPolicy::WallClock, Some(started_at)) => {
                    let since_start = (Local::now() - started_at).num_seconds().max(0) as u64;
                    since_start.max(session.elapsed_seconds)
                }
                _ => session.elapsed_seconds,
            };
            (TimerStatus::Running, elapsed.min(target))
        };

        crate::log_info!(
            "Recovered session {} as {status} at {elapsed}/{target}s",
            session.id
        );
        timer.state.restore(session, status, elapsed);
        Ok(timer)
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status
    }

    pub fn options(&self) -> &TimerOptions {
        &self.options
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.state.status,
            session_id: self.state.session.as_ref().map(|session| session.id.clone()),
            elapsed_seconds: self.state.elapsed_seconds,
            target_seconds: self.state.target_seconds,
            remaining_seconds: self.state.remaining_seconds(),
            progress: self.state.progress(),
        }
    }

    /// Starts a new session. `planned_minutes` overrides the configured duration.
    pub fn start(&mut self, planned_minutes: Option<u32>) -> Result<Session> {
        self.ensure_transition(TimerStatus::Running, "start")?;

        let planned_minutes = match planned_minutes {
            Some(0) => bail!("planned duration must be greater than zero"),
            Some(minutes) => minutes,
            None => self.storage.get_config()?.session_duration_minutes,
        };

        let session = Session::begin(planned_minutes, Local::now());
        self.storage.begin_exclusive(&session)?;
        self.state.begin_session(session.clone());

        crate::log_info!("Started session {} ({planned_minutes} min)", session.id);
        Ok(session)
    }

    /// Advances a running session by one second.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.state.status != TimerStatus::Running {
            return Ok(TickOutcome::Ignored);
        }

        if self.state.elapsed_seconds < self.state.target_seconds {
            self.state.elapsed_seconds += 1;
            self.state.ticks_since_checkpoint += 1;
        }

        if self.state.elapsed_seconds >= self.state.target_seconds {
            let session = self.finish(TimerStatus::Completed)?;
            return Ok(TickOutcome::Completed(session));
        }

        let mut checkpointed = false;
        if self.state.ticks_since_checkpoint >= self.options.checkpoint_every {
            self.state.ticks_since_checkpoint = 0;
            let session = self.working_session()?;
            match self.storage.append_or_update(&session) {
                Ok(()) => {
                    self.state.session = Some(session);
                    checkpointed = true;
                }
                Err(err) => crate::log_error!("Checkpoint for session {} failed: {err:#}", session.id),
            }
        }

        Ok(TickOutcome::Advanced {
            elapsed_seconds: self.state.elapsed_seconds,
            checkpointed,
        })
    }

    pub fn pause(&mut self) -> Result<()> {
        self.ensure_transition(TimerStatus::Paused, "pause")?;
        let mut session = self.working_session()?;
        session.paused = true;
        self.commit(session, TimerStatus::Paused)?;
        crate::log_info!("Paused at {}s", self.state.elapsed_seconds);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state.status != TimerStatus::Paused {
            bail!("cannot resume while {}", self.state.status);
        }
        let mut session = self.working_session()?;
        session.paused = false;
        self.commit(session, TimerStatus::Running)?;
        crate::log_info!("Resumed at {}s", self.state.elapsed_seconds);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<Session> {
        self.ensure_transition(TimerStatus::Cancelled, "cancel")?;
        self.finish(TimerStatus::Cancelled)
    }

    /// Leaves a live session behind as paused and resumable. No-op otherwise.
    pub fn exit_without_terminating(&mut self) -> Result<()> {
        if !self.state.status.is_live() {
            return Ok(());
        }
        let mut session = self.working_session()?;
        session.paused = true;
        self.commit(session, TimerStatus::Paused)?;
        crate::log_info!(
            "Left session {} paused at {}s",
            self.state.session.as_ref().map(|s| s.id.as_str()).unwrap_or_default(),
            self.state.elapsed_seconds
        );
        Ok(())
    }

    fn finish(&mut self, status: TimerStatus) -> Result<Session> {
        let mut session = self.working_session()?;
        session.end_time = Some(Local::now());
        session.completed = status == TimerStatus::Completed;
        session.active = false;
        session.paused = false;
        self.commit(session.clone(), status)?;
        crate::log_info!(
            "Session {} {status} after {}s",
            session.id,
            session.elapsed_seconds
        );
        Ok(session)
    }

    fn commit(&mut self, session: Session, status: TimerStatus) -> Result<()> {
        self.storage.append_or_update(&session)?;
        self.state.session = Some(session);
        self.state.status = status;
        self.state.ticks_since_checkpoint = 0;
        Ok(())
    }

    fn working_session(&self) -> Result<Session> {
        self.state
            .session_snapshot()
            .ok_or_else(|| anyhow!("no active session"))
    }

    fn ensure_transition(&self, next: TimerStatus, action: &str) -> Result<()> {
        if !self.state.status.can_transition_to(next) {
            bail!("cannot {action} while {}", self.state.status);
        }
        Ok(())
    }
}
