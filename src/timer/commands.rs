//! One-shot operations on the persisted active session.
//!
//! Each call recovers the timer from disk, applies a single transition and
//! leaves the result persisted, so separate process invocations can drive
//! the same session. A session is only ever left running while a foreground
//! driver owns it; `resume_live` and `start_or_recover` hand back a running
//! timer for the caller to drive.

use anyhow::{bail, Result};

use crate::{models::Session, storage::Storage};

use super::{SessionTimer, TimerOptions, TimerSnapshot, TimerStatus};

fn recover_live(storage: &Storage, options: TimerOptions) -> Result<SessionTimer> {
    let timer = SessionTimer::recover(storage.clone(), options)?;
    if !timer.status().is_live() {
        bail!("no active session");
    }
    Ok(timer)
}

pub fn get_timer_state(storage: &Storage, options: TimerOptions) -> Result<TimerSnapshot> {
    Ok(SessionTimer::recover(storage.clone(), options)?.snapshot())
}

/// Pauses the active session, first folding in any time counted while no
/// process was driving it.
pub fn pause_active(storage: &Storage, options: TimerOptions) -> Result<TimerSnapshot> {
    let mut timer = recover_live(storage, options)?;
    timer.pause()?;
    Ok(timer.snapshot())
}

/// Recovers the live session and leaves it running, ready to be driven.
pub fn resume_live(storage: &Storage, options: TimerOptions) -> Result<SessionTimer> {
    let mut timer = recover_live(storage, options)?;
    if timer.status() == TimerStatus::Paused {
        timer.resume()?;
    }
    Ok(timer)
}

pub fn cancel_active(storage: &Storage, options: TimerOptions) -> Result<Session> {
    let mut timer = recover_live(storage, options)?;
    timer.cancel()
}

/// Returns a running timer ready to be driven: the recovered live session
/// (resumed if it was paused) when one exists, otherwise a freshly started one.
pub fn start_or_recover(
    storage: &Storage,
    options: TimerOptions,
    planned_minutes: Option<u32>,
) -> Result<SessionTimer> {
    let mut timer = SessionTimer::recover(storage.clone(), options)?;
    match timer.status() {
        TimerStatus::Running => {}
        TimerStatus::Paused => timer.resume()?,
        _ => {
            timer.start(planned_minutes)?;
        }
    }
    Ok(timer)
}
