use anyhow::Result;
use serde::Serialize;
use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};

use crate::models::Session;

use super::{SessionTimer, TickOutcome, TimerSnapshot, TimerStatus};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Pause,
    Resume,
    Cancel,
    /// Stop driving but keep the session resumable.
    Exit,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    StateChanged { snapshot: TimerSnapshot },
    Heartbeat { snapshot: TimerSnapshot },
    Completed { session: Session },
}

/// Owns the timer for the lifetime of one foreground run.
///
/// The one-second interval is only polled while the timer is running, so no
/// tick can land after a pause, cancel or completion.
pub struct TimerDriver {
    timer: SessionTimer,
    commands: mpsc::UnboundedReceiver<TimerCommand>,
    events: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerDriver {
    pub fn new(
        timer: SessionTimer,
        commands: mpsc::UnboundedReceiver<TimerCommand>,
        events: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        Self {
            timer,
            commands,
            events,
        }
    }

    /// Runs until the session completes, is cancelled, or an `Exit` arrives.
    /// A closed command channel is treated as `Exit`.
    pub async fn run(mut self) -> Result<SessionTimer> {
        let mut interval = time::interval(self.timer.options().tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.reset();

        self.emit_state();

        loop {
            if !self.timer.status().is_live() {
                break;
            }
            let running = self.timer.status() == TimerStatus::Running;

            tokio::select! {
                _ = interval.tick(), if running => {
                    match self.timer.tick()? {
                        TickOutcome::Completed(session) => {
                            self.emit_state();
                            self.emit(TimerEvent::Completed { session });
                        }
                        TickOutcome::Advanced { checkpointed: true, .. } => {
                            self.emit(TimerEvent::Heartbeat {
                                snapshot: self.timer.snapshot(),
                            });
                        }
                        TickOutcome::Advanced { .. } | TickOutcome::Ignored => {}
                    }
                }
                command = self.commands.recv() => {
                    let command = command.unwrap_or(TimerCommand::Exit);
                    if let Err(err) = self.apply(command) {
                        crate::log_warn!("Ignoring {command:?}: {err:#}");
                        continue;
                    }
                    if command == TimerCommand::Resume {
                        interval.reset();
                    }
                    self.emit_state();
                    if command == TimerCommand::Exit {
                        break;
                    }
                }
            }
        }

        Ok(self.timer)
    }

    fn apply(&mut self, command: TimerCommand) -> Result<()> {
        match command {
            TimerCommand::Pause => self.timer.pause(),
            TimerCommand::Resume => self.timer.resume(),
            TimerCommand::Cancel => self.timer.cancel().map(|_| ()),
            TimerCommand::Exit => self.timer.exit_without_terminating(),
        }
    }

    fn emit_state(&self) {
        self.emit(TimerEvent::StateChanged {
            snapshot: self.timer.snapshot(),
        });
    }

    fn emit(&self, event: TimerEvent) {
        // Nobody listening is fine; the store is the source of truth.
        let _ = self.events.send(event);
    }
}
