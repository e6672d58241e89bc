use std::{env, str::FromStr, time::Duration};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

const ENABLE_LOGS: bool = true;

pub const DEFAULT_CHECKPOINT_EVERY: u32 = 10;

const CHECKPOINT_ENV: &str = "FOCUSSESSIONS_CHECKPOINT_EVERY";
const DEBUG_ENV: &str = "FOCUSSESSIONS_DEBUG";
const RECOVERY_ENV: &str = "FOCUSSESSIONS_RECOVERY";

/// How elapsed time is rebuilt for a session that was running when the
/// process went away.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryPolicy {
    /// Count wall-clock time since the session started, capped at the plan.
    #[default]
    WallClock,
    /// Resume from the last persisted elapsed value.
    Persisted,
}

impl FromStr for RecoveryPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wall-clock" | "wallclock" => Ok(RecoveryPolicy::WallClock),
            "persisted" => Ok(RecoveryPolicy::Persisted),
            other => bail!("unknown recovery policy '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerOptions {
    /// Persist the running session every this many ticks.
    pub checkpoint_every: u32,
    pub recovery: RecoveryPolicy,
    pub tick_interval: Duration,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            recovery: RecoveryPolicy::default(),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl TimerOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        let debug_mode = lookup(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if debug_mode {
            options.checkpoint_every = 1;
        } else if let Some(raw) = lookup(CHECKPOINT_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(every) if every > 0 => options.checkpoint_every = every,
                _ => crate::log_warn!(
                    "Ignoring {CHECKPOINT_ENV}={raw}; using {DEFAULT_CHECKPOINT_EVERY}"
                ),
            }
        }

        if let Some(raw) = lookup(RECOVERY_ENV) {
            match raw.parse() {
                Ok(policy) => options.recovery = policy,
                Err(err) => crate::log_warn!("Ignoring {RECOVERY_ENV}: {err}"),
            }
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn options_from(pairs: &[(&str, &str)]) -> TimerOptions {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TimerOptions::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        assert_eq!(options_from(&[]), TimerOptions::default());
        assert_eq!(TimerOptions::default().checkpoint_every, 10);
    }

    #[test]
    fn reads_checkpoint_and_recovery() {
        let options = options_from(&[(CHECKPOINT_ENV, "30"), (RECOVERY_ENV, "persisted")]);
        assert_eq!(options.checkpoint_every, 30);
        assert_eq!(options.recovery, RecoveryPolicy::Persisted);
    }

    #[test]
    fn debug_checkpoints_every_tick() {
        let options = options_from(&[(DEBUG_ENV, "true"), (CHECKPOINT_ENV, "30")]);
        assert_eq!(options.checkpoint_every, 1);
    }

    #[test]
    fn invalid_values_fall_back() {
        let options = options_from(&[(CHECKPOINT_ENV, "0"), (RECOVERY_ENV, "sometimes")]);
        assert_eq!(options, TimerOptions::default());
    }
}
