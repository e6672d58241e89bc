use serde::Serialize;

use crate::models::{Config, DayStats};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GoalProgress {
    pub completed: u32,
    pub goal: u32,
    pub met: bool,
    pub remaining: u32,
}

impl GoalProgress {
    pub fn for_day(day: &DayStats, config: &Config) -> Self {
        let goal = config.daily_session_goal;
        Self {
            completed: day.sessions_count,
            goal,
            met: day.sessions_count >= goal,
            remaining: goal.saturating_sub(day.sessions_count),
        }
    }

    /// Completed fraction of the goal, capped at 1.0.
    pub fn ratio(&self) -> f64 {
        if self.goal == 0 {
            return 1.0;
        }
        (f64::from(self.completed) / f64::from(self.goal)).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_with(count: u32) -> DayStats {
        DayStats {
            date: "2024-03-05".into(),
            sessions_count: count,
            ..DayStats::default()
        }
    }

    #[test]
    fn tracks_remaining_sessions() {
        let config = Config::default();
        let progress = GoalProgress::for_day(&day_with(3), &config);
        assert_eq!(progress.goal, 8);
        assert_eq!(progress.remaining, 5);
        assert!(!progress.met);
        assert_eq!(progress.ratio(), 0.375);
    }

    #[test]
    fn overshooting_the_goal_saturates() {
        let config = Config {
            daily_session_goal: 2,
            ..Config::default()
        };
        let progress = GoalProgress::for_day(&day_with(3), &config);
        assert!(progress.met);
        assert_eq!(progress.remaining, 0);
        assert_eq!(progress.ratio(), 1.0);
    }
}
