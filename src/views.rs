//! Navigation states for a front end, kept apart from any rendering.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ViewState {
    #[default]
    Home,
    Stats,
    StatsDetail(Period),
    Help,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Home,
    Back,
    Help,
    /// Opens the stats overview, or closes it when already there.
    ToggleStats,
    Drill(Period),
    OpenSettings,
}

impl ViewState {
    /// The view reached from `self` by `action`; `None` when the action does
    /// not apply here.
    pub fn apply(self, action: ViewAction) -> Option<ViewState> {
        use ViewState::*;
        match (self, action) {
            (_, ViewAction::Home) => Some(Home),
            (StatsDetail(_), ViewAction::Back) => Some(Stats),
            (Stats | Help | Settings, ViewAction::Back) => Some(Home),
            (Home, ViewAction::Back) => None,
            (Help, _) => None,
            (Stats, ViewAction::ToggleStats) => Some(Home),
            (_, ViewAction::ToggleStats) => Some(Stats),
            (Stats, ViewAction::Drill(period)) => Some(StatsDetail(period)),
            (_, ViewAction::Drill(_)) => None,
            (_, ViewAction::Help) => Some(Help),
            (_, ViewAction::OpenSettings) => Some(Settings),
        }
    }

    /// Applies `action`, staying put when it does not apply.
    pub fn next(self, action: ViewAction) -> ViewState {
        self.apply(action).unwrap_or(self)
    }

    /// Report export is offered from the stats screens only.
    pub fn allows_export(&self) -> bool {
        matches!(self, ViewState::Stats | ViewState::StatsDetail(_))
    }
}
