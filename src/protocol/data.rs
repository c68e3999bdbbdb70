use serde::{Deserialize, Serialize};

use crate::domain::entity::settings::SettingsPatch;
use crate::domain::entity::{DailyStats, PomodoroSettings, TimerPhase, TimerState};

/// A [`Protocol`] represents the underlying data type used by
/// the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Protocol {
    Request(Request),
    Response(Response),
}

/// A [`Request`] represents requests from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Request {
    Start,
    Pause,
    Reset,
    SetPhase {
        phase: TimerPhase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_millis: Option<u64>,
    },
    Query,
    /// Keep the connection open and stream every published state.
    Watch,
    Settings,
    UpdateSettings {
        patch: SettingsPatch,
    },
    Stats,
}

/// A [`Response`] represents a daemon's reply. Requests that change or read
/// the timer are answered with the settled state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Response {
    Start { state: TimerState },
    Pause { state: TimerState },
    Reset { state: TimerState },
    SetPhase { state: TimerState },
    Query { state: TimerState },
    Watch { state: TimerState },
    Settings { settings: PomodoroSettings },
    UpdateSettings { settings: PomodoroSettings },
    Stats { stats: DailyStats },
    Failure { message: String },
}
