use crate::domain::entity::settings::SettingsPatch;
use crate::domain::entity::TimerPhase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch and initialize a daemon process
    Init,
    /// Start or resume the timer
    Start(StartArguments),
    /// Pause the timer
    Pause,
    /// Discard progress of the current phase
    Reset,
    /// Switch to another phase
    Phase(PhaseArguments),
    /// Show the timer's state. Show all information if no flag is specified.
    Status(StatusArguments),
    /// Follow the timer until interrupted
    Watch,
    /// Show or change settings
    Settings(SettingsPatch),
    /// Show today's statistics
    Stats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartArguments {
    /// Work for a custom number of minutes
    pub minutes: Option<u32>,
    /// Work for the last confirmed number of minutes
    pub last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseArguments {
    pub phase: TimerPhase,
    /// Custom number of minutes instead of the configured duration
    pub minutes: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusArguments {
    /// Show the timer's status
    pub status: bool,
    /// Show the current phase's name
    pub phase: bool,
    /// Show the remaining duration
    pub remaining: bool,
    /// Show the total duration
    pub total: bool,
}

impl StatusArguments {
    fn all(&self) -> bool {
        !self.status && !self.phase && !self.remaining && !self.total
    }

    pub(crate) fn show_status(&self) -> bool {
        self.all() || self.status
    }

    pub(crate) fn show_phase(&self) -> bool {
        self.all() || self.phase
    }

    pub(crate) fn show_remaining(&self) -> bool {
        self.all() || self.remaining
    }

    pub(crate) fn show_total(&self) -> bool {
        self.all() || self.total
    }
}
