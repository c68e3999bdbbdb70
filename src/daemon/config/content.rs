use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::entity::TimerPhase;

/// Static daemon configuration read from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    pub notification: NotificationSection,
    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// Completion messages of every phase.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSection {
    pub work: MessageSection,
    pub short_break: MessageSection,
    pub long_break: MessageSection,
}

impl NotificationSection {
    pub fn get(&self, phase: TimerPhase) -> &MessageSection {
        match phase {
            TimerPhase::Work => &self.work,
            TimerPhase::ShortBreak => &self.short_break,
            TimerPhase::LongBreak => &self.long_break,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageSection {
    pub summary: String,
    pub body: Option<String>,
}

/// Overrides of the runtime files, resolved in the XDG runtime directory
/// when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSection {
    pub socket: Option<PathBuf>,
    pub pid: Option<PathBuf>,
}
