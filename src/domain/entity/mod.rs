pub mod notification;
pub mod phase;
pub mod settings;
pub mod state;
pub mod stats;

pub use notification::NotificationMessage;
pub use phase::TimerPhase;
pub use settings::PomodoroSettings;
pub use state::{TimerState, TimerStatus};
pub use stats::{CompletedSession, DailyStats};
