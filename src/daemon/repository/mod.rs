mod notification;
mod settings;
mod stats;

pub use notification::NotificationConfiguration;
pub use settings::{OpenSettingsError, SettingsFile};
pub use stats::StatsFile;
