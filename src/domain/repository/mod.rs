pub mod notification;
pub mod settings;
pub mod stats;

pub use notification::NotificationRepository;
pub use settings::SettingsRepository;
pub use stats::StatsRepository;
