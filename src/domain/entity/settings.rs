use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::domain::entity::TimerPhase;

/// Duration every phase collapses to in test mode.
pub const TEST_MODE_DURATION: Duration = Duration::from_secs(10);

const WORK_RANGE: RangeInclusive<u32> = 1..=60;
const SHORT_BREAK_RANGE: RangeInclusive<u32> = 1..=30;
const LONG_BREAK_RANGE: RangeInclusive<u32> = 1..=60;
const DEFAULT_WORK_MINUTES: u32 = 25;

/// User preferences that drive the duration of each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SettingsContent", into = "SettingsContent")]
pub struct PomodoroSettings {
    work_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
    test_mode: bool,
    ask_before_work: bool,
    last_work_minutes: u32,
}

impl PomodoroSettings {
    /// Try to create a [`PomodoroSettings`].
    ///
    /// # Errors
    ///
    /// This function will return an error if any duration is outside of its
    /// accepted range.
    pub fn try_new(
        work_minutes: u32,
        short_break_minutes: u32,
        long_break_minutes: u32,
        test_mode: bool,
        ask_before_work: bool,
    ) -> Result<Self, InvalidSettingsError> {
        ensure_range(TimerPhase::Work, work_minutes, WORK_RANGE)?;
        ensure_range(TimerPhase::ShortBreak, short_break_minutes, SHORT_BREAK_RANGE)?;
        ensure_range(TimerPhase::LongBreak, long_break_minutes, LONG_BREAK_RANGE)?;

        Ok(Self {
            work_minutes,
            short_break_minutes,
            long_break_minutes,
            test_mode,
            ask_before_work,
            last_work_minutes: DEFAULT_WORK_MINUTES,
        })
    }

    /// Returns a copy remembering `minutes` as the last confirmed work
    /// duration.
    ///
    /// # Errors
    ///
    /// This function will return an error if `minutes` is not a valid work
    /// duration.
    pub fn with_last_work_minutes(self, minutes: u32) -> Result<Self, InvalidSettingsError> {
        ensure_range(TimerPhase::Work, minutes, WORK_RANGE)?;
        Ok(Self {
            last_work_minutes: minutes,
            ..self
        })
    }

    /// Get the configured minutes of a phase, ignoring test mode.
    pub fn minutes(&self, phase: TimerPhase) -> u32 {
        match phase {
            TimerPhase::Work => self.work_minutes,
            TimerPhase::ShortBreak => self.short_break_minutes,
            TimerPhase::LongBreak => self.long_break_minutes,
        }
    }

    /// Get the countdown duration of a phase.
    pub fn duration(&self, phase: TimerPhase) -> Duration {
        if self.test_mode {
            return TEST_MODE_DURATION;
        }
        Duration::from_secs(u64::from(self.minutes(phase)) * 60)
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn ask_before_work(&self) -> bool {
        self.ask_before_work
    }

    /// The work duration confirmed most recently, suggested when starting
    /// work asks for one.
    pub fn last_work_minutes(&self) -> u32 {
        self.last_work_minutes
    }

    /// Returns a copy with some fields replaced, validated again.
    ///
    /// # Errors
    ///
    /// This function will return an error if the patched settings are invalid.
    pub fn patch(&self, patch: SettingsPatch) -> Result<Self, InvalidSettingsError> {
        Self::try_new(
            patch.work_minutes.unwrap_or(self.work_minutes),
            patch.short_break_minutes.unwrap_or(self.short_break_minutes),
            patch.long_break_minutes.unwrap_or(self.long_break_minutes),
            patch.test_mode.unwrap_or(self.test_mode),
            patch.ask_before_work.unwrap_or(self.ask_before_work),
        )?
        .with_last_work_minutes(patch.last_work_minutes.unwrap_or(self.last_work_minutes))
    }
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            short_break_minutes: 5,
            long_break_minutes: 15,
            test_mode: false,
            ask_before_work: true,
            last_work_minutes: DEFAULT_WORK_MINUTES,
        }
    }
}

/// Optional replacements applied by [`PomodoroSettings::patch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub work_minutes: Option<u32>,
    pub short_break_minutes: Option<u32>,
    pub long_break_minutes: Option<u32>,
    pub test_mode: Option<bool>,
    pub ask_before_work: Option<bool>,
    pub last_work_minutes: Option<u32>,
}

impl SettingsPatch {
    /// Returns `true` if nothing would be replaced.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Serialized form of [`PomodoroSettings`], validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsContent {
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_ask_before_work")]
    pub ask_before_work: bool,
    #[serde(default = "default_last_work_minutes")]
    pub last_work_minutes: u32,
}

fn default_ask_before_work() -> bool {
    true
}

fn default_last_work_minutes() -> u32 {
    DEFAULT_WORK_MINUTES
}

impl TryFrom<SettingsContent> for PomodoroSettings {
    type Error = InvalidSettingsError;

    fn try_from(value: SettingsContent) -> Result<Self, Self::Error> {
        Self::try_new(
            value.work_minutes,
            value.short_break_minutes,
            value.long_break_minutes,
            value.test_mode,
            value.ask_before_work,
        )?
        .with_last_work_minutes(value.last_work_minutes)
    }
}

impl From<PomodoroSettings> for SettingsContent {
    fn from(value: PomodoroSettings) -> Self {
        Self {
            work_minutes: value.work_minutes,
            short_break_minutes: value.short_break_minutes,
            long_break_minutes: value.long_break_minutes,
            test_mode: value.test_mode,
            ask_before_work: value.ask_before_work,
            last_work_minutes: value.last_work_minutes,
        }
    }
}

fn ensure_range(
    phase: TimerPhase,
    minutes: u32,
    range: RangeInclusive<u32>,
) -> Result<(), InvalidSettingsError> {
    ensure!(
        range.contains(&minutes),
        OutOfRangeSnafu {
            phase,
            minutes,
            min: *range.start(),
            max: *range.end(),
        }
    );
    Ok(())
}

/// An error type of creating [`PomodoroSettings`].
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidSettingsError {
    #[snafu(display("{phase} duration must be within {min}..={max} minutes, got {minutes}"))]
    #[non_exhaustive]
    OutOfRange {
        phase: TimerPhase,
        minutes: u32,
        min: u32,
        max: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_try_new() {
        let settings = PomodoroSettings::try_new(50, 10, 30, false, false).unwrap();
        assert_eq!(settings.minutes(TimerPhase::Work), 50);
        assert_eq!(settings.duration(TimerPhase::ShortBreak), Duration::from_secs(600));
        assert_eq!(settings.duration(TimerPhase::LongBreak), Duration::from_secs(1800));
        assert!(!settings.ask_before_work());

        assert!(matches!(
            PomodoroSettings::try_new(0, 5, 15, false, true),
            Err(InvalidSettingsError::OutOfRange {
                phase: TimerPhase::Work,
                ..
            })
        ));
        assert!(matches!(
            PomodoroSettings::try_new(25, 31, 15, false, true),
            Err(InvalidSettingsError::OutOfRange {
                phase: TimerPhase::ShortBreak,
                ..
            })
        ));
        assert!(matches!(
            PomodoroSettings::try_new(25, 5, 61, false, true),
            Err(InvalidSettingsError::OutOfRange {
                phase: TimerPhase::LongBreak,
                ..
            })
        ));
    }

    #[test]
    fn settings_default() {
        let settings = PomodoroSettings::default();
        assert_eq!(settings.duration(TimerPhase::Work), Duration::from_secs(25 * 60));
        assert_eq!(settings.duration(TimerPhase::ShortBreak), Duration::from_secs(5 * 60));
        assert_eq!(settings.duration(TimerPhase::LongBreak), Duration::from_secs(15 * 60));
        assert!(!settings.test_mode());
        assert!(settings.ask_before_work());
    }

    #[test]
    fn settings_test_mode_collapses_durations() {
        let settings = PomodoroSettings::try_new(45, 10, 20, true, true).unwrap();
        for phase in TimerPhase::ALL {
            assert_eq!(settings.duration(phase), TEST_MODE_DURATION);
        }
        assert_eq!(settings.minutes(TimerPhase::Work), 45);
    }

    #[test]
    fn settings_patch() {
        let settings = PomodoroSettings::default();
        let patched = settings
            .patch(SettingsPatch {
                work_minutes: Some(40),
                test_mode: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(patched.minutes(TimerPhase::Work), 40);
        assert_eq!(patched.minutes(TimerPhase::ShortBreak), 5);
        assert!(patched.test_mode());

        assert!(settings
            .patch(SettingsPatch {
                short_break_minutes: Some(45),
                ..Default::default()
            })
            .is_err());
        assert!(SettingsPatch::default().is_empty());
    }

    #[test]
    fn settings_remember_last_work_minutes() {
        let settings = PomodoroSettings::default();
        assert_eq!(settings.last_work_minutes(), 25);

        let patched = settings
            .patch(SettingsPatch {
                last_work_minutes: Some(40),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(patched.last_work_minutes(), 40);
        assert_eq!(patched.minutes(TimerPhase::Work), 25);

        let kept = patched
            .patch(SettingsPatch {
                work_minutes: Some(30),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(kept.last_work_minutes(), 40);

        assert!(settings.with_last_work_minutes(61).is_err());
    }

    #[test]
    fn settings_deserialize_validates() {
        let settings: PomodoroSettings = serde_json::from_value(serde_json::json!({
            "work_minutes": 30,
            "short_break_minutes": 5,
            "long_break_minutes": 20,
        }))
        .unwrap();
        assert_eq!(settings.minutes(TimerPhase::Work), 30);
        assert!(settings.ask_before_work());
        assert_eq!(settings.last_work_minutes(), 25);

        let invalid = serde_json::from_value::<PomodoroSettings>(serde_json::json!({
            "work_minutes": 90,
            "short_break_minutes": 5,
            "long_break_minutes": 20,
        }));
        assert!(invalid.is_err());
    }
}
