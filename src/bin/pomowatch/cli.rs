use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pomowatch::client::app::{
    Command as ClientCommand, PhaseArguments, StartArguments, StatusArguments,
};
use pomowatch::domain::entity::settings::SettingsPatch;
use pomowatch::domain::entity::TimerPhase;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(version, about = "Pomodoro timer client", long_about = None)]
pub struct Arguments {
    /// Path to a custom configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Path to the daemon's UNIX socket
    #[arg(long, global = true)]
    pub socket: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch and initialize a daemon process
    Init {
        /// Path to the daemon executable
        #[arg(short, long)]
        executable: Option<PathBuf>,
        /// Maximum logging level the subscriber should use
        #[arg(short, long, default_value_t = Level::INFO)]
        verbosity: Level,
    },
    /// Start or resume the timer
    Start {
        /// Work for a custom number of minutes
        #[arg(short, long, conflicts_with = "last")]
        minutes: Option<u32>,
        /// Work for the duration confirmed last time
        #[arg(short, long)]
        last: bool,
    },
    /// Pause the timer
    Pause,
    /// Discard progress of the current phase
    Reset,
    /// Switch to another phase: work, short-break or long-break
    Phase {
        phase: TimerPhase,
        /// Custom number of minutes instead of the configured duration
        #[arg(short, long)]
        minutes: Option<u32>,
    },
    /// Show the timer's state. Show all information if no flag is specified.
    Status {
        /// Show the timer's status
        #[arg(short, long)]
        status: bool,
        /// Show the current phase's name
        #[arg(short, long)]
        phase: bool,
        /// Show the remaining duration
        #[arg(short, long)]
        remaining: bool,
        /// Show the total duration
        #[arg(short, long)]
        total: bool,
    },
    /// Follow the timer until interrupted
    Watch,
    /// Show settings, or change the given ones
    Settings {
        /// Work duration in minutes
        #[arg(long)]
        work: Option<u32>,
        /// Short break duration in minutes
        #[arg(long)]
        short_break: Option<u32>,
        /// Long break duration in minutes
        #[arg(long)]
        long_break: Option<u32>,
        /// Replace every duration with ten seconds
        #[arg(long)]
        test_mode: Option<bool>,
        /// Require a custom duration before each work phase
        #[arg(long)]
        ask_before_work: Option<bool>,
    },
    /// Show today's statistics
    Stats,
}

impl From<Command> for ClientCommand {
    fn from(value: Command) -> Self {
        match value {
            Command::Init { .. } => Self::Init,
            Command::Start { minutes, last } => Self::Start(StartArguments { minutes, last }),
            Command::Pause => Self::Pause,
            Command::Reset => Self::Reset,
            Command::Phase { phase, minutes } => Self::Phase(PhaseArguments { phase, minutes }),
            Command::Status {
                status,
                phase,
                remaining,
                total,
            } => Self::Status(StatusArguments {
                status,
                phase,
                remaining,
                total,
            }),
            Command::Watch => Self::Watch,
            Command::Settings {
                work,
                short_break,
                long_break,
                test_mode,
                ask_before_work,
            } => Self::Settings(SettingsPatch {
                work_minutes: work,
                short_break_minutes: short_break,
                long_break_minutes: long_break,
                test_mode,
                ask_before_work,
                ..Default::default()
            }),
            Command::Stats => Self::Stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn arguments_parse() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn arguments_into_client_command() {
        let args = Arguments::parse_from(["pomowatch", "phase", "short-break", "-m", "7"]);
        assert_eq!(
            ClientCommand::from(args.command),
            ClientCommand::Phase(PhaseArguments {
                phase: TimerPhase::ShortBreak,
                minutes: Some(7),
            })
        );

        let args = Arguments::parse_from([
            "pomowatch",
            "settings",
            "--work",
            "50",
            "--test-mode",
            "true",
        ]);
        assert_eq!(
            ClientCommand::from(args.command),
            ClientCommand::Settings(SettingsPatch {
                work_minutes: Some(50),
                test_mode: Some(true),
                ..Default::default()
            })
        );

        let args = Arguments::parse_from(["pomowatch", "start", "--last"]);
        assert_eq!(
            ClientCommand::from(args.command),
            ClientCommand::Start(StartArguments {
                minutes: None,
                last: true,
            })
        );
        assert!(Arguments::try_parse_from(["pomowatch", "start", "-m", "5", "-l"]).is_err());

        let args = Arguments::parse_from(["pomowatch", "status", "-r", "-s"]);
        assert_eq!(
            ClientCommand::from(args.command),
            ClientCommand::Status(StatusArguments {
                status: true,
                remaining: true,
                ..Default::default()
            })
        );
    }
}
