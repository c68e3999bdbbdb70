use std::ops::RangeInclusive;
use std::sync::Arc;

use snafu::prelude::*;
use tokio::time::Duration;

use crate::client::app::command::{Command, PhaseArguments, StartArguments, StatusArguments};
use crate::domain::client::outbound::{InitDaemonError, RequestDaemonError};
use crate::domain::client::ApplicationCore;
use crate::domain::entity::settings::SettingsPatch;
use crate::domain::entity::{DailyStats, PomodoroSettings, TimerPhase, TimerState, TimerStatus};
use crate::tracing_report;
use crate::utils::time::format_clock;

const CUSTOM_MINUTES: RangeInclusive<u32> = 1..=60;

/// Main business logic implementation in client side.
pub struct Client {
    core: Arc<ApplicationCore>,
}

impl Client {
    /// Creates a new [`Client`].
    pub fn new(core: Arc<ApplicationCore>) -> Self {
        Self { core }
    }

    /// Run specific function according to `command`.
    ///
    /// # Errors
    ///
    /// This function will return an error if any error occurs.
    pub async fn run(&self, command: Command) -> Result<(), ClientError> {
        match command {
            Command::Init => self.init().await,
            Command::Start(args) => self.start(args).await.map(print_state),
            Command::Pause => self.pause().await.map(print_state),
            Command::Reset => self.reset().await.map(print_state),
            Command::Phase(args) => self.phase(args).await.map(print_state),
            Command::Status(args) => {
                let state = self.core.snapshot().await;
                println!("{}", render_status(&state, args));
                Ok(())
            }
            Command::Watch => self.watch().await,
            Command::Settings(patch) => self
                .settings(patch)
                .await
                .map(|settings| println!("{}", render_settings(&settings))),
            Command::Stats => self
                .stats()
                .await
                .map(|stats| println!("{}", render_stats(&stats))),
        }
    }

    async fn init(&self) -> Result<(), ClientError> {
        self.core.init.init().await.context(InitDaemonSnafu)
    }

    /// Start the timer. Starting a fresh work phase asks for its duration
    /// first when `ask_before_work` is set, so `minutes` or `last` must be
    /// given then. A confirmed duration always starts a work phase and is
    /// remembered for `last`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the confirmation is missing, the
    /// minutes are out of range or the daemon could not be reached.
    async fn start(&self, args: StartArguments) -> Result<TimerState, ClientError> {
        let state = self.core.query.query().await.context(RequestSnafu)?;

        let minutes = match args.minutes {
            Some(minutes) => Some(minutes),
            None if args.last => {
                let settings = self.core.settings.settings().await.context(RequestSnafu)?;
                Some(settings.last_work_minutes())
            }
            None => None,
        };
        let Some(minutes) = minutes else {
            if state.status() == TimerStatus::Idle && state.phase() == TimerPhase::Work {
                let settings = self.core.settings.settings().await.context(RequestSnafu)?;
                ensure!(
                    !settings.ask_before_work(),
                    ConfirmationRequiredSnafu {
                        last: settings.last_work_minutes()
                    }
                );
            }
            return self.core.start.start().await.context(RequestSnafu);
        };

        ensure!(
            matches!(state.status(), TimerStatus::Idle | TimerStatus::Completed),
            BusySnafu {
                status: state.status()
            }
        );
        let duration = custom_duration(minutes)?;
        self.core
            .set_phase
            .set_phase(TimerPhase::Work, Some(duration))
            .await
            .context(RequestSnafu)?;
        let state = self.core.start.start().await.context(RequestSnafu)?;
        self.remember_work_minutes(minutes).await;
        Ok(state)
    }

    /// The timer already runs, so failing to remember is only logged.
    async fn remember_work_minutes(&self, minutes: u32) {
        let patch = SettingsPatch {
            last_work_minutes: Some(minutes),
            ..Default::default()
        };
        if let Err(err) = self.core.settings.update_settings(patch).await {
            tracing_report!(err, "Could not remember work duration");
        }
    }

    async fn pause(&self) -> Result<TimerState, ClientError> {
        self.core.pause.pause().await.context(RequestSnafu)
    }

    async fn reset(&self) -> Result<TimerState, ClientError> {
        self.core.reset.reset().await.context(RequestSnafu)
    }

    async fn phase(&self, args: PhaseArguments) -> Result<TimerState, ClientError> {
        let duration = args.minutes.map(custom_duration).transpose()?;
        self.core
            .set_phase
            .set_phase(args.phase, duration)
            .await
            .context(RequestSnafu)
    }

    /// Print every state the daemon publishes until the stream ends.
    async fn watch(&self) -> Result<(), ClientError> {
        let mut states = self.core.watch.watch().await.context(RequestSnafu)?;
        let mut last = None;
        while let Some(state) = states.recv().await {
            let line = render_line(&state);
            if last.as_ref() != Some(&line) {
                println!("{line}");
                last = Some(line);
            }
        }
        Ok(())
    }

    async fn settings(&self, patch: SettingsPatch) -> Result<PomodoroSettings, ClientError> {
        if patch.is_empty() {
            self.core.settings.settings().await.context(RequestSnafu)
        } else {
            self.core
                .settings
                .update_settings(patch)
                .await
                .context(RequestSnafu)
        }
    }

    async fn stats(&self) -> Result<DailyStats, ClientError> {
        self.core.stats.stats().await.context(RequestSnafu)
    }
}

fn custom_duration(minutes: u32) -> Result<Duration, ClientError> {
    ensure!(
        CUSTOM_MINUTES.contains(&minutes),
        MinutesOutOfRangeSnafu { minutes }
    );
    Ok(Duration::from_secs(u64::from(minutes) * 60))
}

fn print_state(state: TimerState) {
    println!("{}", render_line(&state));
}

/// One line summary such as `Running  Work  12:34 / 25:00`.
fn render_line(state: &TimerState) -> String {
    format!(
        "{}  {}  {} / {}",
        state.status(),
        state.phase(),
        format_clock(state.remaining()),
        format_clock(state.total())
    )
}

fn render_status(state: &TimerState, args: StatusArguments) -> String {
    let mut rows = Vec::new();
    if args.show_status() {
        rows.push(("Status", state.status().to_string()));
    }
    if args.show_phase() {
        rows.push(("Phase", state.phase().to_string()));
    }
    if args.show_remaining() {
        rows.push(("Remaining", format_clock(state.remaining())));
    }
    if args.show_total() {
        rows.push(("Total", format_clock(state.total())));
    }
    render_table(rows)
}

fn render_settings(settings: &PomodoroSettings) -> String {
    render_table(vec![
        ("Work", format!("{} min", settings.minutes(TimerPhase::Work))),
        (
            "Short Break",
            format!("{} min", settings.minutes(TimerPhase::ShortBreak)),
        ),
        (
            "Long Break",
            format!("{} min", settings.minutes(TimerPhase::LongBreak)),
        ),
        ("Test Mode", settings.test_mode().to_string()),
        ("Ask Before Work", settings.ask_before_work().to_string()),
        ("Last Work", format!("{} min", settings.last_work_minutes())),
    ])
}

fn render_stats(stats: &DailyStats) -> String {
    render_table(vec![
        ("Date", stats.date().to_string()),
        ("Sessions", stats.completed_sessions().to_string()),
        ("Work", format!("{} min", stats.total_work_minutes())),
        ("Break", format!("{} min", stats.total_break_minutes())),
        ("Total", format!("{} min", stats.total_minutes())),
    ])
}

/// Align `key = value` rows on the widest key.
fn render_table(rows: Vec<(&str, String)>) -> String {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or_default();
    rows.iter()
        .map(|(key, value)| format!("{key:<width$} = {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// An error for client's operations.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ClientError {
    #[snafu(display("Could not initialize daemon"))]
    InitDaemon { source: InitDaemonError },
    #[snafu(display("Could not request daemon"))]
    Request { source: RequestDaemonError },
    #[snafu(display(
        "Work duration must be confirmed, rerun with `--minutes <N>` or `--last` for {last} minutes"
    ))]
    ConfirmationRequired { last: u32 },
    #[snafu(display("Custom duration must be within 1..=60 minutes, got {minutes}"))]
    MinutesOutOfRange { minutes: u32 },
    #[snafu(display("Could not change the duration of a {status} timer"))]
    Busy { status: TimerStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use tokio::sync::mpsc::Receiver;

    use crate::domain::client::outbound::{
        InitPort, MockSetPhasePort, MockSettingsPort, MockStartPort, PausePort, QueryPort,
        ResetPort, StatsPort, WatchPort,
    };

    /// Stands in for every port a test does not care about.
    struct Unused;

    #[async_trait::async_trait]
    impl InitPort for Unused {
        async fn init(&self) -> Result<(), InitDaemonError> {
            unimplemented!()
        }
    }

    #[async_trait::async_trait]
    impl PausePort for Unused {
        async fn pause(&self) -> Result<TimerState, RequestDaemonError> {
            unimplemented!()
        }
    }

    #[async_trait::async_trait]
    impl ResetPort for Unused {
        async fn reset(&self) -> Result<TimerState, RequestDaemonError> {
            unimplemented!()
        }
    }

    #[async_trait::async_trait]
    impl WatchPort for Unused {
        async fn watch(&self) -> Result<Receiver<TimerState>, RequestDaemonError> {
            unimplemented!()
        }
    }

    #[async_trait::async_trait]
    impl StatsPort for Unused {
        async fn stats(&self) -> Result<DailyStats, RequestDaemonError> {
            unimplemented!()
        }
    }

    struct FixedQuery(TimerState);

    #[async_trait::async_trait]
    impl QueryPort for FixedQuery {
        async fn query(&self) -> Result<TimerState, RequestDaemonError> {
            Ok(self.0)
        }
    }

    fn new_client(
        state: TimerState,
        start: MockStartPort,
        set_phase: MockSetPhasePort,
        settings: MockSettingsPort,
    ) -> Client {
        let unused = Arc::new(Unused);
        Client::new(Arc::new(ApplicationCore {
            init: unused.clone(),
            start: Arc::new(start),
            pause: unused.clone(),
            reset: unused.clone(),
            set_phase: Arc::new(set_phase),
            query: Arc::new(FixedQuery(state)),
            watch: unused.clone(),
            settings: Arc::new(settings),
            stats: unused,
        }))
    }

    fn settings_port(ask_before_work: bool) -> MockSettingsPort {
        let settings = PomodoroSettings::try_new(25, 5, 15, false, ask_before_work)
            .unwrap()
            .with_last_work_minutes(35)
            .unwrap();
        let mut port = MockSettingsPort::new();
        port.expect_settings().returning(move || Ok(settings));
        port
    }

    /// Expects the confirmed `minutes` to be remembered exactly once.
    fn remembering_port(minutes: u32, calls: Arc<Mutex<Vec<&'static str>>>) -> MockSettingsPort {
        let mut port = settings_port(true);
        port.expect_update_settings()
            .withf(move |patch| {
                *patch
                    == SettingsPatch {
                        last_work_minutes: Some(minutes),
                        ..Default::default()
                    }
            })
            .times(1)
            .returning(move |_| {
                calls.lock().unwrap().push("remember");
                Ok(PomodoroSettings::default().with_last_work_minutes(minutes).unwrap())
            });
        port
    }

    #[tokio::test]
    async fn client_start_requires_confirmation() {
        let mut start = MockStartPort::new();
        start.expect_start().never();
        let client = new_client(
            TimerState::default(),
            start,
            MockSetPhasePort::new(),
            settings_port(true),
        );

        let err = client.start(StartArguments::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::ConfirmationRequired { last: 35 }));
        assert!(err.to_string().ends_with("`--last` for 35 minutes"));
    }

    #[tokio::test]
    async fn client_start_with_minutes() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let running = TimerState::running(TimerPhase::Work, 2_400_000, 2_400_000);

        let mut set_phase = MockSetPhasePort::new();
        let sink = Arc::clone(&calls);
        set_phase
            .expect_set_phase()
            .withf(|phase, duration| {
                *phase == TimerPhase::Work && *duration == Some(Duration::from_secs(2_400))
            })
            .times(1)
            .returning(move |_, _| {
                sink.lock().unwrap().push("set_phase");
                Ok(TimerState::idle(TimerPhase::Work, 2_400_000))
            });
        let mut start = MockStartPort::new();
        let sink = Arc::clone(&calls);
        start.expect_start().times(1).returning(move || {
            sink.lock().unwrap().push("start");
            Ok(running)
        });

        let settings = remembering_port(40, Arc::clone(&calls));
        // A confirmed duration always means work, whatever phase is idle.
        let idle = TimerState::idle(TimerPhase::ShortBreak, 300_000);
        let client = new_client(idle, start, set_phase, settings);
        let state = client
            .start(StartArguments {
                minutes: Some(40),
                last: false,
            })
            .await
            .unwrap();
        assert_eq!(state, running);
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &["set_phase", "start", "remember"]
        );
    }

    #[tokio::test]
    async fn client_start_with_last_minutes() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let running = TimerState::running(TimerPhase::Work, 2_100_000, 2_100_000);

        let mut set_phase = MockSetPhasePort::new();
        set_phase
            .expect_set_phase()
            .withf(|phase, duration| {
                *phase == TimerPhase::Work && *duration == Some(Duration::from_secs(2_100))
            })
            .times(1)
            .returning(|_, _| Ok(TimerState::idle(TimerPhase::Work, 2_100_000)));
        let mut start = MockStartPort::new();
        start.expect_start().times(1).returning(move || Ok(running));
        let settings = remembering_port(35, Arc::clone(&calls));

        let client = new_client(TimerState::default(), start, set_phase, settings);
        let state = client
            .start(StartArguments {
                minutes: None,
                last: true,
            })
            .await
            .unwrap();
        assert_eq!(state, running);
        assert_eq!(calls.lock().unwrap().as_slice(), &["remember"]);
    }

    #[tokio::test]
    async fn client_start_survives_forgetting_minutes() {
        let running = TimerState::running(TimerPhase::Work, 600_000, 600_000);
        let mut set_phase = MockSetPhasePort::new();
        set_phase
            .expect_set_phase()
            .times(1)
            .returning(|_, _| Ok(TimerState::idle(TimerPhase::Work, 600_000)));
        let mut start = MockStartPort::new();
        start.expect_start().times(1).returning(move || Ok(running));
        let mut settings = settings_port(true);
        settings.expect_update_settings().times(1).returning(|_| {
            Err(RequestDaemonError::Rejected {
                message: "disk full".to_owned(),
            })
        });

        let client = new_client(TimerState::default(), start, set_phase, settings);
        let state = client
            .start(StartArguments {
                minutes: Some(10),
                last: false,
            })
            .await
            .unwrap();
        assert_eq!(state, running);
    }

    #[tokio::test]
    async fn client_start_without_confirmation() {
        let running = TimerState::running(TimerPhase::Work, 1_500_000, 1_500_000);
        let mut start = MockStartPort::new();
        start.expect_start().times(1).returning(move || Ok(running));
        let client = new_client(
            TimerState::default(),
            start,
            MockSetPhasePort::new(),
            settings_port(false),
        );

        assert_eq!(
            client.start(StartArguments::default()).await.unwrap(),
            running
        );
    }

    #[tokio::test]
    async fn client_resume_skips_confirmation() {
        let paused = TimerState::paused(TimerPhase::Work, 600_000, 1_500_000);
        let resumed = TimerState::running(TimerPhase::Work, 600_000, 1_500_000);
        let mut start = MockStartPort::new();
        start.expect_start().times(1).returning(move || Ok(resumed));
        let mut settings = MockSettingsPort::new();
        settings.expect_settings().never();
        let client = new_client(paused, start, MockSetPhasePort::new(), settings);

        assert_eq!(
            client.start(StartArguments::default()).await.unwrap(),
            resumed
        );
    }

    #[tokio::test]
    async fn client_start_error_busy() {
        let running = TimerState::running(TimerPhase::Work, 600_000, 1_500_000);
        let mut start = MockStartPort::new();
        start.expect_start().never();
        let client = new_client(
            running,
            start,
            MockSetPhasePort::new(),
            settings_port(true),
        );

        assert!(matches!(
            client
                .start(StartArguments {
                    minutes: Some(30),
                    last: false,
                })
                .await,
            Err(ClientError::Busy {
                status: TimerStatus::Running
            })
        ));
    }

    #[tokio::test]
    async fn client_phase_error_minutes_out_of_range() {
        let mut set_phase = MockSetPhasePort::new();
        set_phase.expect_set_phase().never();
        let client = new_client(
            TimerState::default(),
            MockStartPort::new(),
            set_phase,
            settings_port(true),
        );

        let res = client
            .phase(PhaseArguments {
                phase: TimerPhase::Work,
                minutes: Some(61),
            })
            .await;
        assert!(matches!(
            res,
            Err(ClientError::MinutesOutOfRange { minutes: 61 })
        ));
    }

    #[test]
    fn render_status_all() {
        let state = TimerState::paused(TimerPhase::ShortBreak, 61_000, 300_000);
        assert_eq!(
            render_status(&state, StatusArguments::default()),
            "Status    = Paused\nPhase     = Short Break\nRemaining = 01:01\nTotal     = 05:00"
        );
    }

    #[test]
    fn render_status_selected() {
        let state = TimerState::running(TimerPhase::Work, 61_000, 1_500_000);
        let args = StatusArguments {
            remaining: true,
            ..Default::default()
        };
        assert_eq!(render_status(&state, args), "Remaining = 01:01");
    }

    #[test]
    fn render_line_running() {
        let state = TimerState::running(TimerPhase::LongBreak, 754_000, 900_000);
        assert_eq!(render_line(&state), "Running  Long Break  12:34 / 15:00");
    }
}
