use std::path::PathBuf;
use std::sync::Arc;

use pomowatch::daemon::app::{Server, UnixListener};
use pomowatch::daemon::config::{self, Configuration};
use pomowatch::daemon::outbound::NotifyService;
use pomowatch::daemon::repository::{NotificationConfiguration, SettingsFile, StatsFile};
use pomowatch::daemon::runtime::{Environment, ProcessController, PRIVATE_MODE};
use pomowatch::domain::daemon::ApplicationCore;
use pomowatch::tracing_report;
use pomowatch::utils::xdg::{AppFile, Xdg};
use snafu::{prelude::*, Whatever};

use crate::cli::Arguments;

const APP_NAME: &str = "pomowatch";
const DAEMON_NAME: &str = "pomowatch-daemon";

/// The PID file owned by the running daemon. The socket goes away together
/// with the server's listener.
pub struct Runtime {
    process: ProcessController,
}

impl Runtime {
    /// Remove the PID file. Failures are only logged.
    pub fn cleanup(self) {
        if let Err(err) = self.process.stop() {
            tracing_report!(err, "Could not remove PID file");
        }
    }
}

struct EnvironmentPath {
    socket: PathBuf,
    pid: PathBuf,
    settings: PathBuf,
    stats: PathBuf,
}

pub async fn bootstrap(arg: Arguments) -> Result<(Server, Runtime), Whatever> {
    let configuration = configuration(&arg)?;
    let env = environment(&arg, &configuration)?;

    let process = ProcessController::new(DAEMON_NAME.to_owned(), env.pid.clone(), arg.daemonize);
    process.start().whatever_context("Could not prepare process")?;

    let listener = UnixListener::new(&env.socket)
        .with_whatever_context(|_| format!("Could not listen on {}", env.socket.display()))?;
    tracing::info!(socket = %listener.path().display(), "Listening");
    let core = core(configuration, &env).await?;

    Ok((Server::new(Box::new(listener), core), Runtime { process }))
}

fn configuration(arg: &Arguments) -> Result<Arc<Configuration>, Whatever> {
    let res = match &arg.config {
        Some(path) => config::load_with_path(path),
        None => config::load_with_xdg(APP_NAME),
    };

    let configuration = res.whatever_context("Could not load configuration")?;
    Ok(Arc::new(configuration))
}

fn environment(
    arg: &Arguments,
    configuration: &Configuration,
) -> Result<EnvironmentPath, Whatever> {
    let xdg = Xdg::new(APP_NAME).whatever_context("Could not use XDG base directories")?;
    let runtime = &configuration.runtime;

    let locate = |file: AppFile| -> Result<PathBuf, Whatever> {
        xdg.locate(file)
            .with_whatever_context(|_| format!("Could not locate {}", file.name()))
    };

    let socket = match arg.socket.as_ref().or(runtime.socket.as_ref()) {
        Some(path) => path.clone(),
        None => locate(AppFile::Socket)?,
    };
    let pid = match &runtime.pid {
        Some(path) => path.clone(),
        None => locate(AppFile::Pid)?,
    };

    // Settings live next to a custom configuration file.
    let settings = match arg.config.as_ref().and_then(|path| path.parent()) {
        Some(dir) => dir.join(AppFile::Settings.name()),
        None => locate(AppFile::Settings)?,
    };
    let stats = locate(AppFile::Stats)?;

    let mut env = Environment::new();
    for path in [&socket, &pid] {
        let parent = path
            .parent()
            .with_whatever_context(|| format!("Invalid runtime path: {}", path.display()))?;
        env.register_directory_with_mode(parent, PRIVATE_MODE);
    }
    env.setup().whatever_context("Could not setup environment")?;

    Ok(EnvironmentPath {
        socket,
        pid,
        settings,
        stats,
    })
}

async fn core(
    config: Arc<Configuration>,
    env: &EnvironmentPath,
) -> Result<ApplicationCore, Whatever> {
    let notify = Arc::new(NotifyService::new(APP_NAME.to_owned()));
    let settings_repository = Arc::new(
        SettingsFile::open(&env.settings).whatever_context("Could not open settings")?,
    );
    let stats_repository = Arc::new(StatsFile::new(&env.stats));
    let notification_repository = Arc::new(NotificationConfiguration::new(config));

    ApplicationCore::setup(
        notify.clone(),
        notify,
        settings_repository,
        stats_repository,
        notification_repository,
    )
    .await
    .whatever_context("Could not setup application core")
}
