use std::cell::LazyCell;
use std::path::PathBuf;
use std::sync::Arc;

use pomowatch::client::app::connector::{Connector, UnixConnector};
use pomowatch::client::app::Client;
use pomowatch::client::outbound::{
    InitService, LaunchOptions, PauseService, QueryService, ResetService, SetPhaseService,
    SettingsService, StartService, StatsService, WatchService,
};
use pomowatch::daemon::config;
use pomowatch::domain::client::ApplicationCore;
use pomowatch::utils::xdg::{AppFile, Xdg};
use snafu::{prelude::*, Whatever};
use tracing::Level;

use crate::cli::{Arguments, Command};

const APP_NAME: &str = "pomowatch";
const DAEMON_NAME: &str = "pomowatch-daemon";

struct EnvironmentPath {
    socket: PathBuf,
    pid: PathBuf,
}

pub fn bootstrap(args: &Arguments) -> Result<Client, Whatever> {
    let env_path = environment(args)?;
    let core = core(args, env_path);
    Ok(Client::new(core))
}

fn environment(args: &Arguments) -> Result<EnvironmentPath, Whatever> {
    let res = match &args.config {
        Some(path) => config::load_with_path(path),
        None => config::load_with_xdg(APP_NAME),
    };

    let configuration = res.whatever_context("Could not load configuration")?;
    let runtime = &configuration.runtime;

    let xdg = LazyCell::new(|| Xdg::new(APP_NAME));

    let socket = match args.socket.as_ref().or(runtime.socket.as_ref()) {
        Some(socket) => socket.clone(),
        None => xdg
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|xdg| xdg.locate(AppFile::Socket))
            .whatever_context("Could not use XDG base directories")?,
    };

    let pid = match &runtime.pid {
        Some(pid) => pid.clone(),
        None => xdg
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|xdg| xdg.locate(AppFile::Pid))
            .whatever_context("Could not use XDG base directories")?,
    };

    Ok(EnvironmentPath { socket, pid })
}

fn core(args: &Arguments, env_path: EnvironmentPath) -> Arc<ApplicationCore> {
    let (executable, verbosity) = match &args.command {
        Command::Init {
            executable,
            verbosity,
        } => (executable.clone(), *verbosity),
        _ => (None, Level::INFO),
    };

    let init_port = Arc::new(InitService::new(LaunchOptions {
        executable,
        daemon_name: DAEMON_NAME.to_owned(),
        pid_file: env_path.pid,
        config: args.config.clone(),
        socket: args.socket.clone(),
        verbosity,
    }));

    let connector: Arc<dyn Connector> = Arc::new(UnixConnector::new(env_path.socket));

    Arc::new(ApplicationCore {
        init: init_port,
        start: Arc::new(StartService::new(Arc::clone(&connector))),
        pause: Arc::new(PauseService::new(Arc::clone(&connector))),
        reset: Arc::new(ResetService::new(Arc::clone(&connector))),
        set_phase: Arc::new(SetPhaseService::new(Arc::clone(&connector))),
        query: Arc::new(QueryService::new(Arc::clone(&connector))),
        watch: Arc::new(WatchService::new(Arc::clone(&connector))),
        settings: Arc::new(SettingsService::new(Arc::clone(&connector))),
        stats: Arc::new(StatsService::new(connector)),
    })
}
