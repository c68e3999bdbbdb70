use std::path::PathBuf;
use std::process::Stdio;

use sysinfo::System;
use tokio::process::Command;
use tracing::Level;

use crate::daemon::runtime::{ControlProcessError, ProcessController};
use crate::domain::client::outbound::{InitDaemonError, InitPort};

/// Launch options forwarded to the daemon executable.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub executable: Option<PathBuf>,
    pub daemon_name: String,
    pub pid_file: PathBuf,
    pub config: Option<PathBuf>,
    pub socket: Option<PathBuf>,
    pub verbosity: Level,
}

/// An [`InitPort`] implementation which spawns the daemon executable and
/// waits for it to detach.
#[derive(Debug)]
pub struct InitService {
    options: LaunchOptions,
}

impl InitService {
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }

    fn ensure_not_running(&self) -> Result<(), InitDaemonError> {
        let system = System::new_all();
        let LaunchOptions {
            pid_file,
            daemon_name,
            ..
        } = &self.options;

        match ProcessController::detect_instance(&system, pid_file, daemon_name) {
            Ok(()) => Ok(()),
            Err(ControlProcessError::MultipleProcesses) => Err(InitDaemonError::AlreadyRunning),
            Err(err) => Err(InitDaemonError::Unknown {
                message: "Could not detect daemon".to_owned(),
                source: Some(err.into()),
            }),
        }
    }

    fn command(&self) -> Command {
        let options = &self.options;
        let mut command = Command::new(
            options
                .executable
                .clone()
                .unwrap_or_else(|| PathBuf::from(&options.daemon_name)),
        );

        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .arg("--verbosity")
            .arg(options.verbosity.to_string())
            .arg("--daemonize");

        if let Some(path) = &options.config {
            command.arg("--config").arg(path);
        }
        if let Some(path) = &options.socket {
            command.arg("--socket").arg(path);
        }

        command
    }
}

#[async_trait::async_trait]
impl InitPort for InitService {
    async fn init(&self) -> Result<(), InitDaemonError> {
        self.ensure_not_running()?;

        let mut child = self
            .command()
            .spawn()
            .map_err(|err| InitDaemonError::Unknown {
                message: "Could not spawn daemon process".to_owned(),
                source: Some(err.into()),
            })?;

        // The daemonized grandchild keeps running after the parent exits.
        let status = child.wait().await.map_err(|err| InitDaemonError::Unknown {
            message: "Could not get daemon status".to_owned(),
            source: Some(err.into()),
        })?;

        if status.success() {
            tracing::info!("Daemon launched");
            Ok(())
        } else {
            Err(InitDaemonError::Unknown {
                message: format!("Daemon exited abnormally with {status}"),
                source: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn options(pid_file: PathBuf) -> LaunchOptions {
        LaunchOptions {
            executable: Some(PathBuf::from("/bin/false")),
            daemon_name: "pomowatch-daemon".to_owned(),
            pid_file,
            config: Some(PathBuf::from("/tmp/config.toml")),
            socket: None,
            verbosity: Level::DEBUG,
        }
    }

    #[test]
    fn init_service_command() {
        let service = InitService::new(options(PathBuf::from("pomowatch.pid")));
        let command = service.command();
        let command = command.as_std();
        let args: Vec<_> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        assert_eq!(command.get_program(), "/bin/false");
        assert_eq!(
            args,
            ["--verbosity", "DEBUG", "--daemonize", "--config", "/tmp/config.toml"]
        );
    }

    #[tokio::test]
    async fn init_service_error_abnormal_exit() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let service = InitService::new(options(tmp.child("pomowatch.pid").to_path_buf()));
        assert!(matches!(
            service.init().await,
            Err(InitDaemonError::Unknown { .. })
        ));
    }
}
