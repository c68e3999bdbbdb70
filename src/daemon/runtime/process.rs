use std::fs;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use daemonize::{Daemonize, Error as DaemonizeError};
use snafu::prelude::*;
use sysinfo::{Pid, Process, System};

/// A process manager responsible for daemonization and keeping a single
/// running instance, recorded in a PID file.
#[derive(Debug)]
pub struct ProcessController {
    app_name: String,
    pid_file: PathBuf,
    daemonize: bool,
}

impl ProcessController {
    /// Creates a new [`ProcessController`].
    pub fn new(app_name: String, pid_file: PathBuf, daemonize: bool) -> Self {
        Self {
            app_name,
            pid_file,
            daemonize,
        }
    }

    /// Refuse to run next to a live instance, then detach from the terminal
    /// if requested and record the PID.
    ///
    /// # Errors
    ///
    /// This function will return an error if another instance is running or
    /// the preparation fails.
    pub fn start(&self) -> Result<(), ControlProcessError> {
        let system = System::new_all();
        Self::detect_instance(&system, &self.pid_file, &self.app_name)?;

        if self.daemonize {
            Daemonize::new()
                .pid_file(&self.pid_file)
                .start()
                .context(DaemonizeSnafu)?;
        } else {
            let pid =
                sysinfo::get_current_pid().map_err(|err| GetPidSnafu { message: err }.build())?;
            fs::write(&self.pid_file, pid.to_string()).context(FileSystemSnafu {
                message: "Could not write PID",
            })?;
        }

        tracing::debug!(pid_file = %self.pid_file.display(), "Recorded PID");
        Ok(())
    }

    /// Remove the PID file on shutdown.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file exists but could not
    /// be removed.
    pub fn stop(&self) -> Result<(), ControlProcessError> {
        match fs::remove_file(&self.pid_file) {
            Err(err) if err.kind() != IoErrorKind::NotFound => Err(err).context(FileSystemSnafu {
                message: "Could not remove PID file",
            }),
            _ => Ok(()),
        }
    }

    /// Fail with [`ControlProcessError::MultipleProcesses`] if the PID file
    /// names a live process called like `app_name`. A missing PID file or a
    /// dead process means no instance is running.
    ///
    /// # Errors
    ///
    /// This function will return an error if an instance is running or the
    /// PID file is unreadable.
    pub fn detect_instance<P: AsRef<Path>>(
        system: &System,
        pid_file: P,
        app_name: &str,
    ) -> Result<(), ControlProcessError> {
        let Some(pid) = Self::read_pid(pid_file.as_ref())? else {
            return Ok(());
        };

        let alive = system
            .process(pid)
            .is_some_and(|process| is_named(process, app_name));
        ensure!(!alive, MultipleProcessesSnafu);
        Ok(())
    }

    fn read_pid(pid_file: &Path) -> Result<Option<Pid>, ControlProcessError> {
        let content = match fs::read_to_string(pid_file) {
            Ok(content) => content,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).context(FileSystemSnafu {
                    message: "Could not read PID file",
                })
            }
        };

        content
            .trim()
            .parse::<Pid>()
            .map(Some)
            .map_err(|_| InvalidPidFileSnafu.build())
    }
}

/// The kernel truncates process names, so the executable's file name is
/// checked too.
fn is_named(process: &Process, app_name: &str) -> bool {
    let exe_matches = process
        .exe()
        .and_then(Path::file_name)
        .is_some_and(|name| name.to_string_lossy().contains(app_name));
    exe_matches || process.name().to_string_lossy().contains(app_name)
}

#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum ControlProcessError {
    #[snafu(display("File system error: {message}"))]
    FileSystem {
        message: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not start multiple daemon processes"))]
    MultipleProcesses,
    #[snafu(display("Could not ensure process uniqueness with invalid PID file"))]
    InvalidPidFile,
    #[snafu(display("Failed to get PID: {message}"))]
    GetPid { message: String },
    #[snafu(display("Could not daemonize the process"))]
    Daemonize {
        #[snafu(source(from(DaemonizeError, Arc::new)))]
        source: Arc<DaemonizeError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use predicates::path as path_pred;

    fn current() -> (System, Pid, String) {
        let system = System::new_all();
        let pid = sysinfo::get_current_pid().unwrap();
        let name = system
            .process(pid)
            .unwrap()
            .name()
            .to_string_lossy()
            .into_owned();
        (system, pid, name)
    }

    #[test]
    fn detect_instance_without_pid_file() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let system = System::new();
        let res = ProcessController::detect_instance(&system, tmp.child("none.pid"), "pomowatch");
        assert!(res.is_ok());
    }

    #[test]
    fn detect_instance_running() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let (system, pid, name) = current();
        let file = tmp.child("daemon.pid");
        file.write_str(&format!("{pid}\n")).unwrap();

        assert!(matches!(
            ProcessController::detect_instance(&system, file.path(), &name),
            Err(ControlProcessError::MultipleProcesses)
        ));
        assert!(
            ProcessController::detect_instance(&system, file.path(), "another-daemon-name")
                .is_ok()
        );
    }

    #[test]
    fn detect_instance_error_invalid_pid_file() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("daemon.pid");
        file.write_str("not a pid").unwrap();

        assert!(matches!(
            ProcessController::detect_instance(&System::new(), file.path(), "pomowatch"),
            Err(ControlProcessError::InvalidPidFile)
        ));
    }

    #[test]
    fn process_controller_start_then_stop() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("daemon.pid");
        let (_, pid, _) = current();

        let controller =
            ProcessController::new("another-daemon-name".to_owned(), file.to_path_buf(), false);
        controller.start().unwrap();
        file.assert(pid.to_string());

        controller.stop().unwrap();
        file.assert(path_pred::missing());
        assert!(controller.stop().is_ok());
    }
}
