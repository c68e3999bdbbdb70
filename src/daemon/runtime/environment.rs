use std::fs::{self, Permissions};
use std::io::Error as IoError;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;

/// Mode of directories only the owner may enter.
pub const PRIVATE_MODE: u32 = 0o700;

/// Helper for setting up the daemon's running environment.
#[derive(Debug, Default)]
pub struct Environment {
    directories: Vec<(PathBuf, Option<u32>)>,
}

impl Environment {
    /// Creates a new [`Environment`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory that needs to be created if it doesn't exist.
    pub fn register_directory<P: AsRef<Path>>(&mut self, directory: P) {
        self.directories
            .push((directory.as_ref().to_path_buf(), None));
    }

    /// Register a directory that needs to exist with exactly `mode`.
    pub fn register_directory_with_mode<P: AsRef<Path>>(&mut self, directory: P, mode: u32) {
        self.directories
            .push((directory.as_ref().to_path_buf(), Some(mode)));
    }

    /// Setup the environment.
    ///
    /// # Errors
    ///
    /// This function will return an error if any system error occurs.
    pub fn setup(self) -> Result<(), SetupEnvironmentError> {
        for (dir, mode) in &self.directories {
            fs::create_dir_all(dir).context(CreateDirectorySnafu { dir })?;

            if let Some(mode) = *mode {
                let current = fs::metadata(dir)
                    .context(SetPermissionSnafu { path: dir, mode })?
                    .permissions()
                    .mode();
                if current & 0o777 != mode {
                    fs::set_permissions(dir, Permissions::from_mode(mode))
                        .context(SetPermissionSnafu { path: dir, mode })?;
                }
            }
        }

        Ok(())
    }
}

/// An error for setting up the running environment.
#[derive(Debug, Snafu, Clone)]
pub enum SetupEnvironmentError {
    #[snafu(display("Could not create directory {}", dir.display()))]
    CreateDirectory {
        dir: PathBuf,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not set {}'s mode to {mode:o}", path.display()))]
    SetPermission {
        path: PathBuf,
        mode: u32,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}
