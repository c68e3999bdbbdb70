use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;
use xdg::{BaseDirectories, BaseDirectoriesError};

/// Files the application keeps in XDG base directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppFile {
    /// Static configuration, `config.toml`.
    Config,
    /// The settings store, `settings.toml`.
    Settings,
    /// Today's statistics, `stats.json`.
    Stats,
    /// The daemon's UNIX socket.
    Socket,
    /// The daemon's PID file.
    Pid,
}

impl AppFile {
    /// File name inside the application's directory.
    pub fn name(self) -> &'static str {
        match self {
            Self::Config => "config.toml",
            Self::Settings => "settings.toml",
            Self::Stats => "stats.json",
            Self::Socket => "daemon.socket",
            Self::Pid => "daemon.pid",
        }
    }

    /// The base directory this file belongs to.
    pub fn base(self) -> XdgBaseKind {
        match self {
            Self::Config | Self::Settings => XdgBaseKind::Config,
            Self::Stats => XdgBaseKind::Data,
            Self::Socket | Self::Pid => XdgBaseKind::Runtime,
        }
    }
}

/// Locates the application's files in XDG base directories, under a
/// subdirectory named after the application.
pub struct Xdg {
    base: BaseDirectories,
}

impl Xdg {
    /// # Errors
    ///
    /// This function will return an error if XDG settings is missing.
    pub fn new<P: AsRef<Path>>(prefix: P) -> Result<Self, XdgError> {
        let base = BaseDirectories::with_prefix(prefix).context(InitSnafu)?;
        Ok(Self { base })
    }

    /// Absolute path of `file`. Leading directories of persistent files are
    /// created on the way. Runtime files are only resolved, since the daemon
    /// sets up the runtime directory with private permissions itself.
    ///
    /// # Errors
    ///
    /// This function will return an error if the XDG runtime directory is
    /// unavailable or a directory could not be created.
    pub fn locate(&self, file: AppFile) -> Result<PathBuf, XdgError> {
        let kind = file.base();
        let res = match kind {
            XdgBaseKind::Config => self.base.place_config_file(file.name()),
            XdgBaseKind::Data => self.base.place_data_file(file.name()),
            XdgBaseKind::Runtime => return self.runtime(file),
        };

        res.with_context(|_| FileSystemSnafu {
            message: format!("Could not create {kind} directory for {}", file.name()),
        })
    }

    fn runtime(&self, file: AppFile) -> Result<PathBuf, XdgError> {
        self.base
            .get_runtime_file(file.name())
            .context(FileSystemSnafu {
                message: "XDG runtime directory is not available",
            })
    }
}

/// Kind of XDG base directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XdgBaseKind {
    Config,
    Data,
    Runtime,
}

impl Display for XdgBaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Config => f.write_str("configuration"),
            Self::Data => f.write_str("data"),
            Self::Runtime => f.write_str("runtime"),
        }
    }
}

/// An error for XDG-related operations.
#[derive(Debug, Snafu, Clone)]
pub enum XdgError {
    #[snafu(display("Could not get XDG settings"))]
    Init {
        #[snafu(source(from(BaseDirectoriesError, Arc::new)))]
        source: Arc<BaseDirectoriesError>,
    },
    #[snafu(display("File system error: {message}"))]
    FileSystem {
        message: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_file_layout() {
        assert_eq!(AppFile::Config.base(), XdgBaseKind::Config);
        assert_eq!(AppFile::Settings.base(), XdgBaseKind::Config);
        assert_eq!(AppFile::Stats.base(), XdgBaseKind::Data);
        assert_eq!(AppFile::Socket.base(), XdgBaseKind::Runtime);
        assert_eq!(AppFile::Pid.base(), XdgBaseKind::Runtime);
        assert_eq!(AppFile::Stats.name(), "stats.json");
        assert_eq!(AppFile::Socket.name(), "daemon.socket");
    }

    #[test]
    fn xdg_base_kind_display() {
        assert_eq!(XdgBaseKind::Config.to_string(), "configuration");
        assert_eq!(XdgBaseKind::Data.to_string(), "data");
        assert_eq!(XdgBaseKind::Runtime.to_string(), "runtime");
    }
}
