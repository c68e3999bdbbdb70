mod content;
mod reader;

use std::path::Path;

pub use content::{Configuration, MessageSection, NotificationSection, RuntimeSection};
pub use reader::{ContentReader, ReadContentError};

use snafu::prelude::*;
use toml::de::Error as DeError;

use crate::utils::xdg::{AppFile, Xdg, XdgError};

pub const DEFAULT_CONTENT: &str = r#"
# This configuration file is generated automatically. Feel free to do some
# modification. Phase durations live in `settings.toml` next to this file.

# The `notification.<phase>` sections specify the message shown when a phase
# counts down to zero. `body` is optional.
[notification.work]
summary = "Work Complete!"
body = "Time for a break"

[notification.short_break]
summary = "Break Over!"
body = "Ready to focus?"

[notification.long_break]
summary = "Break Over!"
body = "Ready to focus?"

# The `runtime` section overrides the paths to the runtime files. Leave them
# out to use the XDG runtime directory.
# [runtime]
# socket = "/path/to/unix/socket"
# pid = "/path/to/pid/file"
"#;

/// An error type for loading configuraton from files.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum LoadConfigurationError {
    #[snafu(display("Could not resolve XDG configuration directory"))]
    XdgConfig { source: XdgError },
    #[snafu(display("Could not read content from file"))]
    Read { source: ReadContentError },
    #[snafu(display("Could not parse invalid configurations"))]
    Parse { source: DeError },
}

/// Read configuration from given path. Optionally create one from default
/// template if it doesn't exists.
///
/// # Errors
///
/// This function will return an error if reading content from file fails or
/// parsing configuration fails.
pub fn load<P: AsRef<Path>>(
    path: P,
    create_new: bool,
) -> Result<Configuration, LoadConfigurationError> {
    let reader = ContentReader::new(path);
    let reader = if create_new {
        reader.or_create(DEFAULT_CONTENT)
    } else {
        reader
    };
    let content = reader.read().context(ReadSnafu)?;
    toml::from_str(&content).context(ParseSnafu)
}

/// Read configuration from a custom path. This won't create any new file.
///
/// # Errors
///
/// This function will return an error if reading content from file fails or
/// parsing configuration fails.
pub fn load_with_path<P: AsRef<Path>>(path: P) -> Result<Configuration, LoadConfigurationError> {
    load(path, false)
}

/// Read configuration from XDG configuration directory. Create one from default
/// template if it doesn't exists.
///
/// # Errors
///
/// This function will return an error if reading content from file fails or
/// parsing configuration fails.
pub fn load_with_xdg(app_name: &str) -> Result<Configuration, LoadConfigurationError> {
    let path = Xdg::new(app_name)
        .and_then(|xdg| xdg.locate(AppFile::Config))
        .context(XdgConfigSnafu)?;
    load(path, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn load_create_new() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("config.toml");
        assert!(load(file.path(), true).is_ok());
        file.assert(DEFAULT_CONTENT);
    }

    #[test]
    fn load_with_path_error_parse() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("config.toml");
        file.write_str("[notification.work]\nsummary = 1\n").unwrap();
        assert!(matches!(
            load_with_path(file.path()),
            Err(LoadConfigurationError::Parse { .. })
        ));
    }
}
