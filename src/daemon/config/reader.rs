use std::fs::File;
use std::io::{Error as IoError, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;

/// A reader of a whole text file which optionally writes a template first
/// when the file is missing.
pub struct ContentReader {
    path: PathBuf,
    template: Option<String>,
}

impl ContentReader {
    /// Creates a [`ContentReader`] which fails on a missing file.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            template: None,
        }
    }

    /// Create the missing file from `template` instead of failing.
    pub fn or_create<T: Into<String>>(mut self, template: T) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Read content from the file.
    ///
    /// # Errors
    ///
    /// This function will return an error if file doesn't exist and no
    /// template is given, or the file could not be created or read.
    pub fn read(self) -> Result<String, ReadContentError> {
        let mut file = self.open()?;
        let mut content = String::new();
        file.read_to_string(&mut content).context(FileSystemSnafu {
            when: "Reading content",
        })?;
        Ok(content)
    }

    fn open(&self) -> Result<File, ReadContentError> {
        match File::open(&self.path) {
            Ok(file) => Ok(file),
            Err(err) if err.kind() == ErrorKind::NotFound => match &self.template {
                Some(template) => self.create(template),
                None => NotFoundSnafu {
                    path: self.path.as_path(),
                }
                .fail(),
            },
            Err(err) => Err(err).context(FileSystemSnafu {
                when: "Opening file",
            }),
        }
    }

    fn create(&self, template: &str) -> Result<File, ReadContentError> {
        tracing::info!(path = %self.path.display(), "Creating file from template");
        let mut file = File::options()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&self.path)
            .context(FileSystemSnafu {
                when: "Creating file",
            })?;

        file.write_all(template.as_bytes())
            .context(FileSystemSnafu {
                when: "Writing template",
            })?;
        file.seek(SeekFrom::Start(0)).context(FileSystemSnafu {
            when: "Rewinding file",
        })?;

        Ok(file)
    }
}

/// An error type for reading content from a file.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum ReadContentError {
    #[snafu(display("Could not open inexistent file {}", path.display()))]
    NotFound { path: PathBuf },
    #[snafu(display("File system error: {when}"))]
    FileSystem {
        when: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}
