use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;
use tokio::io::DuplexStream;
use tokio::net::UnixStream;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::time::Duration;

use crate::utils::stream::Stream;

/// Bound of establishing a connection to the daemon's socket.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Opens a fresh stream to the daemon for every request.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    /// # Errors
    ///
    /// This function will return an error if no daemon could be reached.
    async fn connect(&self) -> Result<Box<dyn Stream>, ConnectError>;
}

/// An error for reaching the daemon.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ConnectError {
    #[snafu(display("No daemon is listening on {endpoint}"))]
    Unavailable { endpoint: String },
    #[snafu(display("Daemon on {endpoint} did not accept within {timeout:?}"))]
    TimedOut { endpoint: String, timeout: Duration },
    #[snafu(display("Could not connect due to system error"))]
    System {
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}

/// A [`Connector`] for the daemon's UNIX socket.
#[derive(Debug, Clone)]
pub struct UnixConnector {
    path: PathBuf,
    timeout: Duration,
}

impl UnixConnector {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_timeout(path, CONNECT_TIMEOUT)
    }

    pub fn with_timeout<P: AsRef<Path>>(path: P, timeout: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

#[async_trait::async_trait]
impl Connector for UnixConnector {
    async fn connect(&self) -> Result<Box<dyn Stream>, ConnectError> {
        let res = tokio::time::timeout(self.timeout, UnixStream::connect(&self.path)).await;
        let Ok(res) = res else {
            return TimedOutSnafu {
                endpoint: self.endpoint(),
                timeout: self.timeout,
            }
            .fail();
        };

        match res {
            Ok(stream) => Ok(Box::new(stream)),
            // A socket file left by a dead daemon refuses connections.
            Err(err)
                if matches!(
                    err.kind(),
                    IoErrorKind::NotFound | IoErrorKind::ConnectionRefused
                ) =>
            {
                UnavailableSnafu {
                    endpoint: self.endpoint(),
                }
                .fail()
            }
            Err(err) => Err(err).context(SystemSnafu),
        }
    }
}

/// A [`Connector`] handing out in-memory [`DuplexStream`]s, whose other ends
/// arrive on the returned receiver. Used by tests.
#[derive(Debug, Clone)]
pub struct DuplexConnector {
    peer: Sender<DuplexStream>,
    buffer_size: usize,
}

impl DuplexConnector {
    pub fn new(buffer_size: usize) -> (Self, Receiver<DuplexStream>) {
        let (peer, receiver) = mpsc::channel(1);
        (Self { peer, buffer_size }, receiver)
    }
}

#[async_trait::async_trait]
impl Connector for DuplexConnector {
    async fn connect(&self) -> Result<Box<dyn Stream>, ConnectError> {
        let (local, remote) = tokio::io::duplex(self.buffer_size);
        if self.peer.send(remote).await.is_err() {
            return UnavailableSnafu { endpoint: "memory" }.fail();
        }
        Ok(Box::new(local))
    }
}
