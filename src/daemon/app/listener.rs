use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;
use tokio::io::DuplexStream;
use tokio::net::UnixListener as TokioUnixListener;
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::utils::stream::Stream;

/// Source of observer connections for the server.
#[async_trait::async_trait]
pub trait Listener: Send + Sync {
    /// Wait for the next observer and return its stream.
    ///
    /// # Errors
    ///
    /// This function will return an error if no connection could be accepted.
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError>;
}

/// An error for binding and accepting.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ListenError {
    #[snafu(display("Endpoint {endpoint} is occupied"))]
    InUse { endpoint: String },
    #[snafu(display("Could not remove stale socket {endpoint}"))]
    Stale {
        endpoint: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not bind to {endpoint}"))]
    Bind {
        endpoint: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not accept connection due to system error"))]
    Accept {
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("No peer is waiting for connections"))]
    Closed,
}

/// A [`Listener`] on a UNIX socket. The socket file is removed again when the
/// listener is dropped.
#[derive(Debug)]
pub struct UnixListener {
    listener: TokioUnixListener,
    path: PathBuf,
}

impl UnixListener {
    /// Bind to the socket at `path`. A socket left behind by a daemon that
    /// is gone is replaced, while a socket that still accepts connections or
    /// any other file is never touched.
    ///
    /// # Errors
    ///
    /// This function will return an error if the endpoint is occupied or
    /// binding fails.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ListenError> {
        let path = path.as_ref();
        let endpoint = || path.to_string_lossy().into_owned();

        if let Ok(metadata) = std::fs::symlink_metadata(path) {
            let stale = metadata.file_type().is_socket() && StdUnixStream::connect(path).is_err();
            ensure!(stale, InUseSnafu { endpoint: endpoint() });

            tracing::warn!(socket = %path.display(), "Replacing stale socket");
            std::fs::remove_file(path).context(StaleSnafu { endpoint: endpoint() })?;
        }

        let listener = TokioUnixListener::bind(path).map_err(|err| match err.kind() {
            IoErrorKind::AddrInUse => InUseSnafu { endpoint: endpoint() }.build(),
            _ => ListenError::Bind {
                endpoint: endpoint(),
                source: Arc::new(err),
            },
        })?;

        Ok(Self {
            listener,
            path: path.to_path_buf(),
        })
    }

    /// Path of the bound socket.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UnixListener {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(socket = %self.path.display(), "Removed socket"),
            Err(err) if err.kind() == IoErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(%err, socket = %self.path.display(), "Could not remove socket");
            }
        }
    }
}

#[async_trait::async_trait]
impl Listener for UnixListener {
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError> {
        let (stream, _) = self.listener.accept().await.context(AcceptSnafu)?;
        Ok(Box::new(stream))
    }
}

/// A [`Listener`] handing out in-memory [`DuplexStream`]s, whose other ends
/// arrive on the returned receiver. Used by tests.
#[derive(Debug)]
pub struct DuplexListener {
    peer: Sender<DuplexStream>,
    buffer_size: usize,
}

impl DuplexListener {
    pub fn new(buffer_size: usize) -> (Self, Receiver<DuplexStream>) {
        let (peer, receiver) = mpsc::channel(1);
        (Self { peer, buffer_size }, receiver)
    }
}

#[async_trait::async_trait]
impl Listener for DuplexListener {
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError> {
        let (local, remote) = tokio::io::duplex(self.buffer_size);
        self.peer.send(remote).await.map_err(|_| ListenError::Closed)?;
        Ok(Box::new(local))
    }
}
