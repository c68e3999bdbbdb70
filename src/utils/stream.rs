use tokio::io::DuplexStream;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;

/// A byte stream carrying protocol frames, either a socket or an in-memory
/// pipe, which can be moved to another task.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl Stream for UnixStream {}

impl Stream for DuplexStream {}

impl Stream for Box<dyn Stream> {}
