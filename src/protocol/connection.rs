use std::sync::Arc;

use bytes::{Buf, BytesMut};
use snafu::prelude::*;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, Error};

use crate::protocol::data::{Protocol, Request, Response};
use crate::protocol::frame::{Frame, ParseFrameError, WriteFrameError};

/// A stream (typically a socket) speaking the frame protocol. Exclusive
/// access through `&mut self` keeps every frame whole on the wire.
pub struct Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream: S,
    buffer: BytesMut,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Serialize a [`Frame`] to bytes and send it through the wrapped stream.
    ///
    /// # Errors
    ///
    /// This function will return an error if serialization fails or network
    /// IO fails.
    pub async fn send(&mut self, frame: Frame) -> Result<(), SendFrameError> {
        let mut buffer = BytesMut::with_capacity(256);
        frame.write(&mut buffer).context(WriteSnafuS)?;

        self.stream
            .write_all(&buffer)
            .await
            .context(NetworkSnafuS)?;
        self.stream.flush().await.context(NetworkSnafuS)?;

        Ok(())
    }

    /// Receive bytes from the wrapped stream until a whole [`Frame`] is
    /// buffered. Bytes following the frame stay buffered for the next call.
    ///
    /// # Errors
    ///
    /// This function will return an error if deserialization fails, network
    /// IO fails or the peer closes the stream.
    pub async fn receive(&mut self) -> Result<Frame, ReceiveFrameError> {
        loop {
            match Frame::parse(&self.buffer[..]) {
                Ok((frame, offset)) => {
                    self.buffer.advance(offset);
                    return Ok(frame);
                }
                Err(ParseFrameError::Incomplete) => {}
                Err(err) => return Err(err).context(ParseSnafuR),
            }

            let read = self
                .stream
                .read_buf(&mut self.buffer)
                .await
                .context(NetworkSnafuR)?;
            ensure!(read != 0, ClosedSnafuR);
        }
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Send `request` and wait for the peer's reply.
    ///
    /// # Errors
    ///
    /// This function will return an error if the frames could not be
    /// exchanged or the peer replied with something other than a
    /// [`Response`].
    pub async fn request(&mut self, request: Request) -> Result<Response, ExchangeError> {
        self.send(Protocol::Request(request).into())
            .await
            .context(SendSnafuE)?;
        self.receive_response().await
    }

    /// Receive the next [`Response`], such as one of a stream of
    /// [`Response::Watch`] frames.
    ///
    /// # Errors
    ///
    /// This function will return an error if no frame could be received or
    /// the frame is not a [`Response`].
    pub async fn receive_response(&mut self) -> Result<Response, ExchangeError> {
        match Protocol::from(self.receive().await.context(ReceiveSnafuE)?) {
            Protocol::Response(response) => Ok(response),
            protocol => UnexpectedSnafuE { protocol }.fail(),
        }
    }
}

impl<S> From<S> for Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn from(value: S) -> Self {
        Self {
            stream: value,
            buffer: BytesMut::with_capacity(1024),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(SnafuS)))]
pub enum SendFrameError {
    #[snafu(display("Could not write frame to buffer"))]
    Write { source: WriteFrameError },
    #[snafu(display("Could not send bytes through inner stream"))]
    Network {
        #[snafu(source(from(Error, Arc::new)))]
        source: Arc<Error>,
    },
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(SnafuR)))]
pub enum ReceiveFrameError {
    #[snafu(display("Could not parse frame from buffer"))]
    Parse { source: ParseFrameError },
    #[snafu(display("Connection is closed by the peer"))]
    Closed,
    #[snafu(display("Could not receive bytes through inner stream"))]
    Network {
        #[snafu(source(from(Error, Arc::new)))]
        source: Arc<Error>,
    },
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(SnafuE)))]
pub enum ExchangeError {
    #[snafu(display("Could not send request"))]
    Send { source: SendFrameError },
    #[snafu(display("Could not receive response"))]
    Receive { source: ReceiveFrameError },
    #[snafu(display("Expected a response, got {protocol:?}"))]
    Unexpected { protocol: Protocol },
}
