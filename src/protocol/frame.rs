use bytes::{Buf, BufMut};
use serde_json::Error as SerdeError;
use snafu::prelude::*;

use crate::protocol::data::Protocol;

/// Marker byte every frame starts with.
const START: u8 = b'+';
/// Length of the marker byte plus the `u64` length.
const HEADER_LEN: usize = 9;
/// Upper bound of the JSON payload. Nothing the daemon exchanges comes close.
pub const MAX_PAYLOAD_LEN: usize = 64 * 1024;

/// A wrapper of [`Protocol`] for converting the internal data from and to
/// bytes and being transmitted through byte stream.
///
/// The layout of a [`Frame`] in bytes is described below:
/// - starts with a `b'+'` and a big-endian `u64` as the payload's length,
/// - followed by a JSON payload of that length, at most
///   [`MAX_PAYLOAD_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Protocol,
}

impl Frame {
    /// Parse a [`Frame`] from one of buf's prefix and advance buf's cursor.
    /// Return a [`Frame`] and the offset from the initial position.
    ///
    /// Note that the cursor could be advanced even if it fails to parse a
    /// [`Frame`], its final position is expected to be valid only when it
    /// succeeds.
    ///
    /// # Errors
    ///
    /// This function will return an error if there is no enough byte or the
    /// data is broken.
    pub fn parse<B: Buf>(mut buf: B) -> Result<(Self, usize), ParseFrameError> {
        ensure!(buf.remaining() >= 1, IncompleteSnafu);
        ensure!(buf.get_u8() == START, InvalidStartSnafu);

        ensure!(buf.remaining() >= HEADER_LEN - 1, IncompleteSnafu);
        let len = usize::try_from(buf.get_u64()).unwrap_or(usize::MAX);
        ensure!(len > 0, InvalidLengthSnafu);
        ensure!(len <= MAX_PAYLOAD_LEN, TooLargeSnafu { len });

        // Try to parse a `Frame` from remaining bytes.
        ensure!(buf.remaining() >= len, IncompleteSnafu);
        let reader = buf.take(len).reader();
        let data: Protocol = serde_json::from_reader(reader).context(DeserializationSnafu)?;
        tracing::trace!(len, "Parsed frame");

        Ok((data.into(), HEADER_LEN + len))
    }

    /// Serialize a [`Frame`] and write it to buf.
    ///
    /// # Errors
    ///
    /// This function will return an error if the serialization fails.
    pub fn write<B: BufMut>(&self, mut buf: B) -> Result<(), WriteFrameError> {
        let data = serde_json::to_string(&self.data).context(SerializationSnafu)?;
        ensure!(
            data.len() <= MAX_PAYLOAD_LEN,
            OversizedSnafu { len: data.len() }
        );
        buf.put_u8(START);
        buf.put_u64(data.len() as u64);
        buf.put_slice(data.as_bytes());
        Ok(())
    }
}

impl From<Protocol> for Frame {
    fn from(value: Protocol) -> Self {
        Self { data: value }
    }
}

impl From<Frame> for Protocol {
    fn from(value: Frame) -> Self {
        value.data
    }
}

/// An error type for parsing a [`Frame`] from bytes.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ParseFrameError {
    #[snafu(display("Could not parse a frame with incomplete data"))]
    Incomplete,
    #[snafu(display("Could not parse the start symbol"))]
    InvalidStart,
    #[snafu(display("The content length should be non-zero"))]
    InvalidLength,
    #[snafu(display("The content length {len} exceeds {MAX_PAYLOAD_LEN} bytes"))]
    TooLarge { len: usize },
    #[snafu(display("Could not deserialize data"))]
    Deserialization { source: SerdeError },
}

/// An error type for writing a [`Frame`] to bytes.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteFrameError {
    #[snafu(display("Could not serialize frame"))]
    Serialization { source: SerdeError },
    #[snafu(display("Serialized frame of {len} bytes exceeds {MAX_PAYLOAD_LEN} bytes"))]
    Oversized { len: usize },
}
