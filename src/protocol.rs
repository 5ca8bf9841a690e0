use std::{
    pin::Pin,
    task::{Context, Poll},
};

use tracing::{debug, trace};

use crate::{
    Result,
    error::{DecodeFailure, GpsSocketError},
};

pub mod frame;

pub use frame::{FRAME_HEADER_LEN, FrameDecoder, encode_frame, frame_len, split_frame};

/// A decoded frame payload
///
/// Messages have no fixed schema; they are handled as plain JSON values.
pub type Message = serde_json::Value;

/// Default number of bytes requested from the socket per receive
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default address of the local telemetry server
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:9165";

/// Parses a frame's payload text as JSON into `T`
pub fn decode_payload<T>(payload: String) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    match serde_json::from_str(&payload) {
        Ok(value) => Ok(value),
        Err(err) => {
            debug!(len = payload.len(), error = %err, "frame payload is not valid JSON");
            Err(GpsSocketError::Decode {
                payload: payload.into_bytes(),
                reason: DecodeFailure::Json(err),
            })
        }
    }
}

pub trait GpsJsonDecode: std::io::Read {
    /// Performs one receive into `chunk` and feeds the bytes to `decoder`
    ///
    /// Returns the number of bytes received; `0` means the peer closed the
    /// connection.
    fn fill_decoder(&mut self, decoder: &mut FrameDecoder, chunk: &mut [u8]) -> Result<usize> {
        loop {
            match self.read(chunk) {
                Ok(received) => {
                    decoder.extend(&chunk[..received]);
                    trace!(received, buffered = decoder.buffered(), "received bytes");
                    return Ok(received);
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(GpsSocketError::Io(err)),
            }
        }
    }
}

impl<R: std::io::Read + ?Sized> GpsJsonDecode for R {}

pub trait GpsJsonDecodeAsync: futures_io::AsyncRead + Unpin {
    /// Polls one receive into `chunk` and feeds the bytes to `decoder`
    ///
    /// Resolves to the number of bytes received; `0` means the peer closed
    /// the connection.
    fn poll_fill_decoder(
        &mut self,
        cx: &mut Context<'_>,
        decoder: &mut FrameDecoder,
        chunk: &mut [u8],
    ) -> Poll<Result<usize>> {
        loop {
            match std::task::ready!(Pin::new(&mut *self).poll_read(cx, chunk)) {
                Ok(received) => {
                    decoder.extend(&chunk[..received]);
                    trace!(received, buffered = decoder.buffered(), "received bytes");
                    return Poll::Ready(Ok(received));
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Poll::Ready(Err(GpsSocketError::Io(err))),
            }
        }
    }
}

impl<R: futures_io::AsyncRead + Unpin + ?Sized> GpsJsonDecodeAsync for R {}

pub trait GpsJsonEncode: std::io::Write {
    /// Writes `payload` as one frame
    fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        let mut buf = Vec::new();
        encode_frame(payload, &mut buf)?;
        self.write_all(&buf).map_err(GpsSocketError::Io)
    }

    /// Serializes `message` as JSON and writes it as one frame
    fn write_message<T>(&mut self, message: &T) -> Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(message).map_err(GpsSocketError::Encode)?;
        self.write_frame(&payload)
    }
}

impl<W: std::io::Write + ?Sized> GpsJsonEncode for W {}
