//! Length-prefixed frame codec
//!
//! A frame is a 4-byte little-endian unsigned length followed by exactly
//! that many payload bytes. There is no magic number, checksum or
//! delimiter, and no upper bound on the payload size besides the range of
//! the header.

use tracing::trace;

use crate::{
    Result,
    error::{DecodeFailure, GpsSocketError},
};

/// Size of the length header preceding every payload
pub const FRAME_HEADER_LEN: usize = 4;

/// Reads the payload length from the header at the start of `buf`
///
/// Returns `None` if fewer than [`FRAME_HEADER_LEN`] bytes are available.
pub fn frame_len(buf: &[u8]) -> Option<usize> {
    let header: [u8; FRAME_HEADER_LEN] = buf.get(..FRAME_HEADER_LEN)?.try_into().ok()?;
    Some(u32::from_le_bytes(header) as usize)
}

/// Splits the first complete frame off the start of `buf`
///
/// Returns the payload and the bytes following it, or `None` if either the
/// header or the body is still incomplete.
pub fn split_frame(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let len = frame_len(buf)?;
    let end = len.checked_add(FRAME_HEADER_LEN)?;
    if buf.len() < end {
        return None;
    }

    Some((&buf[FRAME_HEADER_LEN..end], &buf[end..]))
}

/// Appends `payload` to `out` as one frame
///
/// # Errors
/// * `FrameTooLarge` - The payload length does not fit into the header
pub fn encode_frame(payload: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| GpsSocketError::FrameTooLarge { len: payload.len() })?;

    out.reserve(FRAME_HEADER_LEN + payload.len());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(())
}

/// Stateful decoder holding the receive buffer of one connection
///
/// Received bytes are appended with [`extend`](Self::extend) and frames are
/// taken off the front one at a time. While a frame is incomplete the
/// buffer is left untouched, so the header is re-read on the next attempt
/// instead of being consumed ahead of its body.
#[derive(Debug, Default, Clone)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    /// Creates a decoder with an empty receive buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder whose buffer can hold `capacity` bytes without reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        FrameDecoder {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Appends newly received bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of bytes currently buffered and not yet returned as a frame
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discards all buffered bytes
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Takes the raw payload of the next complete frame off the buffer
    ///
    /// Returns `None` if no complete frame is buffered yet; in that case the
    /// buffer is unchanged.
    pub fn next_payload(&mut self) -> Option<Vec<u8>> {
        let len = match split_frame(&self.buf) {
            Some((payload, _)) => payload.len(),
            None => return None,
        };

        let rest = self.buf.split_off(FRAME_HEADER_LEN + len);
        let mut frame = std::mem::replace(&mut self.buf, rest);
        frame.drain(..FRAME_HEADER_LEN);

        trace!(len, remaining = self.buf.len(), "frame extracted");
        Some(frame)
    }

    /// Takes the next complete frame off the buffer and decodes it as UTF-8 text
    ///
    /// # Returns
    /// * `Ok(Some(text))` - A frame was complete
    /// * `Ok(None)` - More bytes are needed
    /// * `Err(_)` - The frame was consumed but its payload is not UTF-8
    pub fn next_frame(&mut self) -> Result<Option<String>> {
        let Some(payload) = self.next_payload() else {
            return Ok(None);
        };

        match String::from_utf8(payload) {
            Ok(text) => Ok(Some(text)),
            Err(err) => {
                let reason = DecodeFailure::Utf8(err.utf8_error());
                Err(GpsSocketError::Decode {
                    payload: err.into_bytes(),
                    reason,
                })
            }
        }
    }
}
