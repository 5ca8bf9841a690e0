//! Error types for framed telemetry stream operations
//!
//! This module defines the error types that can occur when reading frames
//! from a telemetry server, decoding their JSON payloads, or extracting
//! fields from decoded messages.

use thiserror::Error;

/// Main error type for telemetry stream operations
///
/// Every variant is fatal to the operation that produced it. Connection and
/// decode failures end the read loop of a reader, while path failures only
/// concern a single extraction pass over one message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GpsSocketError {
    /// I/O error occurred during network communication
    ///
    /// Raised when connecting fails, or when a receive or send on an
    /// established socket reports an error other than `Interrupted`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection
    ///
    /// A receive returned no bytes while the reader was waiting for a
    /// frame. `pending` is the number of bytes of an incomplete frame that
    /// were still buffered at that point.
    #[error("connection closed by peer with {pending} byte(s) of an incomplete frame buffered")]
    ConnectionClosed { pending: usize },

    /// A frame payload could not be decoded
    ///
    /// The framing format offers no way to resynchronise, so a reader that
    /// reports this error should not be used further.
    #[error("failed to decode {}-byte frame payload: {reason}", .payload.len())]
    Decode {
        /// Raw payload bytes of the offending frame
        payload: Vec<u8>,
        #[source]
        reason: DecodeFailure,
    },

    /// A message could not be serialized for sending
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// A payload is too long to be described by a 4-byte length header
    #[error("payload of {len} bytes exceeds the maximum frame length")]
    FrameTooLarge { len: usize },

    /// A path segment indexed a sequence out of bounds
    #[error("index {index} out of range for sequence of length {len} at `{path}`")]
    PathIndex {
        path: String,
        index: usize,
        len: usize,
    },

    /// A path segment cannot be applied to the value it reached
    ///
    /// This covers non-numeric segments applied to sequences as well as any
    /// segment applied to a scalar or null value.
    #[error("segment `{segment}` cannot be applied to {found} at `{path}`")]
    PathType {
        path: String,
        segment: String,
        found: &'static str,
    },
}

impl GpsSocketError {
    /// Returns true if the error came from field extraction rather than the connection
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            GpsSocketError::PathIndex { .. } | GpsSocketError::PathType { .. }
        )
    }
}

/// Reason a frame payload failed to decode
#[derive(Debug, Error)]
pub enum DecodeFailure {
    /// The payload bytes are not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The payload text is not valid JSON, or does not match the requested type
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
