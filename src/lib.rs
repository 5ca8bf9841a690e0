//! # gps-socket
//!
//! A Rust client for the framed JSON telemetry stream served by a local
//! GNSS receiver server.
//!
//! This library turns the raw byte stream of a server connection into
//! discrete JSON messages and extracts nested fields from them using
//! dotted paths such as `Ubx.Nav.RelPosNed.i_tow`.
//!
//! ## Overview
//!
//! The server (by default on `127.0.0.1:9165`) sends one frame per message:
//! a 4-byte little-endian payload length followed by the UTF-8 JSON payload.
//! Messages have no fixed schema and are handled as [`serde_json::Value`]s.
//!
//! - [`protocol`] decodes frames from an accumulating receive buffer
//! - [`client`] drives a socket and yields one message per frame, either
//!   asynchronously or through [`client::blocking`]
//! - [`path`] looks up fields in decoded messages
//!
//! ## Example
//!
//! ```no_run
//! use gps_socket::client::blocking::MessageReader;
//! use gps_socket::path::{self, Path};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect to the telemetry server
//!     let reader = MessageReader::connect("127.0.0.1:9165")?;
//!     let fields = Path::parse_list("Ubx.Nav.RelPosNed.i_tow,Ubx.Nav.RelPosNed.rel_pos_n");
//!
//!     // Print the selected fields of every incoming message
//!     for msg in reader {
//!         let msg = msg?;
//!         for field in path::filter(&msg, &fields) {
//!             let (key, value) = field?;
//!             println!("{key}: {value}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use crate::error::GpsSocketError;

/// Message readers for establishing connections and receiving telemetry
pub mod client;

/// Error types used throughout the library
pub mod error;

/// Dotted-path lookup into decoded messages
pub mod path;

/// Frame codec and message decoding for the telemetry stream
pub mod protocol;

/// Convenience type alias for Results with GpsSocketError
pub type Result<T> = core::result::Result<T, GpsSocketError>;
