//! Blocking (synchronous) message reader implementation
//!
//! This module provides a synchronous version of the message reader for
//! applications that don't require asynchronous I/O. It offers the same
//! functionality as the async reader but with blocking operations.

use std::net::{TcpStream, ToSocketAddrs};

use tracing::debug;

use crate::Result;
use crate::client::ReaderOptions;
use crate::error::GpsSocketError;
use crate::protocol::{FrameDecoder, GpsJsonDecode, Message, decode_payload};

/// Blocking reader turning a byte stream into decoded messages
///
/// The reader owns the receive buffer of one connection. Each call to
/// [`read_message`](Self::read_message) blocks until one complete frame has
/// arrived, then returns its decoded payload.
///
/// # Type Parameters
/// * `Stream` - The underlying I/O stream type (e.g., TcpStream)
#[derive(Debug)]
pub struct MessageReader<Stream> {
    stream: Stream,
    decoder: FrameDecoder,
    chunk: Box<[u8]>,
    terminated: bool,
}

impl<Stream> MessageReader<Stream> {
    /// Creates a reader over an already connected stream with default options
    pub fn open(stream: Stream) -> Self {
        Self::with_options(stream, ReaderOptions::default())
    }

    /// Creates a reader over an already connected stream
    pub fn with_options(stream: Stream, opts: ReaderOptions) -> Self {
        MessageReader {
            stream,
            decoder: FrameDecoder::with_capacity(opts.chunk_size),
            chunk: vec![0; opts.chunk_size].into_boxed_slice(),
            terminated: false,
        }
    }

    pub fn get_ref(&self) -> &Stream {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut Stream {
        &mut self.stream
    }

    /// Number of received bytes not yet returned as a message
    pub fn buffered(&self) -> usize {
        self.decoder.buffered()
    }

    /// Consumes the reader and returns the underlying stream
    ///
    /// Any buffered bytes of an incomplete frame are discarded.
    pub fn into_inner(self) -> Stream {
        self.stream
    }
}

impl<Stream> MessageReader<Stream>
where
    Stream: std::io::Read,
{
    /// Blocks until the next complete frame arrives and returns its payload text
    ///
    /// # Errors
    /// * `ConnectionClosed` - The peer closed the connection before a frame completed
    /// * `Io` - The receive failed
    /// * `Decode` - The payload is not valid UTF-8
    pub fn read_frame(&mut self) -> Result<String> {
        loop {
            if let Some(payload) = self.decoder.next_frame()? {
                return Ok(payload);
            }

            let received = self.stream.fill_decoder(&mut self.decoder, &mut self.chunk)?;
            if received == 0 {
                let pending = self.decoder.buffered();
                debug!(pending, "connection closed by peer");
                return Err(GpsSocketError::ConnectionClosed { pending });
            }
        }
    }

    /// Blocks until the next complete frame arrives and returns it as a JSON value
    ///
    /// # Errors
    /// As [`read_frame`](Self::read_frame), plus `Decode` if the payload is
    /// not valid JSON.
    pub fn read_message(&mut self) -> Result<Message> {
        self.read_message_as()
    }

    /// Blocks until the next complete frame arrives and deserializes it into `T`
    pub fn read_message_as<T>(&mut self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let payload = self.read_frame()?;
        decode_payload(payload)
    }
}

impl MessageReader<TcpStream> {
    /// Connects to a telemetry server over TCP with default options
    ///
    /// # Arguments
    /// * `addr` - Socket address of the server (e.g., "127.0.0.1:9165")
    ///
    /// # Example
    /// ```no_run
    /// # use gps_socket::client::blocking::MessageReader;
    /// let mut reader = MessageReader::connect("127.0.0.1:9165").unwrap();
    /// let msg = reader.read_message().unwrap();
    /// ```
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        Self::connect_with(addr, ReaderOptions::default())
    }

    /// Connects to a telemetry server over TCP
    pub fn connect_with<A: ToSocketAddrs>(addr: A, opts: ReaderOptions) -> Result<Self> {
        let stream = TcpStream::connect(addr).map_err(GpsSocketError::Io)?;
        stream
            .set_nodelay(opts.nodelay)
            .map_err(GpsSocketError::Io)?;
        debug!(peer = ?stream.peer_addr().ok(), "connected to telemetry server");
        Ok(Self::with_options(stream, opts))
    }
}

impl TryFrom<TcpStream> for MessageReader<TcpStream> {
    type Error = GpsSocketError;

    fn try_from(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true).map_err(GpsSocketError::Io)?;
        Ok(Self::open(stream))
    }
}

/// Yields one decoded message per frame
///
/// The first error, including the peer closing the connection, is yielded
/// once; the iterator then returns `None`.
impl<Stream> Iterator for MessageReader<Stream>
where
    Stream: std::io::Read,
{
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.terminated {
            return None;
        }

        let res = self.read_message();
        self.terminated = res.is_err();
        Some(res)
    }
}

impl<Stream> core::iter::FusedIterator for MessageReader<Stream> where Stream: std::io::Read {}
