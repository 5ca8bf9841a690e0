//! Asynchronous message reader for framed telemetry streams
//!
//! This module provides the async reader for receiving telemetry messages
//! from a server. Messages arrive as length-prefixed frames carrying JSON
//! payloads and are yielded one at a time, either through
//! [`MessageReader::read_message`] or the `futures::Stream` implementation.
//!
//! For synchronous/blocking operations, see the `blocking` submodule.
//!
//! # Example
//!
//! ```no_run
//! use gps_socket::client::MessageReader;
//! use futures::StreamExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = MessageReader::connect("127.0.0.1:9165").await?;
//!
//! while let Some(msg) = reader.next().await {
//!     println!("Telemetry: {}", msg?);
//! }
//! # Ok(())
//! # }
//! ```

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use tracing::debug;

use crate::{
    Result,
    error::GpsSocketError,
    protocol::{DEFAULT_CHUNK_SIZE, FrameDecoder, GpsJsonDecodeAsync, Message, decode_payload},
};

/// Blocking (synchronous) reader implementation
pub mod blocking;

/// Configuration options for message readers
///
/// Shared by the async reader and [`blocking::MessageReader`].
///
/// # Example
/// ```
/// use gps_socket::client::ReaderOptions;
///
/// let opts = ReaderOptions::default().chunk_size(512).nodelay(false);
/// ```
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    chunk_size: usize,
    nodelay: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
            nodelay: true,
        }
    }
}

impl ReaderOptions {
    /// Sets the maximum number of bytes requested per receive
    ///
    /// Values below 1 are raised to 1.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Enables or disables `TCP_NODELAY` on connections opened by `connect`
    pub fn nodelay(mut self, enable: bool) -> Self {
        self.nodelay = enable;
        self
    }
}

/// Async reader turning a byte stream into decoded messages
///
/// The reader owns the receive buffer of one connection and polls the
/// underlying stream only when no complete frame is buffered.
///
/// # Type Parameters
/// * `Stream` - The underlying async I/O stream type (e.g., TcpStream)
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
    Stream: futures_io::AsyncRead + Unpin,
{
    /// Polls until one complete frame is buffered and returns its payload text
    fn poll_frame(&mut self, cx: &mut Context<'_>) -> Poll<Result<String>> {
        loop {
            match self.decoder.next_frame() {
                Ok(Some(payload)) => return Poll::Ready(Ok(payload)),
                Ok(None) => {}
                Err(err) => return Poll::Ready(Err(err)),
            }

            let filled = self
                .stream
                .poll_fill_decoder(cx, &mut self.decoder, &mut self.chunk);
            let received = match std::task::ready!(filled) {
                Ok(received) => received,
                Err(err) => return Poll::Ready(Err(err)),
            };

            if received == 0 {
                let pending = self.decoder.buffered();
                debug!(pending, "connection closed by peer");
                return Poll::Ready(Err(GpsSocketError::ConnectionClosed { pending }));
            }
        }
    }

    /// Waits for the next complete frame and returns its payload text
    ///
    /// # Errors
    /// * `ConnectionClosed` - The peer closed the connection before a frame completed
    /// * `Io` - The receive failed
    /// * `Decode` - The payload is not valid UTF-8
    pub async fn read_frame(&mut self) -> Result<String> {
        futures_util::future::poll_fn(|cx| self.poll_frame(cx)).await
    }

    /// Waits for the next complete frame and returns it as a JSON value
    pub async fn read_message(&mut self) -> Result<Message> {
        self.read_message_as().await
    }

    /// Waits for the next complete frame and deserializes it into `T`
    pub async fn read_message_as<T>(&mut self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let payload = self.read_frame().await?;
        decode_payload(payload)
    }
}

#[cfg(feature = "tokio")]
impl MessageReader<tokio_util::compat::Compat<tokio::net::TcpStream>> {
    /// Connects to a telemetry server over TCP asynchronously
    ///
    /// # Arguments
    /// * `addr` - Socket address of the server (e.g., "127.0.0.1:9165")
    pub async fn connect<A: tokio::net::ToSocketAddrs>(addr: A) -> Result<Self> {
        Self::connect_with(addr, ReaderOptions::default()).await
    }

    /// Connects to a telemetry server over TCP asynchronously with the given options
    pub async fn connect_with<A: tokio::net::ToSocketAddrs>(
        addr: A,
        opts: ReaderOptions,
    ) -> Result<Self> {
        use tokio_util::compat::TokioAsyncReadCompatExt;

        let stream = tokio::net::TcpStream::connect(addr)
            .await
            .map_err(GpsSocketError::Io)?;
        stream
            .set_nodelay(opts.nodelay)
            .map_err(GpsSocketError::Io)?;
        debug!(peer = ?stream.peer_addr().ok(), "connected to telemetry server");
        Ok(Self::with_options(stream.compat(), opts))
    }
}

/// Yields one decoded message per frame
///
/// The first error, including the peer closing the connection, is yielded
/// once; the stream then ends.
impl<Stream> futures_util::Stream for MessageReader<Stream>
where
    Stream: futures_io::AsyncRead + Unpin,
{
    type Item = Result<Message>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(None);
        }

        let res = std::task::ready!(this.poll_frame(cx)).and_then(decode_payload::<Message>);
        this.terminated = res.is_err();
        Poll::Ready(Some(res))
    }
}

impl<Stream> futures_util::stream::FusedStream for MessageReader<Stream>
where
    Stream: futures_io::AsyncRead + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.terminated
    }
}
