//! h2quic-response: the server-side response path for HTTP over a
//! multiplexed stream transport.
//!
//! Every request of a session gets its own data stream for the body, while
//! all response headers and push promises travel as HTTP/2 HEADERS and
//! PUSH_PROMISE frames on one shared header channel, compressed with a
//! single session-wide HPACK encoder.
//!
//! # Features
//!
//! - **Lazy header flush**: headers are buffered until the first
//!   `write_header` or body write, and sent exactly once
//! - **Status-driven bodies**: 1xx, 204 and 304 responses refuse body bytes
//! - **Serialized header channel**: encode + write happen under one lock, so
//!   every block decodes against the encoder state the peer expects
//! - **Server push**: promise frames, a freshly opened stream, and the
//!   handler run recursively against it
//! - **Panic containment**: a panicking handler turns into a 500
//!
//! # Quick Start
//!
//! ```rust
//! use std::io::{self, Write};
//! use std::sync::{Arc, Mutex};
//!
//! use h2quic_response::{
//!     handler_fn, serve_request, DataStream, HeaderBlockReader, ResponseSink, Session,
//!     SessionContext, SessionSettings,
//! };
//! use http::Request;
//!
//! #[derive(Clone, Default)]
//! struct Buf(Arc<Mutex<Vec<u8>>>);
//!
//! impl Write for Buf {
//!     fn write(&mut self, b: &[u8]) -> io::Result<usize> {
//!         self.0.lock().unwrap().extend_from_slice(b);
//!         Ok(b.len())
//!     }
//!     fn flush(&mut self) -> io::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! struct Body(u32, Buf);
//!
//! impl Write for Body {
//!     fn write(&mut self, b: &[u8]) -> io::Result<usize> {
//!         self.1.write(b)
//!     }
//!     fn flush(&mut self) -> io::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! impl DataStream for Body {
//!     fn stream_id(&self) -> u32 {
//!         self.0
//!     }
//!     fn close(&mut self) -> io::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! struct NoPush;
//!
//! impl Session for NoPush {
//!     fn open_stream(&self) -> io::Result<Box<dyn DataStream>> {
//!         Err(io::Error::other("no streams"))
//!     }
//! }
//!
//! let headers = Buf::default();
//! let body = Buf::default();
//! let context = SessionContext::new(
//!     headers.clone(),
//!     SessionSettings::default(),
//!     Arc::new(NoPush),
//!     handler_fn(|w, _req| {
//!         w.write(b"hello").unwrap();
//!     }),
//! );
//!
//! let request = Request::builder().uri("https://example.com/").body(()).unwrap();
//! serve_request(&context, Box::new(Body(5, body.clone())), request).unwrap();
//!
//! let frames = HeaderBlockReader::new()
//!     .process(&headers.0.lock().unwrap())
//!     .unwrap();
//! assert_eq!(frames[0].fields()[0].value, "200");
//! assert_eq!(&*body.0.lock().unwrap(), b"hello");
//! ```
//!
//! # Architecture
//!
//! It provides:
//! - `ResponseWriter` (header buffering, flush, body writes, push)
//! - `HeaderChannel` (the session's serialized HEADERS/PUSH_PROMISE sink)
//! - Frame encoding and decoding for header-carrying frames
//! - HPACK wrapper (header compression via fluke-hpack)
//!
//! It does NOT provide:
//! - Transport sessions, flow control or TLS (you provide the streams)
//! - Request parsing or routing (you provide one handler)

pub mod error;
pub mod frame;
pub mod handler;
pub mod header_channel;
pub mod hpack;
pub mod push;
pub mod response_writer;
pub mod server;
pub mod settings;
pub mod stream;

pub use error::{Error, Result};
pub use frame::{
    create_continuation_frame, create_headers_frames, create_push_promise_frames, flags,
    frame_type, settings_id, DecodedHeaderFrame, FrameDecoder, FrameHeader, HeaderBlockReader,
    HeaderFrameEvent, DEFAULT_MAX_FRAME_SIZE, FRAME_HEADER_SIZE, MAX_ALLOWED_FRAME_SIZE,
    MAX_HEADER_BLOCK_SIZE,
};
pub use handler::{handler_fn, Handler, ResponseSink};
pub use header_channel::{HeaderChannel, HeaderChannelGuard};
pub use hpack::{H2Header, HpackDecoder, HpackEncoder};
pub use push::{Origin, PushOptions};
pub use response_writer::{body_allowed_for_status, writer_for_request, ResponseWriter, WriterState};
pub use server::{serve_request, SessionContext};
pub use settings::SessionSettings;
pub use stream::{DataStream, Session};
