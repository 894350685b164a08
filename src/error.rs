//! Error types for the response path

use std::io;

use http::{HeaderName, Method};

/// Result type alias for response-path operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A body write was attempted under a status that forbids one (1xx, 204, 304)
    #[error("request method or response status code does not allow body")]
    BodyNotAllowed,

    /// The data stream was closed or reset by the transport
    #[error("stream closed")]
    StreamClosed,

    /// Writing to the header channel or a data stream failed
    #[error("transport write failed: {0}")]
    Transport(#[source] io::Error),

    /// The session could not open a stream for a push
    #[error("could not open push stream: {0}")]
    StreamAllocation(#[source] io::Error),

    #[error("push is disabled for this session")]
    PushDisabled,

    #[error("cannot push from a pushed stream")]
    RecursivePush,

    #[error("push method {0} must be GET or HEAD")]
    InvalidPushMethod(Method),

    #[error("invalid push target: {0}")]
    InvalidPushTarget(String),

    #[error("header {0} is not allowed in a push promise")]
    ForbiddenPushHeader(HeaderName),

    /// HPACK decode failure
    #[error("HPACK decode error: {0}")]
    Compression(String),

    /// Malformed frame or setting
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Transport(e) => e,
            closed @ Error::StreamClosed => io::Error::new(io::ErrorKind::BrokenPipe, closed),
            other => io::Error::other(other),
        }
    }
}
