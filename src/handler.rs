//! Application-facing traits: the handler and the response sink it writes to.

use std::sync::Arc;

use http::{HeaderMap, Request, StatusCode};

use crate::error::Result;
use crate::push::PushOptions;

/// What a handler sees of a response.
pub trait ResponseSink {
    /// Header fields to send with the response. Changes after the header
    /// frame has been flushed are not sent.
    fn header_mut(&mut self) -> &mut HeaderMap;

    /// Send the header frame with `status`. Only the first call has an effect.
    fn write_header(&mut self, status: StatusCode) -> Result<()>;

    /// Write body bytes, sending a 200 header frame first if none was sent.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Promise `target` to the client and serve it on a new stream.
    fn push(&mut self, target: &str, options: Option<&PushOptions>) -> Result<()>;

    /// Send the header frame if needed and flush buffered body bytes.
    fn flush(&mut self) -> Result<()>;
}

/// Serves one request (primary or pushed) by writing to a `ResponseSink`.
pub trait Handler: Send + Sync {
    fn serve(&self, response: &mut dyn ResponseSink, request: &Request<()>);
}

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseSink, &Request<()>) + Send + Sync,
{
    fn serve(&self, response: &mut dyn ResponseSink, request: &Request<()>) {
        self(response, request)
    }
}

/// Wrap a closure as a shareable handler.
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(&mut dyn ResponseSink, &Request<()>) + Send + Sync + 'static,
{
    Arc::new(f)
}
