//! Response writer: one per request/data-stream pair.
//!
//! Header fields are buffered until the first `write_header` or `write`,
//! then flushed as a single HEADERS frame on the shared header channel.
//! Body bytes go straight to the writer's own data stream and never touch
//! the header channel's lock.

use std::io::{self, Write};
use std::sync::Arc;

use http::{HeaderMap, Request, StatusCode};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::handler::ResponseSink;
use crate::hpack::{extend_with_header_map, H2Header};
use crate::push::{promise_request, Origin, PushOptions};
use crate::server::SessionContext;
use crate::stream::DataStream;

/// Where a writer is in its lifecycle. There is no way back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing sent yet; headers can still change
    Idle,
    /// The HEADERS frame was sent with this status
    HeadersFlushed(StatusCode),
    /// Writing the HEADERS frame failed; the data stream is never written
    Failed,
}

/// 1xx, 204 and 304 responses carry no body (RFC 7230 Section 3.3.3)
pub fn body_allowed_for_status(status: StatusCode) -> bool {
    !(status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED)
}

pub struct ResponseWriter {
    context: Arc<SessionContext>,
    stream: Box<dyn DataStream>,
    stream_id: u32,
    header: HeaderMap,
    state: WriterState,
    origin: Origin,
    pushed: bool,
}

impl std::fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("stream_id", &self.stream_id)
            .field("state", &self.state)
            .field("origin", &self.origin)
            .field("pushed", &self.pushed)
            .finish()
    }
}

impl ResponseWriter {
    /// Writer for a request received on `stream`.
    pub fn new(context: Arc<SessionContext>, stream: Box<dyn DataStream>, origin: Origin) -> Self {
        let stream_id = stream.stream_id();
        Self {
            context,
            stream,
            stream_id,
            header: HeaderMap::new(),
            state: WriterState::Idle,
            origin,
            pushed: false,
        }
    }

    fn new_pushed(context: Arc<SessionContext>, stream: Box<dyn DataStream>, origin: Origin) -> Self {
        Self {
            pushed: true,
            ..Self::new(context, stream, origin)
        }
    }

    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn headers_written(&self) -> bool {
        self.state != WriterState::Idle
    }

    /// Header fields to send. Changes after the flush are not sent.
    pub fn header_mut(&mut self) -> &mut HeaderMap {
        &mut self.header
    }

    /// Flush the HEADERS frame with `status`. Later calls are no-ops.
    ///
    /// If the transport write fails the writer moves to `Failed` rather than
    /// back to `Idle`: the encoder state has already moved on, so the frame
    /// must not be re-sent, and no body may follow it.
    pub fn write_header(&mut self, status: StatusCode) -> Result<()> {
        if self.headers_written() {
            trace!(stream_id = self.stream_id, %status, "header already written, ignoring");
            return Ok(());
        }

        let mut fields = vec![H2Header::new(":status", status.as_str())];
        extend_with_header_map(&mut fields, &self.header);

        debug!(stream_id = self.stream_id, %status, "responding");
        let sent = self.context.header_channel().lock().write_headers(self.stream_id, &fields);
        self.state = match sent {
            Ok(()) => WriterState::HeadersFlushed(status),
            Err(_) => WriterState::Failed,
        };
        sent
    }

    /// Write body bytes, flushing a 200 header frame first if none was sent.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let status = match self.state {
            WriterState::Idle => {
                self.write_header(StatusCode::OK)?;
                StatusCode::OK
            }
            WriterState::HeadersFlushed(status) => status,
            WriterState::Failed => return Err(headers_not_delivered()),
        };
        if !body_allowed_for_status(status) {
            return Err(Error::BodyNotAllowed);
        }
        if self.stream.is_closed() {
            return Err(Error::StreamClosed);
        }
        trace!(stream_id = self.stream_id, len = buf.len(), "writing body");
        self.stream.write(buf).map_err(Error::Transport)
    }

    /// Send the header frame if needed and flush the data stream.
    pub fn flush(&mut self) -> Result<()> {
        self.write_header(StatusCode::OK)?;
        if self.state == WriterState::Failed {
            return Err(headers_not_delivered());
        }
        self.stream.flush().map_err(Error::Transport)
    }

    /// Promise `target` and serve it on a freshly opened stream.
    ///
    /// The handler for the pushed resource runs on this thread before `push`
    /// returns. Only validation and transport failures up to the promise
    /// frame are reported; the pushed handler's outcome is not. A panic in
    /// the pushed handler is not caught here: the pushed stream is finished
    /// with 500 and closed as the panic unwinds to the dispatch boundary.
    pub fn push(&mut self, target: &str, options: Option<&PushOptions>) -> Result<()> {
        if !self.context.settings().enable_push {
            return Err(Error::PushDisabled);
        }
        if self.pushed {
            return Err(Error::RecursivePush);
        }
        let promised = promise_request(&self.origin, target, options)?;

        // Open the stream before promising it, so a promise never names a
        // stream that does not exist.
        let mut stream = self.context.session().open_stream().map_err(Error::StreamAllocation)?;
        let promised_stream_id = stream.stream_id();

        let sent = self
            .context
            .header_channel()
            .lock()
            .write_push_promise(self.stream_id, promised_stream_id, &promised.fields);
        if let Err(err) = sent {
            if let Err(close_err) = stream.close() {
                warn!(promised_stream_id, error = %close_err, "failed to close unpromised push stream");
            }
            return Err(err);
        }
        debug!(
            stream_id = self.stream_id,
            promised_stream_id,
            path = promised.request.uri().path(),
            "pushing"
        );

        let context = Arc::clone(&self.context);
        let mut pushed = PushedResponse {
            writer: ResponseWriter::new_pushed(Arc::clone(&context), stream, self.origin.clone()),
            finished: false,
        };
        context.handler().serve(&mut pushed.writer, &promised.request);
        pushed.finish(StatusCode::OK);
        Ok(())
    }

    /// Send a header frame with `status` unless one was already sent, then
    /// close the data stream. Returns the first error of the two steps.
    pub(crate) fn finish(&mut self, status: StatusCode) -> Result<()> {
        let headers = self.write_header(status);
        let closed = self.stream.close().map_err(Error::Transport);
        headers.and(closed)
    }
}

fn headers_not_delivered() -> Error {
    Error::Transport(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "response headers were not delivered",
    ))
}

/// Writer for a pushed stream. If the pushed handler unwinds out of `push`,
/// dropping this finishes the stream with 500 and closes it.
struct PushedResponse {
    writer: ResponseWriter,
    finished: bool,
}

impl PushedResponse {
    fn finish(&mut self, status: StatusCode) {
        self.finished = true;
        if let Err(err) = self.writer.finish(status) {
            warn!(promised_stream_id = self.writer.stream_id, error = %err, "failed to finish pushed response");
        }
    }
}

impl Drop for PushedResponse {
    fn drop(&mut self) {
        if !self.finished {
            warn!(promised_stream_id = self.writer.stream_id, "pushed handler panicked");
            self.finish(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

impl ResponseSink for ResponseWriter {
    fn header_mut(&mut self) -> &mut HeaderMap {
        ResponseWriter::header_mut(self)
    }

    fn write_header(&mut self, status: StatusCode) -> Result<()> {
        ResponseWriter::write_header(self, status)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        ResponseWriter::write(self, buf)
    }

    fn push(&mut self, target: &str, options: Option<&PushOptions>) -> Result<()> {
        ResponseWriter::push(self, target, options)
    }

    fn flush(&mut self) -> Result<()> {
        ResponseWriter::flush(self)
    }
}

impl io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ResponseWriter::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        ResponseWriter::flush(self).map_err(io::Error::from)
    }
}

/// Build a writer for `request` arriving on `stream`, deriving the push origin
/// from the request.
pub fn writer_for_request(
    context: Arc<SessionContext>,
    stream: Box<dyn DataStream>,
    request: &Request<()>,
) -> ResponseWriter {
    ResponseWriter::new(context, stream, Origin::from_request(request))
}
