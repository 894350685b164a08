//! Session-scoped state and the dispatch boundary for primary requests.

use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use http::{Request, StatusCode};
use tracing::{debug, warn};

use crate::error::Result;
use crate::handler::Handler;
use crate::header_channel::HeaderChannel;
use crate::response_writer::writer_for_request;
use crate::settings::SessionSettings;
use crate::stream::{DataStream, Session};

/// Everything a session's writers share: the header channel (and its lock),
/// the negotiated settings, the transport session and the handler.
pub struct SessionContext {
    header_channel: HeaderChannel,
    settings: SessionSettings,
    session: Arc<dyn Session>,
    handler: Arc<dyn Handler>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("header_channel", &self.header_channel)
            .field("settings", &self.settings)
            .finish()
    }
}

impl SessionContext {
    /// `header_sink` is the session's header stream. The header channel over
    /// it is sized from `settings`.
    pub fn new(
        header_sink: impl Write + Send + 'static,
        settings: SessionSettings,
        session: Arc<dyn Session>,
        handler: Arc<dyn Handler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            header_channel: HeaderChannel::new(header_sink, &settings),
            settings,
            session,
            handler,
        })
    }

    pub fn header_channel(&self) -> &HeaderChannel {
        &self.header_channel
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn session(&self) -> &dyn Session {
        &*self.session
    }

    pub fn handler(&self) -> &dyn Handler {
        &*self.handler
    }
}

/// Run the handler for `request` received on `stream`.
///
/// A panicking handler is contained here: the response becomes a 500 if no
/// header frame went out yet. Otherwise a 200 header frame is sent if the
/// handler wrote nothing. The data stream is closed either way; the first
/// error from those closing steps is returned.
pub fn serve_request(
    context: &Arc<SessionContext>,
    stream: Box<dyn DataStream>,
    request: Request<()>,
) -> Result<()> {
    let mut writer = writer_for_request(Arc::clone(context), stream, &request);
    let stream_id = writer.stream_id();
    debug!(stream_id, method = %request.method(), uri = %request.uri(), "serving request");

    let handler = context.handler();
    let outcome = catch_unwind(AssertUnwindSafe(|| handler.serve(&mut writer, &request)));
    match outcome {
        Ok(()) => writer.finish(StatusCode::OK),
        Err(_) => {
            warn!(stream_id, "handler panicked");
            writer.finish(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
