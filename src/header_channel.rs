//! The shared header channel.
//!
//! Every HEADERS and PUSH_PROMISE frame of a session goes through one
//! `HeaderChannel`. The HPACK encoder lives behind the same lock as the
//! channel's sink, so a frame is encoded and written in a single critical
//! section and blocks hit the wire in the order the encoder produced them.
//!
//! A sink error leaves the peer's decoder out of step with the encoder (and
//! may leave a torn frame on the wire), so the first one fails the channel
//! for the rest of the session.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::frame::{
    create_headers_frames, create_push_promise_frames, DEFAULT_MAX_FRAME_SIZE, MAX_ALLOWED_FRAME_SIZE,
};
use crate::hpack::{H2Header, HpackEncoder};
use crate::settings::SessionSettings;

struct ChannelState {
    sink: Box<dyn Write + Send>,
    encoder: HpackEncoder,
    max_frame_size: u32,
    failed: bool,
}

impl ChannelState {
    fn ensure_usable(&self) -> Result<()> {
        if self.failed {
            return Err(Error::Transport(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "header channel failed on an earlier frame",
            )));
        }
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let written = self.sink.write_all(frame).and_then(|()| self.sink.flush());
        if let Err(err) = written {
            warn!(error = %err, "header channel write failed, closing channel");
            self.failed = true;
            return Err(Error::Transport(err));
        }
        Ok(())
    }
}

/// Cloneable handle to a session's header channel.
#[derive(Clone)]
pub struct HeaderChannel {
    state: Arc<Mutex<ChannelState>>,
}

impl fmt::Debug for HeaderChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderChannel").finish()
    }
}

impl HeaderChannel {
    /// Wrap the channel's sink, sizing the encoder's dynamic table and the
    /// frame split from the peer's settings.
    pub fn new(sink: impl Write + Send + 'static, settings: &SessionSettings) -> Self {
        let mut encoder = HpackEncoder::new();
        encoder.set_max_table_size(settings.header_table_size as usize);
        Self {
            state: Arc::new(Mutex::new(ChannelState {
                sink: Box::new(sink),
                encoder,
                max_frame_size: settings
                    .max_frame_size
                    .clamp(DEFAULT_MAX_FRAME_SIZE, MAX_ALLOWED_FRAME_SIZE),
                failed: false,
            })),
        }
    }

    /// True once a write to the sink has failed
    pub fn is_failed(&self) -> bool {
        self.lock().state.failed
    }

    /// Take exclusive access to the channel and its encoder.
    pub fn lock(&self) -> HeaderChannelGuard<'_> {
        // A panic while holding the lock can only happen between whole
        // encode calls, so the state is still usable.
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        HeaderChannelGuard { state }
    }
}

/// Exclusive access to the header channel. Dropping it releases the channel.
pub struct HeaderChannelGuard<'a> {
    state: MutexGuard<'a, ChannelState>,
}

impl HeaderChannelGuard<'_> {
    /// Encode `fields` and write them as a HEADERS frame on `stream_id`.
    pub fn write_headers(&mut self, stream_id: u32, fields: &[H2Header]) -> Result<()> {
        let state = &mut *self.state;
        state.ensure_usable()?;
        let block = state.encoder.encode(fields);
        let frame = create_headers_frames(stream_id, &block, state.max_frame_size, false);
        debug!(stream_id, block_len = block.len(), "writing HEADERS frame");
        state.write_frame(&frame)
    }

    /// Encode `fields` and write them as a PUSH_PROMISE frame on `stream_id`
    /// promising `promised_stream_id`.
    pub fn write_push_promise(
        &mut self,
        stream_id: u32,
        promised_stream_id: u32,
        fields: &[H2Header],
    ) -> Result<()> {
        let state = &mut *self.state;
        state.ensure_usable()?;
        let block = state.encoder.encode(fields);
        let frame = create_push_promise_frames(stream_id, promised_stream_id, &block, state.max_frame_size);
        debug!(stream_id, promised_stream_id, block_len = block.len(), "writing PUSH_PROMISE frame");
        state.write_frame(&frame)
    }
}
