//! HTTP/2 header-frame codec for the shared header channel.
//!
//! Builds HEADERS, PUSH_PROMISE and CONTINUATION frames bit-exactly and
//! parses them back. Only frames that carry header blocks are interpreted;
//! everything else on the channel is skipped.
//!
//! Reference: RFC 7540 Sections 4.1, 6.2, 6.6, 6.10

use crate::error::{Error, Result};
use crate::hpack::{H2Header, HpackDecoder};

/// Size of the fixed frame header
pub const FRAME_HEADER_SIZE: usize = 9;

/// Smallest SETTINGS_MAX_FRAME_SIZE a peer may advertise (also the default)
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16_384;

/// Largest SETTINGS_MAX_FRAME_SIZE allowed (2^24 - 1)
pub const MAX_ALLOWED_FRAME_SIZE: u32 = 16_777_215;

/// Maximum accumulated header block size (256 KB).
/// Prevents unbounded memory growth from malicious/buggy CONTINUATION floods.
pub const MAX_HEADER_BLOCK_SIZE: usize = 256 * 1024;

/// HTTP/2 frame types (RFC 7540 Section 6)
pub mod frame_type {
    pub const DATA: u8 = 0x0;
    pub const HEADERS: u8 = 0x1;
    pub const PRIORITY: u8 = 0x2;
    pub const RST_STREAM: u8 = 0x3;
    pub const SETTINGS: u8 = 0x4;
    pub const PUSH_PROMISE: u8 = 0x5;
    pub const PING: u8 = 0x6;
    pub const GOAWAY: u8 = 0x7;
    pub const WINDOW_UPDATE: u8 = 0x8;
    pub const CONTINUATION: u8 = 0x9;
}

/// HTTP/2 frame flags
pub mod flags {
    pub const END_STREAM: u8 = 0x1;
    pub const END_HEADERS: u8 = 0x4;
    pub const PADDED: u8 = 0x8;
    pub const PRIORITY: u8 = 0x20;
}

/// HTTP/2 SETTINGS identifiers (RFC 7540 Section 6.5.2)
pub mod settings_id {
    pub const HEADER_TABLE_SIZE: u16 = 0x1;
    pub const ENABLE_PUSH: u16 = 0x2;
    pub const MAX_CONCURRENT_STREAMS: u16 = 0x3;
    pub const INITIAL_WINDOW_SIZE: u16 = 0x4;
    pub const MAX_FRAME_SIZE: u16 = 0x5;
    pub const MAX_HEADER_LIST_SIZE: u16 = 0x6;
}

/// A parsed HTTP/2 frame header (9 bytes)
#[derive(Debug, Clone)]
pub struct FrameHeader {
    pub length: u32,      // 24 bits
    pub frame_type: u8,
    pub flags: u8,
    pub stream_id: u32,   // 31 bits (high bit reserved)
}

impl FrameHeader {
    /// Parse a 9-byte frame header
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < FRAME_HEADER_SIZE {
            return None;
        }

        let length = ((data[0] as u32) << 16) | ((data[1] as u32) << 8) | (data[2] as u32);
        let stream_id = u32::from_be_bytes([data[5], data[6], data[7], data[8]]) & 0x7FFFFFFF;

        Some(Self {
            length,
            frame_type: data[3],
            flags: data[4],
            stream_id,
        })
    }

    /// Serialize into `out`
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push((self.length >> 16) as u8);
        out.push((self.length >> 8) as u8);
        out.push(self.length as u8);
        out.push(self.frame_type);
        out.push(self.flags);
        out.extend_from_slice(&(self.stream_id & 0x7FFFFFFF).to_be_bytes());
    }

    /// Total frame size including header
    pub fn total_size(&self) -> usize {
        FRAME_HEADER_SIZE + self.length as usize
    }

    pub fn is_end_stream(&self) -> bool {
        self.flags & flags::END_STREAM != 0
    }

    pub fn is_end_headers(&self) -> bool {
        self.flags & flags::END_HEADERS != 0
    }
}

/// Build a HEADERS frame for `stream_id`, followed by CONTINUATION frames if
/// the block does not fit in `max_frame_size`.
pub fn create_headers_frames(
    stream_id: u32,
    header_block: &[u8],
    max_frame_size: u32,
    end_stream: bool,
) -> Vec<u8> {
    let max = max_frame_size.clamp(DEFAULT_MAX_FRAME_SIZE, MAX_ALLOWED_FRAME_SIZE) as usize;
    let first_len = header_block.len().min(max);
    let (first, rest) = header_block.split_at(first_len);

    let mut flags_byte = 0x0;
    if end_stream {
        flags_byte |= flags::END_STREAM;
    }
    if rest.is_empty() {
        flags_byte |= flags::END_HEADERS;
    }

    let mut out = Vec::with_capacity(FRAME_HEADER_SIZE + header_block.len());
    FrameHeader {
        length: first.len() as u32,
        frame_type: frame_type::HEADERS,
        flags: flags_byte,
        stream_id,
    }
    .write_to(&mut out);
    out.extend_from_slice(first);
    append_continuations(&mut out, stream_id, rest, max);
    out
}

/// Build a PUSH_PROMISE frame on `stream_id` promising `promised_stream_id`,
/// followed by CONTINUATION frames if the block does not fit.
pub fn create_push_promise_frames(
    stream_id: u32,
    promised_stream_id: u32,
    header_block: &[u8],
    max_frame_size: u32,
) -> Vec<u8> {
    let max = max_frame_size.clamp(DEFAULT_MAX_FRAME_SIZE, MAX_ALLOWED_FRAME_SIZE) as usize;
    // The promised stream id takes 4 bytes of the first frame's payload
    let first_len = header_block.len().min(max - 4);
    let (first, rest) = header_block.split_at(first_len);

    let flags_byte = if rest.is_empty() { flags::END_HEADERS } else { 0x0 };

    let mut out = Vec::with_capacity(FRAME_HEADER_SIZE + 4 + header_block.len());
    FrameHeader {
        length: (4 + first.len()) as u32,
        frame_type: frame_type::PUSH_PROMISE,
        flags: flags_byte,
        stream_id,
    }
    .write_to(&mut out);
    out.extend_from_slice(&(promised_stream_id & 0x7FFFFFFF).to_be_bytes());
    out.extend_from_slice(first);
    append_continuations(&mut out, stream_id, rest, max);
    out
}

fn append_continuations(out: &mut Vec<u8>, stream_id: u32, mut rest: &[u8], max: usize) {
    while !rest.is_empty() {
        let len = rest.len().min(max);
        let (chunk, tail) = rest.split_at(len);
        out.extend_from_slice(&create_continuation_frame(stream_id, chunk, tail.is_empty()));
        rest = tail;
    }
}

/// Create a CONTINUATION frame to continue a header block
/// end_headers: true if this is the final frame in the header block sequence
pub fn create_continuation_frame(stream_id: u32, payload: &[u8], end_headers: bool) -> Vec<u8> {
    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    FrameHeader {
        length: payload.len() as u32,
        frame_type: frame_type::CONTINUATION,
        flags: if end_headers { flags::END_HEADERS } else { 0x0 },
        stream_id,
    }
    .write_to(&mut frame);
    frame.extend_from_slice(payload);
    frame
}

/// Header-carrying frames read back from a header channel
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderFrameEvent {
    /// Complete HEADERS block (after CONTINUATION assembly)
    Headers {
        stream_id: u32,
        header_block: Vec<u8>,
        end_stream: bool,
    },
    /// Complete PUSH_PROMISE block (after CONTINUATION assembly)
    PushPromise {
        stream_id: u32,
        promised_stream_id: u32,
        header_block: Vec<u8>,
    },
}

#[derive(Debug)]
enum PendingBlock {
    Headers { end_stream: bool },
    PushPromise { promised_stream_id: u32 },
}

/// Incremental parser for the header channel.
///
/// Feed raw bytes, get back complete header blocks. CONTINUATION frames are
/// reassembled; PADDED and PRIORITY fields are stripped.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Buffer for incomplete frames
    buffer: Vec<u8>,
    /// Stream with a header block waiting for CONTINUATION + END_HEADERS
    pending_stream: Option<u32>,
    pending_kind: Option<PendingBlock>,
    pending_block: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process incoming data and return parsed events.
    pub fn process(&mut self, data: &[u8]) -> Result<Vec<HeaderFrameEvent>> {
        self.buffer.extend_from_slice(data);
        let mut events = Vec::new();

        loop {
            let header = match FrameHeader::parse(&self.buffer) {
                Some(h) => h,
                None => break,
            };

            let total_size = header.total_size();
            if self.buffer.len() < total_size {
                break;
            }

            // Take the whole frame, leaving the remainder buffered
            let remainder = self.buffer.split_off(total_size);
            let mut payload = std::mem::replace(&mut self.buffer, remainder);
            payload.drain(..FRAME_HEADER_SIZE);

            if let Some(event) = self.parse_frame(&header, payload)? {
                events.push(event);
            }
        }

        Ok(events)
    }

    /// True if a header block is waiting for CONTINUATION frames
    pub fn has_pending_block(&self) -> bool {
        self.pending_stream.is_some()
    }

    fn parse_frame(&mut self, header: &FrameHeader, payload: Vec<u8>) -> Result<Option<HeaderFrameEvent>> {
        if let Some(pending) = self.pending_stream {
            if header.frame_type != frame_type::CONTINUATION {
                return Err(Error::Protocol(format!(
                    "expected CONTINUATION for stream {} but got frame type {:#x}",
                    pending, header.frame_type
                )));
            }
        }

        match header.frame_type {
            frame_type::HEADERS => {
                let block = strip_headers_payload(header, payload)?;
                let kind = PendingBlock::Headers { end_stream: header.is_end_stream() };
                self.start_block(header, kind, block)
            }
            frame_type::PUSH_PROMISE => {
                let mut block = strip_padding(header, payload, "PUSH_PROMISE")?;
                if block.len() < 4 {
                    return Err(Error::Protocol("PUSH_PROMISE frame missing promised stream ID".to_string()));
                }
                let promised_stream_id = u32::from_be_bytes([block[0], block[1], block[2], block[3]]) & 0x7FFFFFFF;
                block.drain(..4);
                self.start_block(header, PendingBlock::PushPromise { promised_stream_id }, block)
            }
            frame_type::CONTINUATION => {
                let pending = match self.pending_stream {
                    Some(s) => s,
                    None => {
                        return Err(Error::Protocol(format!(
                            "Unexpected CONTINUATION frame for stream {}",
                            header.stream_id
                        )))
                    }
                };
                if pending != header.stream_id {
                    return Err(Error::Protocol(format!(
                        "CONTINUATION for stream {} but pending headers on stream {}",
                        header.stream_id, pending
                    )));
                }
                let new_size = self.pending_block.len() + payload.len();
                if new_size > MAX_HEADER_BLOCK_SIZE {
                    self.clear_pending();
                    return Err(Error::Protocol(format!(
                        "Header block too large ({} bytes, max {})",
                        new_size, MAX_HEADER_BLOCK_SIZE
                    )));
                }
                self.pending_block.extend_from_slice(&payload);
                if header.is_end_headers() {
                    Ok(self.finish_block(header.stream_id))
                } else {
                    Ok(None)
                }
            }
            // DATA, SETTINGS and friends carry no header block
            _ => Ok(None),
        }
    }

    fn start_block(
        &mut self,
        header: &FrameHeader,
        kind: PendingBlock,
        block: Vec<u8>,
    ) -> Result<Option<HeaderFrameEvent>> {
        if block.len() > MAX_HEADER_BLOCK_SIZE {
            return Err(Error::Protocol(format!(
                "Header block too large ({} bytes, max {})",
                block.len(),
                MAX_HEADER_BLOCK_SIZE
            )));
        }
        self.pending_stream = Some(header.stream_id);
        self.pending_kind = Some(kind);
        self.pending_block = block;
        if header.is_end_headers() {
            Ok(self.finish_block(header.stream_id))
        } else {
            Ok(None)
        }
    }

    fn finish_block(&mut self, stream_id: u32) -> Option<HeaderFrameEvent> {
        let header_block = std::mem::take(&mut self.pending_block);
        let kind = self.pending_kind.take();
        self.pending_stream = None;
        kind.map(|kind| match kind {
            PendingBlock::Headers { end_stream } => HeaderFrameEvent::Headers {
                stream_id,
                header_block,
                end_stream,
            },
            PendingBlock::PushPromise { promised_stream_id } => HeaderFrameEvent::PushPromise {
                stream_id,
                promised_stream_id,
                header_block,
            },
        })
    }

    fn clear_pending(&mut self) {
        self.pending_stream = None;
        self.pending_kind = None;
        self.pending_block.clear();
    }
}

/// Remove the PADDED prefix/suffix from a payload.
fn strip_padding(header: &FrameHeader, mut payload: Vec<u8>, kind: &str) -> Result<Vec<u8>> {
    if header.flags & flags::PADDED == 0 {
        return Ok(payload);
    }
    if payload.is_empty() {
        return Err(Error::Protocol(format!("PADDED {} frame with no payload", kind)));
    }
    let pad_length = payload[0] as usize;
    if pad_length >= payload.len() {
        return Err(Error::Protocol(format!("Invalid padding length in {} frame", kind)));
    }
    payload.truncate(payload.len() - pad_length);
    payload.remove(0);
    Ok(payload)
}

/// Extract HEADERS payload, handling PADDED and PRIORITY flags.
fn strip_headers_payload(header: &FrameHeader, payload: Vec<u8>) -> Result<Vec<u8>> {
    let mut payload = strip_padding(header, payload, "HEADERS")?;
    if header.flags & flags::PRIORITY != 0 {
        if payload.len() < 5 {
            return Err(Error::Protocol("PRIORITY HEADERS frame with insufficient data".to_string()));
        }
        // Stream dependency (4 bytes) + weight (1 byte)
        payload.drain(..5);
    }
    Ok(payload)
}

/// A decoded header-carrying frame
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedHeaderFrame {
    Headers {
        stream_id: u32,
        fields: Vec<H2Header>,
        end_stream: bool,
    },
    PushPromise {
        stream_id: u32,
        promised_stream_id: u32,
        fields: Vec<H2Header>,
    },
}

impl DecodedHeaderFrame {
    pub fn fields(&self) -> &[H2Header] {
        match self {
            Self::Headers { fields, .. } | Self::PushPromise { fields, .. } => fields,
        }
    }
}

/// Reads a header channel the way a client does: frames are reassembled and
/// every block is decoded with one session-wide HPACK decoder, in order.
#[derive(Debug, Default)]
pub struct HeaderBlockReader {
    frames: FrameDecoder,
    hpack: HpackDecoder,
}

impl HeaderBlockReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, data: &[u8]) -> Result<Vec<DecodedHeaderFrame>> {
        self.frames
            .process(data)?
            .into_iter()
            .map(|event| match event {
                HeaderFrameEvent::Headers { stream_id, header_block, end_stream } => {
                    Ok(DecodedHeaderFrame::Headers {
                        stream_id,
                        fields: self.hpack.decode(&header_block)?,
                        end_stream,
                    })
                }
                HeaderFrameEvent::PushPromise { stream_id, promised_stream_id, header_block } => {
                    Ok(DecodedHeaderFrame::PushPromise {
                        stream_id,
                        promised_stream_id,
                        fields: self.hpack.decode(&header_block)?,
                    })
                }
            })
            .collect()
    }
}
