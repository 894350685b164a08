//! Session-wide negotiated settings.
//!
//! Built once per session (optionally updated from the peer's SETTINGS
//! entries during setup) and then shared read-only by every writer.

use crate::error::{Error, Result};
use crate::frame::{settings_id, DEFAULT_MAX_FRAME_SIZE, MAX_ALLOWED_FRAME_SIZE};

/// Default SETTINGS_HEADER_TABLE_SIZE (RFC 7540 Section 6.5.2)
pub const DEFAULT_HEADER_TABLE_SIZE: u32 = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Peer accepts PUSH_PROMISE frames
    pub enable_push: bool,
    /// Largest frame payload the peer accepts; longer header blocks use CONTINUATION
    pub max_frame_size: u32,
    /// Dynamic table size the peer's decoder uses
    pub header_table_size: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            enable_push: true,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            header_table_size: DEFAULT_HEADER_TABLE_SIZE,
        }
    }
}

impl SessionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enable_push(mut self, enable_push: bool) -> Self {
        self.enable_push = enable_push;
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: u32) -> Self {
        self.max_frame_size = max_frame_size.clamp(DEFAULT_MAX_FRAME_SIZE, MAX_ALLOWED_FRAME_SIZE);
        self
    }

    /// Apply one (identifier, value) pair from a peer SETTINGS frame.
    /// Unknown identifiers are ignored (RFC 7540 Section 6.5.2).
    pub fn apply(&mut self, id: u16, value: u32) -> Result<()> {
        match id {
            settings_id::HEADER_TABLE_SIZE => self.header_table_size = value,
            settings_id::ENABLE_PUSH => match value {
                0 => self.enable_push = false,
                1 => self.enable_push = true,
                _ => return Err(Error::Protocol(format!("invalid ENABLE_PUSH value {}", value))),
            },
            settings_id::MAX_FRAME_SIZE => {
                if !(DEFAULT_MAX_FRAME_SIZE..=MAX_ALLOWED_FRAME_SIZE).contains(&value) {
                    return Err(Error::Protocol(format!("invalid MAX_FRAME_SIZE value {}", value)));
                }
                self.max_frame_size = value;
            }
            _ => {}
        }
        Ok(())
    }
}
