//! HPACK: Header Compression for HTTP/2 (RFC 7541)
//!
//! Thin wrapper around `fluke-hpack`. The encoder is owned by the header
//! channel and only reached through its guard; the decoder is used when
//! reading header frames back.

use http::HeaderMap;

use crate::error::{Error, Result};

/// A single header field as it appears in a header block
#[derive(Debug, Clone, PartialEq)]
pub struct H2Header {
    pub name: String,
    pub value: String,
}

impl H2Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// True for `:status`, `:method`, `:scheme`, `:authority`, `:path`
    pub fn is_pseudo(&self) -> bool {
        self.name.starts_with(':')
    }
}

/// Append every field of `headers` after the pseudo-headers already in `fields`.
///
/// `HeaderMap` names are lowercase already. Repeated names become repeated
/// fields in insertion order.
pub fn extend_with_header_map(fields: &mut Vec<H2Header>, headers: &HeaderMap) {
    for name in headers.keys() {
        for value in headers.get_all(name) {
            fields.push(H2Header::new(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            ));
        }
    }
}

/// HPACK decoder for header blocks.
/// Wraps `fluke_hpack::Decoder` which maintains dynamic table state per-session.
pub struct HpackDecoder {
    inner: fluke_hpack::Decoder<'static>,
}

impl std::fmt::Debug for HpackDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HpackDecoder").finish()
    }
}

impl Default for HpackDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackDecoder {
    pub fn new() -> Self {
        Self {
            inner: fluke_hpack::Decoder::new(),
        }
    }

    /// Size the dynamic table to what this side advertised in
    /// SETTINGS_HEADER_TABLE_SIZE.
    pub fn set_max_table_size(&mut self, size: usize) {
        self.inner.set_max_table_size(size);
    }

    /// Decode an HPACK-encoded header block.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<H2Header>> {
        let pairs = self
            .inner
            .decode(data)
            .map_err(|e| Error::Compression(format!("{:?}", e)))?;
        Ok(pairs
            .into_iter()
            .map(|(name, value)| {
                H2Header::new(
                    String::from_utf8_lossy(&name).into_owned(),
                    String::from_utf8_lossy(&value).into_owned(),
                )
            })
            .collect())
    }
}

/// HPACK encoder for header blocks.
/// Wraps `fluke_hpack::Encoder`; every call mutates the session's encoder state,
/// so blocks must be written in the order they were encoded.
pub struct HpackEncoder {
    inner: fluke_hpack::Encoder<'static>,
}

impl std::fmt::Debug for HpackEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HpackEncoder").finish()
    }
}

impl Default for HpackEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackEncoder {
    pub fn new() -> Self {
        Self {
            inner: fluke_hpack::Encoder::new(),
        }
    }

    /// Cap the dynamic table at the peer's SETTINGS_HEADER_TABLE_SIZE.
    /// Entries past the cap are evicted, so later blocks never index them.
    pub fn set_max_table_size(&mut self, size: usize) {
        self.inner.set_max_table_size(size);
    }

    /// Encode headers into an HPACK header block.
    pub fn encode(&mut self, headers: &[H2Header]) -> Vec<u8> {
        let pairs: Vec<(&[u8], &[u8])> = headers
            .iter()
            .map(|h| (h.name.as_bytes(), h.value.as_bytes()))
            .collect();
        self.inner.encode(pairs)
    }
}
