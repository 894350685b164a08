//! Transport contracts: per-request data streams and the session that opens them.

use std::io;

/// A transport stream carrying one response body.
///
/// Writes are blocking and pass bytes through untouched. A stream that the
/// transport has reset or half-closed reports `is_closed`, so body writes can
/// fail promptly instead of blocking.
pub trait DataStream: io::Write + Send {
    /// Transport-assigned identifier
    fn stream_id(&self) -> u32;

    fn is_closed(&self) -> bool {
        false
    }

    /// Close the sending side once the response is complete
    fn close(&mut self) -> io::Result<()>;
}

/// The transport session, as far as server push is concerned.
pub trait Session: Send + Sync {
    /// Open a new server-initiated stream for a push
    fn open_stream(&self) -> io::Result<Box<dyn DataStream>>;
}
