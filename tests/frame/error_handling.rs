//! Tests for malformed header-channel frames

use h2quic_response::{Error, FrameDecoder, HeaderBlockReader};

#[test]
fn test_unexpected_continuation_returns_error() {
    let mut decoder = FrameDecoder::new();
    let data = vec![0, 0, 2, 9, 4, 0, 0, 0, 1, 0x82, 0x86];

    let err = decoder.process(&data).unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
    assert!(err.to_string().contains("Unexpected CONTINUATION"), "Error: {}", err);
}

#[test]
fn test_continuation_wrong_stream_returns_error() {
    let mut decoder = FrameDecoder::new();

    let mut data = vec![0, 0, 2, 1, 0, 0, 0, 0, 1];
    data.extend_from_slice(&[0x82, 0x86]);
    data.extend_from_slice(&[0, 0, 1, 9, 4, 0, 0, 0, 3]);
    data.extend_from_slice(&[0x84]);

    let err = decoder.process(&data).unwrap_err().to_string();
    assert!(err.contains("CONTINUATION for stream 3"), "Error: {}", err);
    assert!(err.contains("pending headers on stream 1"), "Error: {}", err);
}

#[test]
fn test_push_promise_too_short_returns_error() {
    let mut decoder = FrameDecoder::new();
    // PUSH_PROMISE with a 2-byte payload
    let data = vec![0, 0, 2, 5, 4, 0, 0, 0, 1, 0, 0];

    let err = decoder.process(&data).unwrap_err();
    assert!(err.to_string().contains("promised stream ID"), "Error: {}", err);
}

#[test]
fn test_invalid_padding_returns_error() {
    let mut decoder = FrameDecoder::new();
    // HEADERS, PADDED | END_HEADERS, pad length 9 > payload
    let data = vec![0, 0, 2, 1, 0x0c, 0, 0, 0, 1, 9, 0x88];

    let err = decoder.process(&data).unwrap_err();
    assert!(err.to_string().contains("padding"), "Error: {}", err);
}

#[test]
fn test_priority_headers_too_short_returns_error() {
    let mut decoder = FrameDecoder::new();
    // HEADERS, PRIORITY | END_HEADERS, only 3 payload bytes
    let data = vec![0, 0, 3, 1, 0x24, 0, 0, 0, 1, 0, 0, 0];

    assert!(decoder.process(&data).is_err());
}

#[test]
fn test_bad_hpack_block_is_compression_error() {
    let mut reader = HeaderBlockReader::new();
    let data = vec![0, 0, 1, 1, 4, 0, 0, 0, 1, 0xBF];

    let err = reader.process(&data).unwrap_err();
    assert!(matches!(err, Error::Compression(_)), "Error: {}", err);
}
