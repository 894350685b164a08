//! Tests for frame header and header-block parsing

use h2quic_response::{flags, frame_type, FrameDecoder, FrameHeader, HeaderFrameEvent};

#[test]
fn test_frame_header_parse() {
    let header = FrameHeader::parse(&[0, 0, 5, 1, 5, 0, 0, 0, 1]).unwrap();
    assert_eq!(header.length, 5);
    assert_eq!(header.frame_type, frame_type::HEADERS);
    assert_eq!(header.stream_id, 1);
    assert!(header.is_end_stream());
    assert!(header.is_end_headers());
    assert_eq!(header.total_size(), 14);
}

#[test]
fn test_frame_header_roundtrip() {
    let header = FrameHeader {
        length: 0x012345,
        frame_type: frame_type::PUSH_PROMISE,
        flags: flags::END_HEADERS,
        stream_id: 0x01020304,
    };
    let mut out = Vec::new();
    header.write_to(&mut out);
    assert_eq!(out, vec![0x01, 0x23, 0x45, 0x05, 0x04, 0x01, 0x02, 0x03, 0x04]);
}

#[test]
fn test_fragmented_frames() {
    let mut decoder = FrameDecoder::new();
    let frame = [0, 0, 1, 1, 4, 0, 0, 0, 1, 0x88];

    assert!(decoder.process(&frame[..5]).unwrap().is_empty());
    assert!(decoder.process(&frame[5..9]).unwrap().is_empty());
    assert_eq!(decoder.process(&frame[9..]).unwrap().len(), 1);
}

#[test]
fn test_multiple_frames_in_single_process() {
    let mut decoder = FrameDecoder::new();
    let mut data = vec![0, 0, 1, 1, 4, 0, 0, 0, 1, 0x88];
    data.extend_from_slice(&[0, 0, 5, 5, 4, 0, 0, 0, 1, 0, 0, 0, 2, 0x82]);
    data.extend_from_slice(&[0, 0, 1, 1, 4, 0, 0, 0, 3, 0x89]);

    let events = decoder.process(&data).unwrap();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[1], HeaderFrameEvent::PushPromise { promised_stream_id: 2, .. }));
}

#[test]
fn test_headers_with_padding_and_priority() {
    let mut decoder = FrameDecoder::new();
    // PADDED | PRIORITY | END_HEADERS: pad 2, priority 5 bytes, block 1 byte, padding 2
    let data = vec![
        0, 0, 9, 1, 0x2c, 0, 0, 0, 1, // header
        2, // pad length
        0, 0, 0, 0, 16, // stream dependency + weight
        0x88, // block
        0, 0, // padding
    ];

    let events = decoder.process(&data).unwrap();
    match &events[0] {
        HeaderFrameEvent::Headers { header_block, .. } => assert_eq!(header_block, &[0x88]),
        other => panic!("Expected Headers event, got {:?}", other),
    }
}

#[test]
fn test_data_and_unknown_frames_skipped() {
    let mut decoder = FrameDecoder::new();
    let mut data = vec![0, 0, 3, 0, 1, 0, 0, 0, 1, b'a', b'b', b'c'];
    data.extend_from_slice(&[0, 0, 1, 0xEE, 0, 0, 0, 0, 1, 0]);

    assert!(decoder.process(&data).unwrap().is_empty());
}
