//! Tests for HPACK decoding of response and promise blocks

use h2quic_response::{Error, H2Header, HpackDecoder};

#[test]
fn test_decode_indexed_statuses() {
    let mut decoder = HpackDecoder::new();

    // Static table 8..=14: 200 204 206 304 400 404 500
    let statuses = ["200", "204", "206", "304", "400", "404", "500"];
    for (i, status) in statuses.iter().enumerate() {
        let headers = decoder.decode(&[0x88 + i as u8]).unwrap();
        assert_eq!(headers, vec![H2Header::new(":status", *status)]);
    }
}

#[test]
fn test_decode_status_with_literal_field() {
    let mut decoder = HpackDecoder::new();

    let data = [
        0x8c, // :status 400
        0x5c, // Literal with indexing, name index 28 = content-length
        0x02, // Value length: 2
        b'4', b'2',
    ];
    let headers = decoder.decode(&data).unwrap();

    assert_eq!(headers.len(), 2);
    assert_eq!(headers[0].value, "400");
    assert_eq!(headers[1].name, "content-length");
    assert_eq!(headers[1].value, "42");
}

#[test]
fn test_decode_reuses_dynamic_table_across_blocks() {
    let mut decoder = HpackDecoder::new();

    decoder.decode(&[0x88, 0x5c, 0x02, b'4', b'2']).unwrap();
    // 0xBE = index 62, the first dynamic table entry
    let headers = decoder.decode(&[0x88, 0xBE]).unwrap();

    assert_eq!(headers[1], H2Header::new("content-length", "42"));
}

#[test]
fn test_decode_promise_fields() {
    let mut decoder = HpackDecoder::new();

    let mut data = vec![
        0x82, // :method GET
        0x87, // :scheme https
        0x41, // Literal with indexing, name index 1 = :authority
        0x0F, // Value length: 15
    ];
    data.extend_from_slice(b"www.example.com");
    data.extend_from_slice(&[0x44, 0x0D]); // :path, value length 13
    data.extend_from_slice(b"/push_example");

    let headers = decoder.decode(&data).unwrap();

    assert_eq!(
        headers,
        vec![
            H2Header::new(":method", "GET"),
            H2Header::new(":scheme", "https"),
            H2Header::new(":authority", "www.example.com"),
            H2Header::new(":path", "/push_example"),
        ]
    );
    assert!(headers.iter().all(|h| h.is_pseudo()));
}

#[test]
fn test_decode_literal_without_indexing_new_name() {
    let mut decoder = HpackDecoder::new();

    let mut data = vec![0x00, 0x05];
    data.extend_from_slice(b"x-tag");
    data.push(0x03);
    data.extend_from_slice(b"abc");

    let headers = decoder.decode(&data).unwrap();
    assert_eq!(headers, vec![H2Header::new("x-tag", "abc")]);

    // Not added to the dynamic table
    assert!(decoder.decode(&[0xBE]).is_err());
}

#[test]
fn test_decode_out_of_range_index_is_error() {
    let mut decoder = HpackDecoder::new();
    let err = decoder.decode(&[0xBF]).unwrap_err();
    assert!(matches!(err, Error::Compression(_)));
}

#[test]
fn test_decode_truncated_literal_is_error() {
    let mut decoder = HpackDecoder::new();
    // Value length says 5 but only 2 bytes follow
    let err = decoder.decode(&[0x5c, 0x05, b'4', b'2']).unwrap_err();
    assert!(matches!(err, Error::Compression(_)), "Error: {}", err);
}
