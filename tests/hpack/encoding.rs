//! Tests for HPACK encoding of response and promise fields

use h2quic_response::{H2Header, HpackDecoder, HpackEncoder};

#[test]
fn test_encode_status_only() {
    let mut encoder = HpackEncoder::new();
    let mut decoder = HpackDecoder::new();
    let encoded = encoder.encode(&[H2Header::new(":status", "418")]);
    let decoded = decoder.decode(&encoded).unwrap();
    assert_eq!(decoded, vec![H2Header::new(":status", "418")]);
}

#[test]
fn test_encode_promise_pseudo_headers() {
    let mut encoder = HpackEncoder::new();
    let mut decoder = HpackDecoder::new();
    let headers = vec![
        H2Header::new(":method", "GET"),
        H2Header::new(":scheme", "https"),
        H2Header::new(":authority", "www.example.com"),
        H2Header::new(":path", "/push_example"),
    ];
    let encoded = encoder.encode(&headers);
    let decoded = decoder.decode(&encoded).unwrap();
    assert_eq!(decoded, headers);
}

#[test]
fn test_repeated_names_survive_encoding() {
    let mut encoder = HpackEncoder::new();
    let mut decoder = HpackDecoder::new();
    let headers = vec![
        H2Header::new(":status", "200"),
        H2Header::new("set-cookie", "test1=1; Max-Age=7200; path=/"),
        H2Header::new("set-cookie", "test2=2; Max-Age=7200; path=/"),
    ];
    let decoded = decoder.decode(&encoder.encode(&headers)).unwrap();
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded[1].value, "test1=1; Max-Age=7200; path=/");
    assert_eq!(decoded[2].value, "test2=2; Max-Age=7200; path=/");
}

#[test]
fn test_session_encoder_decoder_stay_in_step() {
    // One encoder and one decoder across many blocks, like a header channel
    let mut encoder = HpackEncoder::new();
    let mut decoder = HpackDecoder::new();
    for i in 0..50 {
        let headers = vec![
            H2Header::new(":status", "200"),
            H2Header::new("x-request-id", format!("req-{}", i)),
            H2Header::new("content-type", "text/html"),
        ];
        let decoded = decoder.decode(&encoder.encode(&headers)).unwrap();
        assert_eq!(decoded, headers);
    }
}

#[test]
fn test_h2header_new() {
    let header = H2Header::new("content-type", "text/html");
    assert_eq!(header.name, "content-type");
    assert_eq!(header.value, "text/html");
    assert!(!header.is_pseudo());
}
