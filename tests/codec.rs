//! End-to-end codec tests against the RFC 7541 Appendix C examples, plus
//! encode/decode round trips.

use protocol_hpack::{encoder, Decoder, DecoderError, HeaderList};

fn decode_block(
    decoder: &mut Decoder,
    data: &[u8],
) -> Result<Vec<(Vec<u8>, Vec<u8>)>, DecoderError> {
    let mut headers = HeaderList::new();
    decoder.decode(data, true, &mut headers)?;
    Ok(headers
        .fields()
        .iter()
        .map(|f| (f.name().to_vec(), f.value().to_vec()))
        .collect())
}

fn pair(name: &str, value: &str) -> (Vec<u8>, Vec<u8>) {
    (name.as_bytes().to_vec(), value.as_bytes().to_vec())
}

#[test]
fn rfc7541_c3_request_sequence() {
    let mut decoder = Decoder::default();

    // C.3.1: first request, :authority becomes dynamic entry 62.
    let block = [
        0x82, 0x86, 0x84, 0x41, 0x0f, 0x77, 0x77, 0x77, 0x2e, 0x65, 0x78, 0x61, 0x6d, 0x70, 0x6c,
        0x65, 0x2e, 0x63, 0x6f, 0x6d,
    ];
    let headers = decode_block(&mut decoder, &block).unwrap();
    assert_eq!(
        headers,
        vec![
            pair(":method", "GET"),
            pair(":scheme", "http"),
            pair(":path", "/"),
            pair(":authority", "www.example.com"),
        ]
    );
    assert_eq!(decoder.dynamic_table().len(), 1);
    assert_eq!(decoder.dynamic_table().size(), 57);

    // C.3.2: second request reuses index 62 and indexes cache-control.
    let block = [
        0x82, 0x86, 0x84, 0xbe, 0x58, 0x08, 0x6e, 0x6f, 0x2d, 0x63, 0x61, 0x63, 0x68, 0x65,
    ];
    let headers = decode_block(&mut decoder, &block).unwrap();
    assert_eq!(
        headers,
        vec![
            pair(":method", "GET"),
            pair(":scheme", "http"),
            pair(":path", "/"),
            pair(":authority", "www.example.com"),
            pair("cache-control", "no-cache"),
        ]
    );
    assert_eq!(decoder.dynamic_table().len(), 2);
    assert_eq!(decoder.dynamic_table().size(), 110);

    // C.3.3: third request over https with a custom header.
    let block = [
        0x82, 0x87, 0x85, 0xbf, 0x40, 0x0a, 0x63, 0x75, 0x73, 0x74, 0x6f, 0x6d, 0x2d, 0x6b, 0x65,
        0x79, 0x0c, 0x63, 0x75, 0x73, 0x74, 0x6f, 0x6d, 0x2d, 0x76, 0x61, 0x6c, 0x75, 0x65,
    ];
    let headers = decode_block(&mut decoder, &block).unwrap();
    assert_eq!(
        headers,
        vec![
            pair(":method", "GET"),
            pair(":scheme", "https"),
            pair(":path", "/index.html"),
            pair(":authority", "www.example.com"),
            pair("custom-key", "custom-value"),
        ]
    );
    assert_eq!(decoder.dynamic_table().len(), 3);
    assert_eq!(decoder.dynamic_table().size(), 164);
}

#[test]
fn rfc7541_c4_huffman_request_sequence() {
    let mut decoder = Decoder::default();

    // C.4.1.
    let block = [
        0x82, 0x86, 0x84, 0x41, 0x8c, 0xf1, 0xe3, 0xc2, 0xe5, 0xf2, 0x3a, 0x6b, 0xa0, 0xab, 0x90,
        0xf4, 0xff,
    ];
    let headers = decode_block(&mut decoder, &block).unwrap();
    assert_eq!(headers[3], pair(":authority", "www.example.com"));
    // Entries are stored decoded; same table state as the raw sequence.
    assert_eq!(decoder.dynamic_table().size(), 57);

    // C.4.2.
    let block = [
        0x82, 0x86, 0x84, 0xbe, 0x58, 0x86, 0xa8, 0xeb, 0x10, 0x64, 0x9c, 0xbf,
    ];
    let headers = decode_block(&mut decoder, &block).unwrap();
    assert_eq!(headers[4], pair("cache-control", "no-cache"));
    assert_eq!(decoder.dynamic_table().size(), 110);
}

#[test]
fn rfc7541_c5_response_sequence_with_eviction() {
    // Responses with the dynamic table limited to 256 octets.
    let mut decoder = Decoder::new(256, 65536);

    // C.5.1.
    let block = [
        0x48, 0x03, 0x33, 0x30, 0x32, 0x58, 0x07, 0x70, 0x72, 0x69, 0x76, 0x61, 0x74, 0x65, 0x61,
        0x1d, 0x4d, 0x6f, 0x6e, 0x2c, 0x20, 0x32, 0x31, 0x20, 0x4f, 0x63, 0x74, 0x20, 0x32, 0x30,
        0x31, 0x33, 0x20, 0x32, 0x30, 0x3a, 0x31, 0x33, 0x3a, 0x32, 0x31, 0x20, 0x47, 0x4d, 0x54,
        0x6e, 0x17, 0x68, 0x74, 0x74, 0x70, 0x73, 0x3a, 0x2f, 0x2f, 0x77, 0x77, 0x77, 0x2e, 0x65,
        0x78, 0x61, 0x6d, 0x70, 0x6c, 0x65, 0x2e, 0x63, 0x6f, 0x6d,
    ];
    let headers = decode_block(&mut decoder, &block).unwrap();
    assert_eq!(
        headers,
        vec![
            pair(":status", "302"),
            pair("cache-control", "private"),
            pair("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
            pair("location", "https://www.example.com"),
        ]
    );
    assert_eq!(decoder.dynamic_table().len(), 4);
    assert_eq!(decoder.dynamic_table().size(), 222);

    // C.5.2: inserting ":status: 307" evicts ":status: 302".
    let block = [0x48, 0x03, 0x33, 0x30, 0x37, 0xc1, 0xc0, 0xbf];
    let headers = decode_block(&mut decoder, &block).unwrap();
    assert_eq!(
        headers,
        vec![
            pair(":status", "307"),
            pair("cache-control", "private"),
            pair("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
            pair("location", "https://www.example.com"),
        ]
    );
    assert_eq!(decoder.dynamic_table().len(), 4);
    assert_eq!(decoder.dynamic_table().size(), 222);
    assert_eq!(decoder.dynamic_table().get(0).unwrap().value(), b"307");
}

#[test]
fn fragmentation_is_invisible() {
    // Decoding octet by octet must produce the same headers and table
    // state as decoding in one call.
    let block = [
        0x82, 0x86, 0x84, 0x41, 0x8c, 0xf1, 0xe3, 0xc2, 0xe5, 0xf2, 0x3a, 0x6b, 0xa0, 0xab, 0x90,
        0xf4, 0xff,
    ];

    let mut whole = Decoder::default();
    let expected = decode_block(&mut whole, &block).unwrap();

    let mut fragmented = Decoder::default();
    let mut headers = HeaderList::new();
    for (i, octet) in block.iter().enumerate() {
        let last = i == block.len() - 1;
        fragmented
            .decode(std::slice::from_ref(octet), last, &mut headers)
            .unwrap();
    }
    let got: Vec<_> = headers
        .fields()
        .iter()
        .map(|f| (f.name().to_vec(), f.value().to_vec()))
        .collect();
    assert_eq!(got, expected);
    assert_eq!(fragmented.dynamic_table().size(), whole.dynamic_table().size());
}

#[test]
fn encoded_block_decodes_back() {
    let mut block = Vec::new();
    block.extend_from_slice(&encoder::encode_status_vec(302));
    block.extend_from_slice(&encoder::encode_literal_with_indexing_vec(
        24,
        b"private",
    ));
    block.extend_from_slice(&encoder::encode_literal_never_indexed_new_name_vec(
        b"authorization",
        b"Bearer token",
    ));
    block.extend_from_slice(&encoder::encode_indexed_vec(2));

    let mut decoder = Decoder::default();
    let headers = decode_block(&mut decoder, &block).unwrap();
    assert_eq!(
        headers,
        vec![
            pair(":status", "302"),
            pair("cache-control", "private"),
            pair("authorization", "Bearer token"),
            pair(":method", "GET"),
        ]
    );
    // Only the incremental-indexing instruction landed in the table.
    assert_eq!(decoder.dynamic_table().len(), 1);
    assert_eq!(decoder.dynamic_table().get(0).unwrap().name(), b"cache-control");
}

#[test]
fn multi_value_encoding_decodes_joined() {
    let mut buf = [0u8; 64];
    // cookie is static index 32.
    let n = encoder::encode_literal_without_indexing_multi_value(
        32,
        &[b"a=1", b"b=2", b"c=3"],
        b"; ",
        &mut buf,
    )
    .unwrap();

    let mut decoder = Decoder::default();
    let headers = decode_block(&mut decoder, &buf[..n]).unwrap();
    assert_eq!(headers, vec![pair("cookie", "a=1; b=2; c=3")]);
}

#[test]
fn size_update_round_trip() {
    let mut buf = [0u8; 8];
    let n = encoder::encode_dynamic_table_size_update(100, &mut buf).unwrap();

    let mut decoder = Decoder::default();
    let mut block = buf[..n].to_vec();
    block.push(0x82);
    decode_block(&mut decoder, &block).unwrap();
    assert_eq!(decoder.dynamic_table().max_size(), 100);
}

#[test]
fn error_is_sticky_across_table_state() {
    // An unknown index after valid inserts still names the bad index.
    let mut decoder = Decoder::default();
    decode_block(&mut decoder, &[0x48, 0x03, 0x33, 0x30, 0x32]).unwrap();
    let err = decode_block(&mut decoder, &[0xbf]).unwrap_err();
    assert_eq!(err, DecoderError::InvalidIndex(63));
}
