use pdf_codec_core::filters::{decode, encode, FilterKind, PredictorParams};

#[test]
fn s1_ascii_hex_round_trip() {
    let encoded = encode(FilterKind::AsciiHex, b"Hello").unwrap();
    assert_eq!(encoded, b"48656C6C6F".to_vec());
    assert_eq!(decode(FilterKind::AsciiHex, &encoded, None).unwrap(), b"Hello".to_vec());
    assert_eq!(decode(FilterKind::AsciiHex, b"48 65 6C\n6C6F>", None).unwrap(), b"Hello".to_vec());
}

#[test]
fn s2_ascii85_empty_and_all_zero_group() {
    assert_eq!(encode(FilterKind::Ascii85, b"").unwrap(), b"~>".to_vec());
    assert_eq!(encode(FilterKind::Ascii85, &[0, 0, 0, 0]).unwrap(), b"z~>".to_vec());
}

#[test]
fn s3_lzw_adobe_annex_h_example() {
    let input = [0x80, 0x0B, 0x60, 0x50, 0x22, 0x0C, 0x0C, 0x85, 0x01];
    let decoded = decode(FilterKind::Lzw, &input, None).unwrap();
    assert_eq!(decoded, b"-----A---B".to_vec());
}

#[test]
fn s6_png_up_predictor() {
    let raw = vec![2u8, 1, 2, 3, 2, 1, 2, 3];
    let encoded = encode(FilterKind::Flate, &raw).unwrap();
    let params = PredictorParams { predictor: 12, colors: 1, bits_per_component: 8, columns: 3, early_change: 1 };
    let decoded = decode(FilterKind::Flate, &encoded, Some(&params)).unwrap();
    assert_eq!(decoded, vec![1, 2, 3, 2, 4, 6]);
}

/// Universal property 1: `decode(encode(b)) == b` for every filter that
/// implements both directions.
#[test]
fn round_trips_hold_for_arbitrary_input() {
    let input = b"the quick brown fox jumps over the lazy dog 0123456789 \x00\x01\xff".repeat(37);
    for kind in [FilterKind::AsciiHex, FilterKind::Ascii85, FilterKind::Flate] {
        let encoded = encode(kind, &input).unwrap();
        let decoded = decode(kind, &encoded, None).unwrap();
        assert_eq!(decoded, input, "round trip failed for {kind:?}");
    }
}

#[test]
fn run_length_decodes_but_does_not_encode() {
    let packed = [254u8, b'a', 255, b'b', 2, b'c', b'b', b'c', 254, b'a', 128];
    let decoded = decode(FilterKind::RunLength, &packed, None).unwrap();
    assert_eq!(decoded, b"aaabbcbcaaa".to_vec());
    assert!(encode(FilterKind::RunLength, b"x").is_err());
}

#[test]
fn unsupported_name_tags_report_unsupported_on_decode() {
    assert!(decode(FilterKind::Dct, b"x", None).is_err());
    assert!(decode(FilterKind::Jbig2, b"x", None).is_err());
}
