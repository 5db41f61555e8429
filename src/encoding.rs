//! PDFDocEncoding (PDF 1.6 Annex D) and UTF-8 ↔ UTF-16BE conversion helpers
//! used by [`crate::pdf_string::PdfString`].

/// Maps a PDFDocEncoding byte to its Unicode scalar value, or `None` if the
/// byte is unassigned in the table.
pub fn pdf_doc_encoding_to_char(byte: u8) -> Option<char> {
    PDF_DOC_ENCODING[byte as usize].and_then(char::from_u32)
}

/// Maps a Unicode scalar value back to a PDFDocEncoding byte, if representable.
pub fn char_to_pdf_doc_encoding(ch: char) -> Option<u8> {
    let code = ch as u32;
    PDF_DOC_ENCODING
        .iter()
        .position(|&c| c == Some(code))
        .map(|pos| pos as u8)
}

pub fn bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().filter_map(|&b| pdf_doc_encoding_to_char(b)).collect()
}

pub fn string_to_bytes(text: &str) -> Vec<u8> {
    text.chars().filter_map(char_to_pdf_doc_encoding).collect()
}

/// Encodes `text` as UTF-16BE, without a BOM (callers prepend the BOM for
/// `PdfString` construction as needed).
pub fn encode_utf16_be(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

/// Decodes UTF-16BE bytes (no BOM expected) in strict mode: malformed
/// surrogate pairs are rejected.
pub fn decode_utf16_be_strict(bytes: &[u8]) -> Result<String, std::string::FromUtf16Error> {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| if c.len() == 2 { u16::from_be_bytes([c[0], c[1]]) } else { u16::from_be_bytes([c[0], 0]) })
        .collect();
    String::from_utf16(&units)
}

/// Decodes UTF-16BE bytes leniently, substituting U+FFFD for unpaired
/// surrogates per the WHATWG replacement rule.
pub fn decode_utf16_be_lossy(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| if c.len() == 2 { u16::from_be_bytes([c[0], c[1]]) } else { u16::from_be_bytes([c[0], 0]) })
        .collect();
    String::from_utf16_lossy(&units)
}

/// The PDFDocEncoding table (PDF 1.6 Annex D.2): Unicode scalar value per
/// byte, or `None` where the code point is unassigned. Printable ASCII
/// (0x20..=0x7E) and the upper Latin-1 range (0xA1..=0xFF) coincide with
/// ISO 8859-1; the 0x18..=0x1F and 0x80..=0x9F ranges carry the PDF-specific
/// typographic substitutions, and 0xA0 is the Euro sign.
#[rustfmt::skip]
static PDF_DOC_ENCODING: [Option<u32>; 256] = {
    let mut table = [None; 256];
    // 0x20..=0x7E: printable ASCII is its own code point.
    let mut i = 0x20u32;
    while i <= 0x7E {
        table[i as usize] = Some(i);
        i += 1;
    }
    table[0x18] = Some(0x02D8); // breve
    table[0x19] = Some(0x02C7); // caron
    table[0x1A] = Some(0x02C6); // circumflex
    table[0x1B] = Some(0x02D9); // dotaccent
    table[0x1C] = Some(0x02DD); // hungarumlaut
    table[0x1D] = Some(0x02DB); // ogonek
    table[0x1E] = Some(0x02DA); // ring
    table[0x1F] = Some(0x02DC); // tilde
    table[0x80] = Some(0x2022); // bullet
    table[0x81] = Some(0x2020); // dagger
    table[0x82] = Some(0x2021); // daggerdbl
    table[0x83] = Some(0x2026); // ellipsis
    table[0x84] = Some(0x2014); // emdash
    table[0x85] = Some(0x2013); // endash
    table[0x86] = Some(0x0192); // florin
    table[0x87] = Some(0x2044); // fraction
    table[0x88] = Some(0x2039); // guilsinglleft
    table[0x89] = Some(0x203A); // guilsinglright
    table[0x8A] = Some(0x2212); // minus
    table[0x8B] = Some(0x2030); // perthousand
    table[0x8C] = Some(0x201E); // quotedblbase
    table[0x8D] = Some(0x201C); // quotedblleft
    table[0x8E] = Some(0x201D); // quotedblright
    table[0x8F] = Some(0x2018); // quoteleft
    table[0x90] = Some(0x2019); // quoteright
    table[0x91] = Some(0x201A); // quotesinglbase
    table[0x92] = Some(0x2122); // trademark
    table[0x93] = Some(0xFB01); // fi
    table[0x94] = Some(0xFB02); // fl
    table[0x95] = Some(0x0141); // Lslash
    table[0x96] = Some(0x0152); // OE
    table[0x97] = Some(0x0160); // Scaron
    table[0x98] = Some(0x0178); // Ydieresis
    table[0x99] = Some(0x017D); // Zcaron
    table[0x9A] = Some(0x0131); // dotlessi
    table[0x9B] = Some(0x0142); // lslash
    table[0x9C] = Some(0x0153); // oe
    table[0x9D] = Some(0x0161); // scaron
    table[0x9E] = Some(0x017E); // zcaron
    table[0xA0] = Some(0x20AC); // Euro
    let mut i = 0xA1u32;
    while i <= 0xFF {
        table[i as usize] = Some(i);
        i += 1;
    }
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_round_trips() {
        let text = "text";
        let bytes = string_to_bytes(text);
        assert_eq!(bytes, b"text".to_vec());
        assert_eq!(bytes_to_string(&bytes), text);
    }

    #[test]
    fn per_mille_round_trips() {
        let text = "text\u{2030}";
        let bytes = string_to_bytes(text);
        assert_eq!(bytes, vec![b't', b'e', b'x', b't', 0x8B]);
        assert_eq!(bytes_to_string(&bytes), text);
    }

    #[test]
    fn utf16_be_round_trips() {
        let text = "\u{0442}\u{0435}\u{0441}\u{0442}";
        let encoded = encode_utf16_be(text);
        assert_eq!(decode_utf16_be_strict(&encoded).unwrap(), text);
        assert_eq!(decode_utf16_be_lossy(&encoded), text);
    }

    #[test]
    fn lossy_decode_substitutes_unpaired_surrogate() {
        let bytes = [0xD8, 0x00]; // high surrogate with no low surrogate
        assert_eq!(decode_utf16_be_lossy(&bytes), "\u{FFFD}");
    }
}
