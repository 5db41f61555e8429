//! The `PdfString` carrier type (§4.3): a refcounted byte buffer plus
//! `{isHex, isUnicode}` flags, used to hold literal, hexadecimal and
//! UTF-16BE PDF string payloads.

use std::rc::Rc;

use crate::encoding;
use crate::error::TextDecodeError;

/// How a `PdfString`'s bytes should be rendered on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringFormat {
    Literal,
    Hexadecimal,
}

const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A PDF string value. Bytes are stored exactly as they would appear
/// between the string delimiters (unescaped, un-hex-decoded), always
/// followed by two trailing zero bytes so a zero `pdf_utf16be` code unit
/// terminates the payload regardless of encoding (§3); `is_hex` records
/// which delimiter pair produced the payload.
#[derive(Clone, Debug)]
pub struct PdfString {
    bytes: Rc<[u8]>,
    is_hex: bool,
}

fn terminated(mut payload: Vec<u8>) -> Rc<[u8]> {
    payload.push(0);
    payload.push(0);
    payload.into()
}

impl PdfString {
    /// Constructs a string from a raw payload already in its final PDF
    /// representation (as decoded by a parser), recording whether it
    /// originated from a hexadecimal literal. The two-zero-byte terminator
    /// is appended automatically; `payload` should not include it.
    pub fn from_bytes(payload: impl Into<Vec<u8>>, is_hex: bool) -> Self {
        PdfString { bytes: terminated(payload.into()), is_hex }
    }

    /// Constructs a Unicode string from a Rust `&str`: encodes to UTF-16BE
    /// and prepends the byte-order mark.
    pub fn from_utf8(text: &str) -> Self {
        let mut payload = Vec::with_capacity(2 + text.len() * 2);
        payload.extend_from_slice(&UTF16BE_BOM);
        payload.extend(encoding::encode_utf16_be(text));
        PdfString { bytes: terminated(payload), is_hex: true }
    }

    /// Constructs a string the way `lopdf::common_data_structures::text_string`
    /// does: ASCII input stays in PDFDocEncoding (literal form), anything
    /// else becomes UTF-16BE (hex form).
    pub fn from_text(text: &str) -> Self {
        if text.is_ascii() {
            PdfString::from_bytes(text.as_bytes().to_vec(), false)
        } else {
            PdfString::from_utf8(text)
        }
    }

    /// The payload, excluding the two-zero-byte terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 2]
    }

    pub fn is_hex(&self) -> bool {
        self.is_hex
    }

    /// True iff the stored payload begins with the UTF-16BE BOM `0xFE 0xFF`.
    pub fn is_unicode(&self) -> bool {
        self.as_bytes().starts_with(&UTF16BE_BOM)
    }

    /// Byte length of the payload, excluding the two trailing zero bytes
    /// every `PdfString` carries (the terminator convention described in
    /// §3).
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the payload to a Rust `String`, choosing UTF-16BE, UTF-8 or
    /// PDFDocEncoding by BOM sniffing, per §6 "Unicode marker".
    pub fn to_text_lossy(&self) -> String {
        let bytes = self.as_bytes();
        if let Some(rest) = bytes.strip_prefix(&UTF16BE_BOM) {
            encoding::decode_utf16_be_lossy(rest)
        } else if let Some(rest) = bytes.strip_prefix(&UTF8_BOM) {
            String::from_utf8_lossy(rest).into_owned()
        } else {
            encoding::bytes_to_string(bytes)
        }
    }

    /// Strict counterpart of [`PdfString::to_text_lossy`]: fails on
    /// malformed UTF-16BE or UTF-8 rather than substituting U+FFFD.
    pub fn to_text_strict(&self) -> Result<String, TextDecodeError> {
        let bytes = self.as_bytes();
        if let Some(rest) = bytes.strip_prefix(&UTF16BE_BOM) {
            Ok(encoding::decode_utf16_be_strict(rest)?)
        } else if let Some(rest) = bytes.strip_prefix(&UTF8_BOM) {
            Ok(String::from_utf8(rest.to_vec())?)
        } else {
            Ok(encoding::bytes_to_string(bytes))
        }
    }

    /// Emits the PDF literal (`(...)`) or hexadecimal (`<...>`) syntax for
    /// this string, encrypting the payload first if `encrypt` is given.
    pub fn write(&self, out: &mut Vec<u8>, encrypt: Option<impl Fn(&[u8]) -> Vec<u8>>) {
        let format = if self.is_hex { StringFormat::Hexadecimal } else { StringFormat::Literal };
        let payload = match encrypt {
            Some(f) => f(self.as_bytes()),
            None => self.as_bytes().to_vec(),
        };
        write_string_literal(out, &payload, format);
    }
}

/// Shared by [`PdfString::write`] and [`crate::value::write_value`].
pub fn write_string_literal(out: &mut Vec<u8>, text: &[u8], format: StringFormat) {
    match format {
        StringFormat::Literal => {
            out.push(b'(');
            for &byte in text {
                match byte {
                    b'(' | b')' | b'\\' => {
                        out.push(b'\\');
                        out.push(byte);
                    }
                    b'\r' => out.extend(b"\\r"),
                    _ => out.push(byte),
                }
            }
            out.push(b')');
        }
        StringFormat::Hexadecimal => {
            out.push(b'<');
            for &byte in text {
                out.extend(format!("{byte:02X}").into_bytes());
            }
            out.push(b'>');
        }
    }
}
