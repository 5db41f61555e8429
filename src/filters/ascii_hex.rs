use super::{FilterCodec, PredictorParams, SessionState, Sink};
use crate::error::FilterError;

/// ASCIIHex (`/ASCIIHexDecode`, `/AHx`): each byte becomes two uppercase
/// hex digits on encode; on decode, whitespace is skipped and an odd
/// trailing nibble is completed with an implicit low nibble of 0 at `end`.
pub struct AsciiHexCodec {
    state: SessionState,
    sink: Option<Box<dyn Sink>>,
    encoding: bool,
    pending_nibble: Option<u8>,
}

impl AsciiHexCodec {
    pub fn new() -> Self {
        AsciiHexCodec { state: SessionState::new(), sink: None, encoding: false, pending_nibble: None }
    }

    fn hex_value(byte: u8) -> Option<u8> {
        match byte {
            b'0'..=b'9' => Some(byte - b'0'),
            b'A'..=b'F' => Some(byte - b'A' + 10),
            b'a'..=b'f' => Some(byte - b'a' + 10),
            _ => None,
        }
    }

    fn is_whitespace(byte: u8) -> bool {
        matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
    }
}

impl FilterCodec for AsciiHexCodec {
    fn begin_encode(&mut self, sink: Box<dyn Sink>) -> Result<(), FilterError> {
        self.state.begin(super::Phase::Encoding)?;
        self.sink = Some(sink);
        self.encoding = true;
        self.pending_nibble = None;
        Ok(())
    }

    fn begin_decode(&mut self, sink: Box<dyn Sink>, _params: Option<&PredictorParams>) -> Result<(), FilterError> {
        self.state.begin(super::Phase::Decoding)?;
        self.sink = Some(sink);
        self.encoding = false;
        self.pending_nibble = None;
        Ok(())
    }

    fn block(&mut self, bytes: &[u8]) -> Result<(), FilterError> {
        self.state.require_open()?;
        let sink = self.sink.as_mut().expect("sink set in begin");
        if self.encoding {
            let mut out = Vec::with_capacity(bytes.len() * 2);
            for &byte in bytes {
                out.extend(format!("{byte:02X}").into_bytes());
            }
            sink.write(&out).map_err(|_| FilterError::InvalidStream("sink rejected ASCIIHex output"))?;
        } else {
            let mut out = Vec::with_capacity(bytes.len() / 2 + 1);
            for &byte in bytes {
                if Self::is_whitespace(byte) {
                    continue;
                }
                if byte == b'>' {
                    break;
                }
                let nibble = Self::hex_value(byte).ok_or(FilterError::InvalidStream("non-hex byte in ASCIIHex stream"))?;
                match self.pending_nibble.take() {
                    Some(high) => out.push((high << 4) | nibble),
                    None => self.pending_nibble = Some(nibble),
                }
            }
            sink.write(&out).map_err(|_| FilterError::InvalidStream("sink rejected ASCIIHex output"))?;
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), FilterError> {
        self.state.require_open()?;
        if !self.encoding {
            if let Some(high) = self.pending_nibble.take() {
                let sink = self.sink.as_mut().expect("sink set in begin");
                sink.write(&[high << 4]).map_err(|_| FilterError::InvalidStream("sink rejected ASCIIHex output"))?;
            }
        }
        self.state.close()?;
        self.sink = None;
        Ok(())
    }

    fn fail(&mut self) {
        self.sink = None;
        self.pending_nibble = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::{decode, encode, FilterKind};

    #[test]
    fn s1_ascii_hex_round_trip() {
        let encoded = encode(FilterKind::AsciiHex, b"Hello").unwrap();
        assert_eq!(encoded, b"48656C6C6F".to_vec());
        let decoded = decode(FilterKind::AsciiHex, &encoded, None).unwrap();
        assert_eq!(decoded, b"Hello".to_vec());
    }

    #[test]
    fn tolerates_whitespace_and_trailing_eod() {
        let decoded = decode(FilterKind::AsciiHex, b"48 65 6C\n6C6F>", None).unwrap();
        assert_eq!(decoded, b"Hello".to_vec());
    }

    #[test]
    fn odd_trailing_nibble_fills_low_nibble_with_zero() {
        let decoded = decode(FilterKind::AsciiHex, b"48656C6C6F4", None).unwrap();
        assert_eq!(decoded, b"Hello\x40".to_vec());
    }

    #[test]
    fn non_hex_byte_is_invalid_stream() {
        let err = decode(FilterKind::AsciiHex, b"zz", None).unwrap_err();
        assert!(matches!(err, crate::error::FilterError::InvalidStream(_)));
    }
}
