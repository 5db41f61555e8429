use super::{FilterCodec, PredictorParams, SessionState, Sink};
use crate::error::FilterError;

/// ASCII85 (`/ASCII85Decode`, `/A85`): packs 4-byte groups into a base-85
/// tuple of 5 digits offset by `!`; an all-zero full group encodes as the
/// single character `z`. `end` appends the `~>` EOD marker on encode.
pub struct Ascii85Codec {
    state: SessionState,
    sink: Option<Box<dyn Sink>>,
    encoding: bool,
    group: Vec<u8>,
}

impl Ascii85Codec {
    pub fn new() -> Self {
        Ascii85Codec { state: SessionState::new(), sink: None, encoding: false, group: Vec::with_capacity(4) }
    }

    fn encode_group(bytes: &[u8], out: &mut Vec<u8>) {
        if bytes.len() == 4 && bytes == [0, 0, 0, 0] {
            out.push(b'z');
            return;
        }
        let mut padded = [0u8; 4];
        padded[..bytes.len()].copy_from_slice(bytes);
        let tuple = u32::from_be_bytes(padded);
        let mut digits = [0u8; 5];
        let mut value = tuple;
        for slot in digits.iter_mut().rev() {
            *slot = (value % 85) as u8 + b'!';
            value /= 85;
        }
        out.extend_from_slice(&digits[..bytes.len() + 1]);
    }
}

impl FilterCodec for Ascii85Codec {
    fn begin_encode(&mut self, sink: Box<dyn Sink>) -> Result<(), FilterError> {
        self.state.begin(super::Phase::Encoding)?;
        self.sink = Some(sink);
        self.encoding = true;
        self.group.clear();
        Ok(())
    }

    fn begin_decode(&mut self, sink: Box<dyn Sink>, _params: Option<&PredictorParams>) -> Result<(), FilterError> {
        self.state.begin(super::Phase::Decoding)?;
        self.sink = Some(sink);
        self.encoding = false;
        self.group.clear();
        Ok(())
    }

    fn block(&mut self, bytes: &[u8]) -> Result<(), FilterError> {
        self.state.require_open()?;
        if self.encoding {
            let mut out = Vec::new();
            for &byte in bytes {
                self.group.push(byte);
                if self.group.len() == 4 {
                    Self::encode_group(&self.group, &mut out);
                    self.group.clear();
                }
            }
            let sink = self.sink.as_mut().expect("sink set in begin");
            sink.write(&out).map_err(|_| FilterError::InvalidStream("sink rejected ASCII85 output"))?;
            Ok(())
        } else {
            let mut out = Vec::new();
            for &byte in bytes {
                if byte == b'z' {
                    if !self.group.is_empty() {
                        return Err(FilterError::InvalidStream("'z' is not allowed mid-group in ASCII85"));
                    }
                    out.extend_from_slice(&[0, 0, 0, 0]);
                    continue;
                }
                if byte.is_ascii_whitespace() || matches!(byte, 0x00 | 0x0C | 0x08 | 0x7F) {
                    continue;
                }
                if byte == b'~' {
                    // The containing stream reader is responsible for
                    // stripping "~>"; tolerate seeing it here too.
                    break;
                }
                if !(b'!'..=b'u').contains(&byte) {
                    return Err(FilterError::InvalidStream("byte outside ASCII85 alphabet"));
                }
                self.group.push(byte - b'!');
                if self.group.len() == 5 {
                    let buffer = self
                        .group
                        .iter()
                        .try_fold(0u32, |acc, &d| acc.checked_mul(85).and_then(|v| v.checked_add(d as u32)))
                        .ok_or(FilterError::ValueOutOfRange("ASCII85 tuple overflow"))?;
                    out.extend_from_slice(&buffer.to_be_bytes());
                    self.group.clear();
                }
            }
            let sink = self.sink.as_mut().expect("sink set in begin");
            sink.write(&out).map_err(|_| FilterError::InvalidStream("sink rejected ASCII85 output"))?;
            Ok(())
        }
    }

    fn end(&mut self) -> Result<(), FilterError> {
        self.state.require_open()?;
        let sink = self.sink.as_mut().expect("sink set in begin");
        if self.encoding {
            if !self.group.is_empty() {
                let mut out = Vec::new();
                Self::encode_group(&self.group, &mut out);
                sink.write(&out).map_err(|_| FilterError::InvalidStream("sink rejected ASCII85 output"))?;
                self.group.clear();
            }
            sink.write(b"~>").map_err(|_| FilterError::InvalidStream("sink rejected ASCII85 output"))?;
        } else if !self.group.is_empty() {
            let count = self.group.len();
            let mut buffer = self
                .group
                .iter()
                .try_fold(0u32, |acc, &d| acc.checked_mul(85).and_then(|v| v.checked_add(d as u32)))
                .ok_or(FilterError::ValueOutOfRange("ASCII85 tuple overflow"))?;
            for _ in count..5 {
                buffer = buffer.checked_mul(85).and_then(|v| v.checked_add(84)).ok_or(FilterError::ValueOutOfRange(
                    "ASCII85 tuple overflow",
                ))?;
            }
            let bytes = buffer.to_be_bytes();
            sink.write(&bytes[..count - 1]).map_err(|_| FilterError::InvalidStream("sink rejected ASCII85 output"))?;
            self.group.clear();
        }
        self.state.close()?;
        self.sink = None;
        Ok(())
    }

    fn fail(&mut self) {
        self.sink = None;
        self.group.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::super::{decode, encode, FilterKind};

    #[test]
    fn s2_empty_input_encodes_to_eod_only() {
        let encoded = encode(FilterKind::Ascii85, b"").unwrap();
        assert_eq!(encoded, b"~>".to_vec());
    }

    #[test]
    fn s2_all_zero_group_encodes_to_z() {
        let encoded = encode(FilterKind::Ascii85, &[0, 0, 0, 0]).unwrap();
        assert_eq!(encoded, b"z~>".to_vec());
    }

    #[test]
    fn adobe_reference_round_trip() {
        let input = b"Man is distinguished, not only by his reason, but by this singular passion from other animals, which is a lust of the mind, that by a perseverance of delight in the continued and indefatigable generation of knowledge, exceeds the short vehemence of any carnal pleasure.";
        let encoded = encode(FilterKind::Ascii85, input).unwrap();
        let decoded = decode(FilterKind::Ascii85, &encoded, None).unwrap();
        assert_eq!(decoded, input.to_vec());
    }

    #[test]
    fn decode_rejects_overflowing_tuple() {
        let err = decode(FilterKind::Ascii85, b"uuuuu~>", None).unwrap_err();
        assert!(matches!(err, crate::error::FilterError::ValueOutOfRange(_)));
    }
}
