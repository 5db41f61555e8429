//! The filter framework (§4.1): a tagged variant over the PDF stream
//! filters, dispatched to per-codec session structs that share a begin/
//! block/end lifecycle.

mod ascii85;
mod ascii_hex;
mod flate;
mod lzw;
mod predictor;
mod run_length;

pub use predictor::{decode_png_predictor, decode_tiff_predictor, PredictorParams};

use crate::error::FilterError;

/// The working size of a filter's internal scratch buffer (§3).
pub const SCRATCH_BUFFER_SIZE: usize = 16 * 1024;

/// A tagged variant over the ten filter names the PDF 1.6 spec recognizes.
/// Only the first five implement encode/decode; the rest are recognized
/// name-tags that report *unsupported*.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    AsciiHex,
    Ascii85,
    Lzw,
    Flate,
    RunLength,
    CcittFax,
    Jbig2,
    Dct,
    Jpx,
    Crypt,
}

impl FilterKind {
    /// Resolves a `/Filter` name, accepting both the long and short forms
    /// listed in §6.
    pub fn from_name(name: &[u8]) -> Option<FilterKind> {
        Some(match name {
            b"ASCIIHexDecode" | b"AHx" => FilterKind::AsciiHex,
            b"ASCII85Decode" | b"A85" => FilterKind::Ascii85,
            b"LZWDecode" | b"LZW" => FilterKind::Lzw,
            b"FlateDecode" | b"Fl" => FilterKind::Flate,
            b"RunLengthDecode" | b"RL" => FilterKind::RunLength,
            b"CCITTFaxDecode" | b"CCF" => FilterKind::CcittFax,
            b"JBIG2Decode" => FilterKind::Jbig2,
            b"DCTDecode" | b"DCT" => FilterKind::Dct,
            b"JPXDecode" => FilterKind::Jpx,
            b"Crypt" => FilterKind::Crypt,
            _ => return None,
        })
    }

    pub fn long_name(self) -> &'static [u8] {
        match self {
            FilterKind::AsciiHex => b"ASCIIHexDecode",
            FilterKind::Ascii85 => b"ASCII85Decode",
            FilterKind::Lzw => b"LZWDecode",
            FilterKind::Flate => b"FlateDecode",
            FilterKind::RunLength => b"RunLengthDecode",
            FilterKind::CcittFax => b"CCITTFaxDecode",
            FilterKind::Jbig2 => b"JBIG2Decode",
            FilterKind::Dct => b"DCTDecode",
            FilterKind::Jpx => b"JPXDecode",
            FilterKind::Crypt => b"Crypt",
        }
    }
}

/// Consumed by a filter session to deliver decoded/encoded bytes
/// downstream (§6 "Sink interface").
pub trait Sink {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()>;
}

impl Sink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Adapts any `std::io::Write` into a [`Sink`].
pub struct WriteSink<W>(pub W);

impl<W: std::io::Write> Sink for WriteSink<W> {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.0.write_all(bytes)
    }
}

/// A cheaply-cloneable `Vec<u8>` sink used to buffer a codec's output when
/// the caller wants the bytes back afterward (the one-shot `encode`/
/// `decode` helpers below).
#[derive(Clone, Default)]
struct VecSink(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

impl Sink for VecSink {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.0.borrow_mut().extend_from_slice(bytes);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Encoding,
    Decoding,
    Closed,
}

/// Tracks the Idle/Encoding/Decoding/Closed lifecycle shared by every
/// codec so each one doesn't have to reimplement "no operation after
/// Closed" and "double-close is an error".
#[derive(Debug)]
struct SessionState {
    phase: Phase,
}

impl SessionState {
    fn new() -> Self {
        SessionState { phase: Phase::Idle }
    }

    fn begin(&mut self, phase: Phase) -> Result<(), FilterError> {
        if self.phase == Phase::Closed {
            return Err(FilterError::InvalidStream("session already closed"));
        }
        self.phase = phase;
        Ok(())
    }

    fn require_open(&self) -> Result<(), FilterError> {
        if self.phase == Phase::Closed || self.phase == Phase::Idle {
            return Err(FilterError::InvalidStream("operation on a session that is not open"));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), FilterError> {
        if self.phase == Phase::Closed {
            return Err(FilterError::InvalidStream("double close"));
        }
        self.phase = Phase::Closed;
        Ok(())
    }
}

/// The capability set every filter implements: begin, block, end, and a
/// failure cleanup hook (§4.1, §5 "Resource discipline").
pub trait FilterCodec {
    fn begin_encode(&mut self, sink: Box<dyn Sink>) -> Result<(), FilterError>;
    fn begin_decode(&mut self, sink: Box<dyn Sink>, params: Option<&PredictorParams>) -> Result<(), FilterError>;
    fn block(&mut self, bytes: &[u8]) -> Result<(), FilterError>;
    fn end(&mut self) -> Result<(), FilterError>;
    fn fail(&mut self);
}

/// One-shot convenience wrappers used by callers that don't need the
/// streaming begin/block/end protocol (most tests, and the encryption
/// layer's stream decompression path).
pub fn encode(kind: FilterKind, input: &[u8]) -> Result<Vec<u8>, FilterError> {
    let sink = VecSink::default();
    macro_rules! run {
        ($codec:expr) => {{
            let mut codec = $codec;
            codec.begin_encode(Box::new(sink.clone()))?;
            let result = codec.block(input).and_then(|_| codec.end());
            if result.is_err() {
                codec.fail();
            }
            result
        }};
    }
    match kind {
        FilterKind::AsciiHex => run!(ascii_hex::AsciiHexCodec::new()),
        FilterKind::Ascii85 => run!(ascii85::Ascii85Codec::new()),
        FilterKind::Flate => run!(flate::FlateCodec::new()),
        FilterKind::RunLength => return Err(FilterError::UnsupportedFilter { operation: "RunLength encode" }),
        FilterKind::Lzw => return Err(FilterError::UnsupportedFilter { operation: "LZW encode" }),
        _ => return Err(FilterError::UnsupportedFilter { operation: "encode" }),
    }?;
    Ok(sink.0.take())
}

pub fn decode(kind: FilterKind, input: &[u8], params: Option<&PredictorParams>) -> Result<Vec<u8>, FilterError> {
    let sink = VecSink::default();
    macro_rules! run {
        ($codec:expr) => {{
            let mut codec = $codec;
            codec.begin_decode(Box::new(sink.clone()), params)?;
            let result = codec.block(input).and_then(|_| codec.end());
            if result.is_err() {
                codec.fail();
            }
            result
        }};
    }
    match kind {
        FilterKind::AsciiHex => run!(ascii_hex::AsciiHexCodec::new()),
        FilterKind::Ascii85 => run!(ascii85::Ascii85Codec::new()),
        FilterKind::Flate => run!(flate::FlateCodec::new()),
        FilterKind::RunLength => run!(run_length::RunLengthCodec::new()),
        FilterKind::Lzw => run!(lzw::LzwCodec::new()),
        _ => return Err(FilterError::UnsupportedFilter { operation: "decode" }),
    }?;
    Ok(sink.0.take())
}
