use flate2::write::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use std::io::Write;

use super::predictor::{apply_predictor, PredictorParams};
use super::{FilterCodec, SessionState, Sink};
use crate::error::FilterError;

enum Coder {
    Encoder(ZlibEncoder<Vec<u8>>),
    Decoder(ZlibDecoder<Vec<u8>>),
}

/// Flate (`/FlateDecode`, `/Fl`): wraps `flate2`'s zlib encoder/decoder.
/// Decode recognizes `/DecodeParms` and applies predictor reversal as a
/// post-pass once inflation is complete (§4.1).
pub struct FlateCodec {
    state: SessionState,
    sink: Option<Box<dyn Sink>>,
    coder: Option<Coder>,
    predictor: PredictorParams,
}

impl FlateCodec {
    pub fn new() -> Self {
        FlateCodec { state: SessionState::new(), sink: None, coder: None, predictor: PredictorParams::default() }
    }
}

impl FilterCodec for FlateCodec {
    fn begin_encode(&mut self, sink: Box<dyn Sink>) -> Result<(), FilterError> {
        self.state.begin(super::Phase::Encoding)?;
        self.sink = Some(sink);
        self.coder = Some(Coder::Encoder(ZlibEncoder::new(Vec::new(), Compression::default())));
        Ok(())
    }

    fn begin_decode(&mut self, sink: Box<dyn Sink>, params: Option<&super::PredictorParams>) -> Result<(), FilterError> {
        self.state.begin(super::Phase::Decoding)?;
        self.sink = Some(sink);
        self.predictor = params.copied().unwrap_or_default();
        self.coder = Some(Coder::Decoder(ZlibDecoder::new(Vec::new())));
        Ok(())
    }

    fn block(&mut self, bytes: &[u8]) -> Result<(), FilterError> {
        self.state.require_open()?;
        match self.coder.as_mut().expect("coder set in begin") {
            Coder::Encoder(encoder) => encoder.write_all(bytes).map_err(FilterError::Flate),
            Coder::Decoder(decoder) => decoder.write_all(bytes).map_err(FilterError::Flate),
        }
    }

    fn end(&mut self) -> Result<(), FilterError> {
        self.state.require_open()?;
        let coder = self.coder.take().expect("coder set in begin");
        let sink = self.sink.as_mut().expect("sink set in begin");
        match coder {
            Coder::Encoder(encoder) => {
                let bytes = encoder.finish().map_err(FilterError::Flate)?;
                sink.write(&bytes).map_err(|_| FilterError::InvalidStream("sink rejected Flate output"))?;
            }
            Coder::Decoder(decoder) => {
                let inflated = decoder.finish().map_err(FilterError::Flate)?;
                let decoded = apply_predictor(inflated, &self.predictor)?;
                sink.write(&decoded).map_err(|_| FilterError::InvalidStream("sink rejected Flate output"))?;
            }
        }
        self.state.close()?;
        self.sink = None;
        Ok(())
    }

    fn fail(&mut self) {
        // Dropping the encoder/decoder releases the zlib context; no
        // partial state needs additional cleanup.
        self.coder = None;
        self.sink = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::{decode, encode, FilterKind, PredictorParams};

    #[test]
    fn round_trips_arbitrary_bytes() {
        let input = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let encoded = encode(FilterKind::Flate, &input).unwrap();
        let decoded = decode(FilterKind::Flate, &encoded, None).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn applies_png_predictor_after_inflation() {
        let raw = vec![2u8, 1, 2, 3, 2, 1, 2, 3];
        let encoded = encode(FilterKind::Flate, &raw).unwrap();
        let params = PredictorParams { predictor: 12, colors: 1, bits_per_component: 8, columns: 3, early_change: 1 };
        let decoded = decode(FilterKind::Flate, &encoded, Some(&params)).unwrap();
        assert_eq!(decoded, vec![1, 2, 3, 2, 4, 6]);
    }
}
