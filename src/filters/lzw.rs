use weezl::{decode::Decoder, BitOrder};

use super::predictor::apply_predictor;
use super::{FilterCodec, PredictorParams, SessionState, Sink};
use crate::error::FilterError;

const MIN_CODE_WIDTH: u8 = 9;

/// LZW (`/LZWDecode`, `/LZW`): decode-only per §4.1, using the PDF variant
/// of LZW (9..12 bit codes, `EarlyChange` controlling the width-growth
/// thresholds). Predictor reversal is applied as a post-pass once the LZW
/// stream is fully decoded, the same way `FlateCodec` applies it after
/// inflation. Encoding reports *UnsupportedFilter*.
pub struct LzwCodec {
    state: SessionState,
    sink: Option<Box<dyn Sink>>,
    decoder: Option<Decoder>,
    decoded: Vec<u8>,
    predictor: PredictorParams,
}

impl LzwCodec {
    pub fn new() -> Self {
        LzwCodec {
            state: SessionState::new(),
            sink: None,
            decoder: None,
            decoded: Vec::new(),
            predictor: PredictorParams::default(),
        }
    }
}

impl FilterCodec for LzwCodec {
    fn begin_encode(&mut self, _sink: Box<dyn Sink>) -> Result<(), FilterError> {
        Err(FilterError::UnsupportedFilter { operation: "LZW encode" })
    }

    fn begin_decode(&mut self, sink: Box<dyn Sink>, params: Option<&PredictorParams>) -> Result<(), FilterError> {
        self.state.begin(super::Phase::Decoding)?;
        self.sink = Some(sink);
        self.predictor = params.copied().unwrap_or_default();
        let early_change = self.predictor.early_change != 0;
        self.decoder = Some(if early_change {
            Decoder::with_tiff_size_switch(BitOrder::Msb, MIN_CODE_WIDTH - 1)
        } else {
            Decoder::new(BitOrder::Msb, MIN_CODE_WIDTH - 1)
        });
        Ok(())
    }

    fn block(&mut self, bytes: &[u8]) -> Result<(), FilterError> {
        self.state.require_open()?;
        let decoder = self.decoder.as_mut().expect("decoder set in begin_decode");
        let mut out = Vec::new();
        let result = decoder.into_stream(&mut out).decode_all(bytes);
        if let Err(err) = result.status {
            log::warn!("LZW decode: {err}");
            return Err(FilterError::ValueOutOfRange("LZW code outside dictionary"));
        }
        self.decoded.extend_from_slice(&out);
        Ok(())
    }

    fn end(&mut self) -> Result<(), FilterError> {
        self.state.require_open()?;
        let decoded = std::mem::take(&mut self.decoded);
        let decoded = apply_predictor(decoded, &self.predictor)?;
        let sink = self.sink.as_mut().expect("sink set in begin_decode");
        sink.write(&decoded).map_err(|_| FilterError::InvalidStream("sink rejected LZW output"))?;
        self.state.close()?;
        self.sink = None;
        self.decoder = None;
        Ok(())
    }

    fn fail(&mut self) {
        self.sink = None;
        self.decoder = None;
        self.decoded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::super::{decode, FilterKind, PredictorParams};

    #[test]
    fn s3_adobe_annex_h_example() {
        let input = [0x80, 0x0B, 0x60, 0x50, 0x22, 0x0C, 0x0C, 0x85, 0x01];
        let decoded = decode(FilterKind::Lzw, &input, None).unwrap();
        assert_eq!(decoded, b"-----A---B".to_vec());
    }

    #[test]
    fn applies_tiff_predictor_after_lzw_decode() {
        let input = [0x80, 0x0B, 0x60, 0x50, 0x22, 0x0C, 0x0C, 0x85, 0x01];
        let params = PredictorParams { predictor: 2, colors: 1, bits_per_component: 8, columns: 10, early_change: 1 };
        let decoded = decode(FilterKind::Lzw, &input, Some(&params)).unwrap();
        // "-----A---B" run through TIFF horizontal-differencing reversal
        // (cumulative sum per row, mod 256).
        assert_eq!(decoded, vec![0x2D, 0x5A, 0x87, 0xB4, 0xE1, 0x22, 0x4F, 0x7C, 0xA9, 0xEB]);
    }

    #[test]
    fn encode_is_unsupported() {
        let err = super::super::encode(FilterKind::Lzw, b"x").unwrap_err();
        assert!(matches!(err, crate::error::FilterError::UnsupportedFilter { .. }));
    }

    #[test]
    fn out_of_range_code_is_reported_and_logged() {
        let _ = env_logger::builder().is_test(true).try_init();
        // 0x1FF = 511, a 9-bit code far past the CLEAR/EOD/literal range
        // with nothing yet assigned to fill it in.
        let err = decode(FilterKind::Lzw, &[0xFF, 0x80], None).unwrap_err();
        assert!(matches!(err, crate::error::FilterError::ValueOutOfRange(_)));
    }
}
