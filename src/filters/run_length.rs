use super::{FilterCodec, PredictorParams, SessionState, Sink};
use crate::error::FilterError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum RunState {
    Length,
    Literal(u8),
    Repeat(u8),
}

/// RunLength (`/RunLengthDecode`, `/RL`): decode-only per §4.1. Encoding
/// reports *UnsupportedFilter*.
pub struct RunLengthCodec {
    state: SessionState,
    sink: Option<Box<dyn Sink>>,
    run: RunState,
    done: bool,
}

impl RunLengthCodec {
    pub fn new() -> Self {
        RunLengthCodec { state: SessionState::new(), sink: None, run: RunState::Length, done: false }
    }
}

impl FilterCodec for RunLengthCodec {
    fn begin_encode(&mut self, _sink: Box<dyn Sink>) -> Result<(), FilterError> {
        Err(FilterError::UnsupportedFilter { operation: "RunLength encode" })
    }

    fn begin_decode(&mut self, sink: Box<dyn Sink>, _params: Option<&PredictorParams>) -> Result<(), FilterError> {
        self.state.begin(super::Phase::Decoding)?;
        self.sink = Some(sink);
        self.run = RunState::Length;
        self.done = false;
        Ok(())
    }

    fn block(&mut self, bytes: &[u8]) -> Result<(), FilterError> {
        self.state.require_open()?;
        if self.done {
            return Ok(());
        }
        let sink = self.sink.as_mut().expect("sink set in begin");
        let mut out = Vec::new();
        for &byte in bytes {
            if self.done {
                break;
            }
            match self.run {
                RunState::Length => {
                    if byte == 128 {
                        self.done = true;
                    } else if byte < 128 {
                        self.run = RunState::Literal(byte + 1);
                    } else {
                        self.run = RunState::Repeat((257 - byte as u16) as u8);
                    }
                }
                RunState::Literal(ref mut remaining) => {
                    out.push(byte);
                    *remaining -= 1;
                    if *remaining == 0 {
                        self.run = RunState::Length;
                    }
                }
                RunState::Repeat(count) => {
                    out.extend(std::iter::repeat(byte).take(count as usize));
                    self.run = RunState::Length;
                }
            }
        }
        sink.write(&out).map_err(|_| FilterError::InvalidStream("sink rejected RunLength output"))
    }

    fn end(&mut self) -> Result<(), FilterError> {
        self.state.require_open()?;
        self.state.close()?;
        self.sink = None;
        Ok(())
    }

    fn fail(&mut self) {
        self.sink = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::{decode, FilterKind};

    #[test]
    fn decodes_literal_and_repeat_runs() {
        let input = [254, b'a', 255, b'b', 2, b'c', b'b', b'c', 254, b'a', 128];
        let decoded = decode(FilterKind::RunLength, &input, None).unwrap();
        assert_eq!(decoded, b"aaabbcbcaaa".to_vec());
    }

    #[test]
    fn encode_is_unsupported() {
        let err = super::super::encode(FilterKind::RunLength, b"x").unwrap_err();
        assert!(matches!(err, crate::error::FilterError::UnsupportedFilter { .. }));
    }
}
