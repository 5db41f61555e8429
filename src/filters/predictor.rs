//! PNG (predictor 10..15) and TIFF (predictor 2) reversal, applied as a
//! post-pass after Flate/LZW inflation (§4.1).

use crate::error::FilterError;

/// Decode parameters controlling predictor reversal (§3). Defaults match
/// the PDF spec's defaults: no predictor, 1 color, 8 bits/component, 1
/// column, early code-width change enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredictorParams {
    pub predictor: i64,
    pub colors: i64,
    pub bits_per_component: i64,
    pub columns: i64,
    pub early_change: i64,
}

impl Default for PredictorParams {
    fn default() -> Self {
        PredictorParams { predictor: 1, colors: 1, bits_per_component: 8, columns: 1, early_change: 1 }
    }
}

impl PredictorParams {
    /// Builds parameters from the loose `Option<i64>` values a `/DecodeParms`
    /// dictionary would hold, applying §3's defaults for absent entries.
    pub fn from_dict_like(
        predictor: Option<i64>, colors: Option<i64>, bits_per_component: Option<i64>, columns: Option<i64>,
        early_change: Option<i64>,
    ) -> Self {
        let defaults = PredictorParams::default();
        PredictorParams {
            predictor: predictor.unwrap_or(defaults.predictor),
            colors: colors.unwrap_or(defaults.colors).max(1),
            bits_per_component: bits_per_component.unwrap_or(defaults.bits_per_component),
            columns: columns.unwrap_or(defaults.columns).max(1),
            early_change: early_change.unwrap_or(defaults.early_change),
        }
    }

    fn bytes_per_pixel(&self) -> usize {
        ((self.colors as usize * self.bits_per_component as usize) + 7) / 8
    }

    fn row_bytes(&self) -> usize {
        let bits_per_row = self.colors as usize * self.bits_per_component as usize * self.columns as usize;
        (bits_per_row + 7) / 8
    }
}

/// Applies the predictor named by `params` to Flate/LZW-inflated `data`,
/// returning the bytes unchanged when `predictor` is 1 (no-op).
pub fn apply_predictor(data: Vec<u8>, params: &PredictorParams) -> Result<Vec<u8>, FilterError> {
    match params.predictor {
        1 => Ok(data),
        2 => decode_tiff_predictor(&data, params),
        10..=15 => decode_png_predictor(&data, params),
        _ => Ok(data),
    }
}

fn paeth_predict(left: u8, above: u8, upper_left: u8) -> u8 {
    let left = left as i16;
    let above = above as i16;
    let upper_left = upper_left as i16;
    let estimate = left + above - upper_left;
    let dist_left = (estimate - left).abs();
    let dist_above = (estimate - above).abs();
    let dist_upper_left = (estimate - upper_left).abs();
    if dist_left <= dist_above && dist_left <= dist_upper_left {
        left as u8
    } else if dist_above <= dist_upper_left {
        above as u8
    } else {
        upper_left as u8
    }
}

fn decode_row(filter_type: u8, bpp: usize, previous: &[u8], current: &mut [u8]) -> Result<(), FilterError> {
    let len = current.len();
    match filter_type {
        0 => {}
        1 => {
            for i in bpp..len {
                current[i] = current[i].wrapping_add(current[i - bpp]);
            }
        }
        2 => {
            for i in 0..len {
                current[i] = current[i].wrapping_add(previous[i]);
            }
        }
        3 => {
            for i in 0..bpp {
                current[i] = current[i].wrapping_add(previous[i] / 2);
            }
            for i in bpp..len {
                current[i] = current[i].wrapping_add(((current[i - bpp] as u16 + previous[i] as u16) / 2) as u8);
            }
        }
        4 => {
            for i in 0..bpp {
                current[i] = current[i].wrapping_add(paeth_predict(0, previous[i], 0));
            }
            for i in bpp..len {
                current[i] = current[i].wrapping_add(paeth_predict(current[i - bpp], previous[i], previous[i - bpp]));
            }
        }
        other => return Err(FilterError::InvalidPredictor(other)),
    }
    Ok(())
}

/// Reverses the PNG per-row predictors (filter types 0..4), per §4.1's
/// table. `data` is organized as repeated `(filterType, rowBytes[])` records.
pub fn decode_png_predictor(data: &[u8], params: &PredictorParams) -> Result<Vec<u8>, FilterError> {
    let row_bytes = params.row_bytes();
    let bpp = params.bytes_per_pixel();
    let mut previous = vec![0u8; row_bytes];
    let mut current = vec![0u8; row_bytes];
    let mut decoded = Vec::new();
    let mut pos = 0;
    while pos + 1 + row_bytes <= data.len() {
        let filter_type = data[pos];
        pos += 1;
        current.copy_from_slice(&data[pos..pos + row_bytes]);
        pos += row_bytes;
        decode_row(filter_type, bpp, &previous, &mut current)?;
        decoded.extend_from_slice(&current);
        std::mem::swap(&mut previous, &mut current);
    }
    Ok(decoded)
}

/// Reverses TIFF predictor 2 (horizontal differencing): each sample in a
/// row is the sum of itself and the same-channel sample `colors` positions
/// to its left, reversed in place per row.
pub fn decode_tiff_predictor(data: &[u8], params: &PredictorParams) -> Result<Vec<u8>, FilterError> {
    let row_bytes = params.row_bytes();
    let colors = params.colors as usize;
    let mut decoded = data.to_vec();

    match params.bits_per_component {
        8 => {
            for row in decoded.chunks_mut(row_bytes) {
                for i in colors..row.len() {
                    row[i] = row[i].wrapping_add(row[i - colors]);
                }
            }
        }
        16 => {
            for row in decoded.chunks_mut(row_bytes) {
                let samples_per_row = row.len() / 2;
                for i in colors..samples_per_row {
                    let prev = u16::from_be_bytes([row[(i - colors) * 2], row[(i - colors) * 2 + 1]]);
                    let cur = u16::from_be_bytes([row[i * 2], row[i * 2 + 1]]);
                    let sum = cur.wrapping_add(prev);
                    let bytes = sum.to_be_bytes();
                    row[i * 2] = bytes[0];
                    row[i * 2 + 1] = bytes[1];
                }
            }
        }
        bits @ (1 | 2 | 4) => {
            for row in decoded.chunks_mut(row_bytes) {
                decode_tiff_sub_byte_row(row, colors, bits as u32);
            }
        }
        _ => {}
    }
    Ok(decoded)
}

/// Sub-byte (1/2/4 bpc) horizontal differencing: unpacks each row into
/// one sample per slot, differences, then repacks MSB-first.
fn decode_tiff_sub_byte_row(row: &mut [u8], colors: usize, bits: u32) {
    let mask = (1u16 << bits) - 1;
    let samples_per_byte = 8 / bits as usize;
    let sample_count = row.len() * samples_per_byte;

    let mut samples: Vec<u16> = Vec::with_capacity(sample_count);
    for &byte in row.iter() {
        for slot in 0..samples_per_byte {
            let shift = 8 - bits as usize * (slot + 1);
            samples.push(((byte as u16) >> shift) & mask);
        }
    }

    for i in colors..samples.len() {
        samples[i] = (samples[i] + samples[i - colors]) & mask;
    }

    for (i, byte) in row.iter_mut().enumerate() {
        *byte = 0;
        for slot in 0..samples_per_byte {
            let sample_index = i * samples_per_byte + slot;
            if sample_index >= samples.len() {
                break;
            }
            let shift = 8 - bits as usize * (slot + 1);
            *byte |= (samples[sample_index] as u8) << shift;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_png_up_predictor() {
        let params = PredictorParams { predictor: 12, colors: 1, bits_per_component: 8, columns: 3, early_change: 1 };
        let input = [2u8, 1, 2, 3, 2, 1, 2, 3];
        let decoded = decode_png_predictor(&input, &params).unwrap();
        assert_eq!(decoded, vec![1, 2, 3, 2, 4, 6]);
    }

    #[test]
    fn unknown_png_filter_type_is_an_error() {
        let params = PredictorParams { predictor: 12, colors: 1, bits_per_component: 8, columns: 1, early_change: 1 };
        let err = decode_png_predictor(&[9, 0], &params).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPredictor(9)));
    }

    #[test]
    fn tiff_predictor_reverses_horizontal_differencing_8bpc() {
        let params = PredictorParams { predictor: 2, colors: 1, bits_per_component: 8, columns: 4, early_change: 1 };
        // Row encodes [10, 10, 10, 10] as deltas [10, 0, 0, 0].
        let input = [10u8, 0, 0, 0];
        let decoded = decode_tiff_predictor(&input, &params).unwrap();
        assert_eq!(decoded, vec![10, 10, 10, 10]);
    }

    #[test]
    fn tiff_predictor_handles_multi_channel_rows() {
        let params = PredictorParams { predictor: 2, colors: 3, bits_per_component: 8, columns: 2, early_change: 1 };
        // Two RGB pixels (10,20,30) and (11,21,32), delta-encoded per channel.
        let input = [10u8, 20, 30, 1, 1, 2];
        let decoded = decode_tiff_predictor(&input, &params).unwrap();
        assert_eq!(decoded, vec![10, 20, 30, 11, 21, 32]);
    }

    #[test]
    fn tiff_predictor_handles_4bpc_rows() {
        let params = PredictorParams { predictor: 2, colors: 1, bits_per_component: 4, columns: 4, early_change: 1 };
        // Samples [3, 2, 2, 2] packed two per byte, prefix-summed to [3, 5, 7, 9].
        let input = [0x32u8, 0x22];
        let decoded = decode_tiff_predictor(&input, &params).unwrap();
        assert_eq!(decoded, vec![0x35, 0x79]);
    }
}
