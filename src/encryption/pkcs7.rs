use aes::cipher::block_padding::{PadType, RawPadding, UnpadError};

/// PKCS#7 block padding (RFC 2898 calls the same scheme PKCS#5 when the
/// block size is fixed at 8; AESV2 uses the 16-byte-block form, so this
/// crate names it the way §4.2 does).
#[derive(Clone, Copy, Debug)]
pub struct Pkcs7;

impl RawPadding for Pkcs7 {
    const TYPE: PadType = PadType::Reversible;

    #[inline]
    fn raw_pad(block: &mut [u8], pos: usize) {
        debug_assert!(block.len() <= 16, "AESV2 blocks are 16 bytes");
        debug_assert!(pos < block.len());
        let n = (block.len() - pos) as u8;
        for b in &mut block[pos..] {
            *b = n;
        }
    }

    #[inline]
    fn raw_unpad(block: &[u8]) -> Result<&[u8], UnpadError> {
        let bs = block.len();
        let n = block[bs - 1];
        if n == 0 || n as usize > bs {
            return Err(UnpadError);
        }
        let split = bs - n as usize;
        if block[split..bs - 1].iter().any(|&v| v != n) {
            return Err(UnpadError);
        }
        Ok(&block[..split])
    }
}
