//! RC4 key schedule and keystream generation: Algorithm 3.1's per-object
//! stream cipher, and the salted rounds Algorithms 3.3 through 3.5 run
//! against successively XORed keys during owner/user value derivation.
//! Hand-rolled rather than pulled from a crypto crate: RC4 is a single
//! 256-byte permutation, not worth a dependency either in this crate or in
//! its teacher.
//!
//! Every key this crate ever runs through RC4 is 5..16 bytes (the document
//! encryption key's range, Algorithm 3.2) or a salted derivative of one of
//! those, and every call site already holds a byte slice — so unlike a
//! general-purpose RC4 implementation meant for arbitrary external callers,
//! this one takes and returns plain `&[u8]`/`Vec<u8>` rather than a generic
//! `AsRef<[u8]>`/iterator interface.

#[derive(Clone)]
pub struct Rc4 {
    initial_state: [u8; 256],
}

impl Rc4 {
    /// Runs the key-scheduling algorithm (KSA) once. `EncryptionState`'s
    /// micro-cache keeps the resulting permutation around and clones it
    /// per call instead of re-running this for every `encrypt`/`decrypt`
    /// against the same object.
    pub fn new(key: &[u8]) -> Self {
        assert!(!key.is_empty() && key.len() <= 16, "RC4 key must be 1..=16 bytes in this crate's key schedule");

        let mut initial_state = [0u8; 256];
        for (i, v) in initial_state.iter_mut().enumerate() {
            *v = i as u8;
        }

        let mut j = 0u8;
        for i in 0..256 {
            j = j.wrapping_add(initial_state[i]).wrapping_add(key[i % key.len()]);
            initial_state.swap(i, j as usize);
        }

        Rc4 { initial_state }
    }

    fn keystream_xor(&self, input: &[u8], output: &mut [u8]) {
        let mut state = self.initial_state;
        let mut i = 0u8;
        let mut j = 0u8;
        for (i_byte, o_byte) in input.iter().zip(output.iter_mut()) {
            i = i.wrapping_add(1);
            j = j.wrapping_add(state[i as usize]);
            state.swap(i as usize, j as usize);
            let key_byte = state[(state[i as usize].wrapping_add(state[j as usize])) as usize];
            *o_byte = i_byte ^ key_byte;
        }
    }

    pub fn decrypt(&self, input: &[u8]) -> Vec<u8> {
        let mut output = vec![0; input.len()];
        self.keystream_xor(input, &mut output);
        output
    }

    /// RC4 is symmetric: encryption is the same operation as decryption.
    pub fn encrypt(&self, input: &[u8]) -> Vec<u8> {
        self.decrypt(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc4_is_symmetric() {
        let cipher = Rc4::new(b"Key");
        let ciphertext = cipher.encrypt(b"Plaintext");
        let cipher = Rc4::new(b"Key");
        assert_eq!(cipher.decrypt(&ciphertext), b"Plaintext".to_vec());
    }

    #[test]
    fn matches_known_test_vector() {
        // RFC 6229 test vector: key "Key", plaintext "Plaintext".
        let cipher = Rc4::new(b"Key");
        let ciphertext = cipher.encrypt(b"Plaintext");
        assert_eq!(ciphertext, vec![0xBB, 0xF3, 0x16, 0xE8, 0xD9, 0x40, 0xAF, 0x0A, 0xD3]);
    }

    #[test]
    #[should_panic(expected = "1..=16 bytes")]
    fn key_longer_than_sixteen_bytes_panics() {
        // Algorithm 3.2 never produces a document encryption key above 16
        // bytes, so this crate's Rc4 rejects keys outside that range
        // rather than accepting the teacher's full 1..=256-byte range.
        Rc4::new(&[0u8; 17]);
    }
}
