use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest as _, Md5};
use rand::RngExt as _;

use super::pkcs7::Pkcs7;
use super::rc4::Rc4;
use crate::error::DecryptionError;
use crate::ObjectId;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

const AES_SALT: &[u8] = b"sAlT";

/// The per-object key derivation and object-level cipher for one
/// [`crate::encryption::EncryptionAlgorithm`] (§4.2, Algorithm 3.1 plus the
/// object encryption rules).
pub trait CryptFilter: std::fmt::Debug + Send + Sync {
    /// The PDF wire name for this method, as it would appear in `/CFM`.
    fn method(&self) -> &'static [u8];
    fn compute_key(&self, file_key: &[u8], obj_id: ObjectId) -> Result<Vec<u8>, DecryptionError>;
    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, DecryptionError>;
    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, DecryptionError>;
}

fn per_object_key_prefix(file_key: &[u8], obj_id: ObjectId) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(file_key.len() + 5);
    bytes.extend_from_slice(file_key);
    bytes.extend_from_slice(&obj_id.0.to_le_bytes()[..3]);
    bytes.extend_from_slice(&obj_id.1.to_le_bytes()[..2]);
    bytes
}

/// RC4V1/RC4V2 differ only in the file encryption key's length; both apply
/// Algorithm 3.1 and then RC4 the content directly (streamable).
#[derive(Clone, Copy, Debug)]
pub struct Rc4CryptFilter;

impl CryptFilter for Rc4CryptFilter {
    fn method(&self) -> &'static [u8] {
        b"V2"
    }

    fn compute_key(&self, file_key: &[u8], obj_id: ObjectId) -> Result<Vec<u8>, DecryptionError> {
        let mut hasher = Md5::new();
        hasher.update(per_object_key_prefix(file_key, obj_id));
        let key_len = std::cmp::min(file_key.len() + 5, 16);
        Ok(hasher.finalize()[..key_len].to_vec())
    }

    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        Ok(Rc4::new(key).encrypt(plaintext))
    }

    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        Ok(Rc4::new(key).decrypt(ciphertext))
    }
}

/// AESV2: Algorithm 3.1 with the "sAlT" salt appended before MD5, then
/// AES-128-CBC with a random IV prepended to the ciphertext (§4.2).
#[derive(Clone, Copy, Debug)]
pub struct Aes128CryptFilter;

impl CryptFilter for Aes128CryptFilter {
    fn method(&self) -> &'static [u8] {
        b"AESV2"
    }

    fn compute_key(&self, file_key: &[u8], obj_id: ObjectId) -> Result<Vec<u8>, DecryptionError> {
        let mut bytes = per_object_key_prefix(file_key, obj_id);
        bytes.extend_from_slice(AES_SALT);
        let key_len = std::cmp::min(file_key.len() + 5, 16);
        Ok(Md5::digest(bytes)[..key_len].to_vec())
    }

    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        if key.len() != 16 {
            return Err(DecryptionError::InvalidKeyLength);
        }

        let padded_len = (plaintext.len() + 16) / 16 * 16;
        let mut buffer = Vec::with_capacity(16 + padded_len);

        let mut iv = [0u8; 16];
        rand::rng().fill(&mut iv);

        buffer.extend_from_slice(&iv);
        buffer.extend_from_slice(plaintext);
        buffer.resize(16 + padded_len, 0);

        Aes128CbcEnc::new(key.into(), &iv.into())
            .encrypt_padded_mut::<Pkcs7>(&mut buffer[16..], plaintext.len())
            .map_err(|_| DecryptionError::Padding)?;

        Ok(buffer)
    }

    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        if key.len() != 16 {
            return Err(DecryptionError::InvalidKeyLength);
        }
        if ciphertext.len() % 16 != 0 {
            return Err(DecryptionError::InvalidCipherTextLength);
        }
        if ciphertext.len() <= 16 {
            return Ok(vec![]);
        }

        let mut iv = [0u8; 16];
        iv.copy_from_slice(&ciphertext[..16]);
        let mut body = ciphertext[16..].to_vec();

        Ok(Aes128CbcDec::new(key.into(), &iv.into())
            .decrypt_padded_mut::<Pkcs7>(&mut body)
            .map_err(|_| DecryptionError::Padding)?
            .to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc4_compute_key_matches_algorithm_3_1() {
        let filter = Rc4CryptFilter;
        let key = filter.compute_key(&[0u8; 5], (4, 0)).unwrap();
        assert_eq!(key.len(), std::cmp::min(5 + 5, 16));
    }

    #[test]
    fn aes_round_trips_through_random_iv() {
        let filter = Aes128CryptFilter;
        let key = [0x11u8; 16];
        let ciphertext = filter.encrypt(&key, b"PDF").unwrap();
        assert_eq!(ciphertext.len(), 32);
        let plaintext = filter.decrypt(&key, &ciphertext).unwrap();
        assert_eq!(plaintext, b"PDF".to_vec());
    }

    #[test]
    fn aes_decrypt_of_iv_only_ciphertext_is_empty() {
        let filter = Aes128CryptFilter;
        let key = [0x11u8; 16];
        let plaintext = filter.decrypt(&key, &[0u8; 16]).unwrap();
        assert!(plaintext.is_empty());
    }
}
