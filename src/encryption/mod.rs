//! The Standard Security Handler (§4.2): password-derived document and
//! per-object keys, RC4V1/RC4V2/AESV2 object encryption, and encryption
//! dictionary serialization. Revision 4-and-above key derivation (AES-256,
//! SASLprep passwords) is out of scope; only revisions 2 and 3 are
//! implemented.

mod algorithms;
pub mod crypt_filters;
mod pkcs7;
mod rc4;

use std::cell::RefCell;

use bitflags::bitflags;

pub use algorithms::Revision;
use crypt_filters::{Aes128CryptFilter, CryptFilter, Rc4CryptFilter};
use rc4::Rc4;

use crate::error::DecryptionError;
use crate::pdf_string::StringFormat;
use crate::value::{Dictionary, Value};
use crate::ObjectId;

bitflags! {
    /// §3's permission bits, restricted to the subset this specification
    /// names; the reserved bits are corrected by [`Permissions::corrected`]
    /// rather than exposed as flags of their own.
    #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub struct Permissions: i32 {
        const PRINT = 0x04;
        const EDIT = 0x08;
        const COPY = 0x10;
        const EDIT_NOTES = 0x20;
        const FILL_AND_SIGN = 0x100;
        const ACCESSIBLE = 0x200;
        const DOC_ASSEMBLY = 0x400;
        const HIGH_PRINT = 0x800;
    }
}

impl Permissions {
    /// Forces the reserved bits to the values PDF 1.6 §7.6.3.2 requires for
    /// revisions 2 and 3: bits 1-2 clear, bits 7-8 and 13-32 set.
    pub fn corrected(self) -> Self {
        let mut bits = self.bits();
        bits &= !0b11;
        bits |= 0b1100_0000;
        bits |= 0xFFFF_F000u32 as i32;
        Permissions::from_bits_retain(bits)
    }
}

/// The three object-encryption methods this core implements (§3's
/// `EncryptionProfile.algorithm`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncryptionAlgorithm {
    Rc4V1,
    Rc4V2,
    Aes128,
}

impl EncryptionAlgorithm {
    fn revision(self) -> Revision {
        match self {
            EncryptionAlgorithm::Rc4V1 => Revision::Two,
            EncryptionAlgorithm::Rc4V2 | EncryptionAlgorithm::Aes128 => Revision::Three,
        }
    }

    /// `/V`, as written to the encryption dictionary.
    fn version_number(self) -> i64 {
        match self {
            EncryptionAlgorithm::Rc4V1 => 1,
            EncryptionAlgorithm::Rc4V2 => 2,
            EncryptionAlgorithm::Aes128 => 4,
        }
    }

    /// `/R`: the AESV2 crypt filter is declared under revision 4 on the
    /// wire even though its key derivation follows the revision-3 algorithm
    /// (§9 design notes).
    fn revision_number(self) -> i64 {
        match self {
            EncryptionAlgorithm::Rc4V1 => 2,
            EncryptionAlgorithm::Rc4V2 => 3,
            EncryptionAlgorithm::Aes128 => 4,
        }
    }

    fn key_length_bits(self, key_length: usize) -> i64 {
        match self {
            EncryptionAlgorithm::Aes128 => 128,
            _ => key_length as i64 * 8,
        }
    }

    /// `CalculateStreamLength` (§4.2): the encrypted size of an `n`-byte
    /// plaintext stream.
    pub fn calculate_stream_length(self, n: usize) -> usize {
        match self {
            EncryptionAlgorithm::Rc4V1 | EncryptionAlgorithm::Rc4V2 => n,
            EncryptionAlgorithm::Aes128 => 16 + (n + 1 + 15) / 16 * 16,
        }
    }

    /// `CalculateStreamOffset`: how many leading encrypted bytes are IV
    /// rather than plaintext-bearing ciphertext.
    pub fn calculate_stream_offset(self) -> usize {
        match self {
            EncryptionAlgorithm::Rc4V1 | EncryptionAlgorithm::Rc4V2 => 0,
            EncryptionAlgorithm::Aes128 => 16,
        }
    }
}

/// Immutable per-document encryption parameters (§3's `EncryptionProfile`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncryptionProfile {
    pub algorithm: EncryptionAlgorithm,
    key_length: u8,
    pub permissions: Permissions,
}

impl EncryptionProfile {
    /// `key_length_bits` is clamped to the 40..128-bit range Algorithm 3.2
    /// allows and rounded down to a whole byte.
    pub fn new(algorithm: EncryptionAlgorithm, key_length_bits: u16, permissions: Permissions) -> Self {
        let key_length = ((key_length_bits / 8) as u8).clamp(5, 16);
        EncryptionProfile { algorithm, key_length, permissions: permissions.corrected() }
    }

    pub fn revision(&self) -> Revision {
        self.algorithm.revision()
    }

    pub fn key_length(&self) -> usize {
        self.key_length as usize
    }
}

/// Mutable per-document session state (§3's `EncryptionState`): the derived
/// `/O` and `/U` values, the document encryption key, the object reference
/// currently in scope, and a one-entry RC4 micro-cache keyed by the last
/// per-object key bytes so repeated encrypt/decrypt calls against the same
/// object skip re-running the key schedule.
pub struct EncryptionState {
    profile: EncryptionProfile,
    owner_value: Vec<u8>,
    user_value: Vec<u8>,
    encryption_key: Vec<u8>,
    current_object: ObjectId,
    rc4_cache: RefCell<Option<(Vec<u8>, Rc4)>>,
}

impl EncryptionState {
    /// Builds a fresh session from owner/user passwords, deriving `/O`,
    /// `/U` and the document encryption key (Algorithms 3.2, 3.3 and
    /// 3.4/3.5).
    pub fn new(
        profile: EncryptionProfile, document_id: &[u8], owner_password: &[u8], user_password: &[u8],
        encrypt_metadata: bool,
    ) -> Self {
        let padded_owner = algorithms::pad_password(owner_password);
        let padded_user = algorithms::pad_password(user_password);
        let key_length = profile.key_length();
        let revision = profile.revision();
        let permissions = profile.permissions.bits();

        let owner_value = algorithms::compute_owner_value(&padded_owner, &padded_user, key_length, revision);
        let encryption_key = algorithms::compute_encryption_key(
            &padded_user, &owner_value, permissions, document_id, key_length, revision, encrypt_metadata,
        );
        let user_value = algorithms::compute_user_value(&encryption_key, document_id, revision);

        EncryptionState {
            profile,
            owner_value,
            user_value,
            encryption_key,
            current_object: (0, 0),
            rc4_cache: RefCell::new(None),
        }
    }

    /// Reconstructs session state from a stored encryption dictionary's
    /// `/O`, `/U`, `/P` values plus a candidate password
    /// (`Authenticate(password, docId)`, §4.2). Tries the password as the
    /// user password, then as the owner password.
    pub fn authenticate(
        profile: EncryptionProfile, owner_value: &[u8], user_value: &[u8], document_id: &[u8], password: &[u8],
        encrypt_metadata: bool,
    ) -> Result<Self, DecryptionError> {
        let encryption_key = algorithms::authenticate(
            password,
            owner_value,
            user_value,
            profile.permissions.bits(),
            document_id,
            profile.key_length(),
            profile.revision(),
            encrypt_metadata,
        )?;

        Ok(EncryptionState {
            profile,
            owner_value: owner_value.to_vec(),
            user_value: user_value.to_vec(),
            encryption_key,
            current_object: (0, 0),
            rc4_cache: RefCell::new(None),
        })
    }

    /// `setCurrentReference(r)`: the per-object key is recomputed lazily,
    /// on the next `encrypt`/`decrypt` call.
    pub fn set_current_reference(&mut self, obj_id: ObjectId) {
        self.current_object = obj_id;
    }

    pub fn owner_value(&self) -> &[u8] {
        &self.owner_value
    }

    pub fn user_value(&self) -> &[u8] {
        &self.user_value
    }

    pub fn profile(&self) -> &EncryptionProfile {
        &self.profile
    }

    fn per_object_key(&self) -> Result<Vec<u8>, DecryptionError> {
        match self.profile.algorithm {
            EncryptionAlgorithm::Rc4V1 | EncryptionAlgorithm::Rc4V2 => {
                Rc4CryptFilter.compute_key(&self.encryption_key, self.current_object)
            }
            EncryptionAlgorithm::Aes128 => Aes128CryptFilter.compute_key(&self.encryption_key, self.current_object),
        }
    }

    fn cached_rc4(&self, key: &[u8]) -> Rc4 {
        let mut cache = self.rc4_cache.borrow_mut();
        if let Some((cached_key, rc4)) = cache.as_ref() {
            if cached_key == key {
                return rc4.clone();
            }
        }
        let rc4 = Rc4::new(key);
        *cache = Some((key.to_vec(), rc4.clone()));
        rc4
    }

    /// Encrypts `plaintext` under the per-object key for the object set by
    /// [`EncryptionState::set_current_reference`].
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        let key = self.per_object_key()?;
        match self.profile.algorithm {
            EncryptionAlgorithm::Rc4V1 | EncryptionAlgorithm::Rc4V2 => Ok(self.cached_rc4(&key).encrypt(plaintext)),
            EncryptionAlgorithm::Aes128 => Aes128CryptFilter.encrypt(&key, plaintext),
        }
    }

    /// Inverse of [`EncryptionState::encrypt`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        let key = self.per_object_key()?;
        match self.profile.algorithm {
            EncryptionAlgorithm::Rc4V1 | EncryptionAlgorithm::Rc4V2 => Ok(self.cached_rc4(&key).decrypt(ciphertext)),
            EncryptionAlgorithm::Aes128 => Aes128CryptFilter.decrypt(&key, ciphertext),
        }
    }

    /// Builds the `/Encrypt` dictionary (§4.2's "Encryption dictionary
    /// output"), including the `/CF`/`/StmF`/`/StrF`/`/EFF` crypt filter
    /// entries for AESV2.
    pub fn encryption_dictionary(&self) -> Dictionary {
        let algorithm = self.profile.algorithm;
        let mut dict = Dictionary::new();
        dict.set("Filter", Value::Name(b"Standard".to_vec()));
        dict.set("V", Value::Integer(algorithm.version_number()));
        dict.set("R", Value::Integer(algorithm.revision_number()));
        if algorithm.version_number() >= 2 {
            dict.set("Length", Value::Integer(algorithm.key_length_bits(self.profile.key_length())));
        }
        dict.set("P", Value::Integer(self.profile.permissions.bits() as i64));
        dict.set("O", Value::String(self.owner_value.clone(), StringFormat::Hexadecimal));
        dict.set("U", Value::String(self.user_value.clone(), StringFormat::Hexadecimal));

        if algorithm == EncryptionAlgorithm::Aes128 {
            let mut std_cf = Dictionary::new();
            std_cf.set("CFM", Value::Name(b"AESV2".to_vec()));
            std_cf.set("AuthEvent", Value::Name(b"DocOpen".to_vec()));
            std_cf.set("Length", Value::Integer(16));

            let mut cf = Dictionary::new();
            cf.set("StdCF", Value::Dictionary(std_cf));

            dict.set("CF", Value::Dictionary(cf));
            dict.set("StmF", Value::Name(b"StdCF".to_vec()));
            dict.set("StrF", Value::Name(b"StdCF".to_vec()));
            dict.set("EFF", Value::Name(b"StdCF".to_vec()));
        }

        dict
    }

    /// Parses a `/V`, `/R`, `/O`, `/U`, `/P`, `/Length` encryption
    /// dictionary and authenticates `password` against it, recovering the
    /// permissions and algorithm that produced the dictionary.
    pub fn from_dictionary(
        dict: &Dictionary, document_id: &[u8], password: &[u8], encrypt_metadata: bool,
    ) -> Result<Self, DecryptionError> {
        let version = dict.get(b"V").and_then(Value::as_i64).ok_or(DecryptionError::MissingVersion)?;
        let revision = dict.get(b"R").and_then(Value::as_i64).ok_or(DecryptionError::MissingRevision)?;
        let owner_value =
            dict.get(b"O").and_then(Value::as_string_bytes).ok_or(DecryptionError::MissingOwnerPassword)?;
        let user_value = dict.get(b"U").and_then(Value::as_string_bytes).ok_or(DecryptionError::MissingUserPassword)?;
        let permissions =
            dict.get(b"P").and_then(Value::as_i64).ok_or(DecryptionError::MissingPermissions)? as i32;

        let algorithm = match (version, revision) {
            (1, 2) => EncryptionAlgorithm::Rc4V1,
            (2, 3) => EncryptionAlgorithm::Rc4V2,
            (4, 4) => EncryptionAlgorithm::Aes128,
            (v, _) if v >= 4 => return Err(DecryptionError::UnsupportedVersion),
            _ => return Err(DecryptionError::InvalidEncryptionDict),
        };

        let key_length_bits = dict.get(b"Length").and_then(Value::as_i64).unwrap_or(40);
        let profile = EncryptionProfile::new(algorithm, key_length_bits as u16, Permissions::from_bits_retain(permissions));

        EncryptionState::authenticate(profile, owner_value, user_value, document_id, password, encrypt_metadata)
    }
}
