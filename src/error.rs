use thiserror::Error;

/// Errors raised by the filter pipeline (§4.1).
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("filter does not implement {operation}")]
    UnsupportedFilter { operation: &'static str },

    #[error("malformed filter input: {0}")]
    InvalidStream(&'static str),

    #[error("value out of range: {0}")]
    ValueOutOfRange(&'static str),

    #[error("invalid predictor filter type byte {0}")]
    InvalidPredictor(u8),

    #[error("flate error: {0}")]
    Flate(#[from] std::io::Error),
}

/// Errors raised by the encryption/authentication core (§4.2).
#[derive(Error, Debug)]
pub enum DecryptionError {
    #[error("missing /Encrypt dictionary")]
    MissingEncryptDictionary,
    #[error("missing /V entry")]
    MissingVersion,
    #[error("missing /R entry")]
    MissingRevision,
    #[error("missing /O entry")]
    MissingOwnerPassword,
    #[error("missing /U entry")]
    MissingUserPassword,
    #[error("missing /P entry")]
    MissingPermissions,
    #[error("missing file identifier")]
    MissingFileID,
    #[error("hash has an unexpected length")]
    InvalidHashLength,
    #[error("key has an unexpected length")]
    InvalidKeyLength,
    #[error("ciphertext has an unexpected length")]
    InvalidCipherTextLength,
    #[error("/P has an unexpected length")]
    InvalidPermissionLength,
    #[error("unsupported /V value {0}")]
    InvalidVersion(i64),
    #[error("unsupported /R value {0}")]
    InvalidRevision(i64),
    #[error("unexpected value type for {0}")]
    InvalidType(&'static str),
    #[error("document is not encrypted")]
    NotDecryptable,
    #[error("password does not authenticate against /O or /U")]
    IncorrectPassword,
    #[error("unsupported encryption handler")]
    UnsupportedEncryption,
    #[error("revision-4-and-above encryption is not supported")]
    UnsupportedVersion,
    #[error("revision-4-and-above encryption is not supported")]
    UnsupportedRevision,
    #[error("padding error")]
    Padding,
    #[error("encryption dictionary missing required keys or names an unsupported V/R combination")]
    InvalidEncryptionDict,
}

/// Raised by [`crate::pdf_string::PdfString::to_text_strict`] when the
/// payload's encoding doesn't parse cleanly (§4.3 testable property 6).
#[derive(Error, Debug)]
pub enum TextDecodeError {
    #[error("malformed UTF-16BE string: {0}")]
    InvalidUtf16(#[from] std::string::FromUtf16Error),
    #[error("malformed UTF-8 string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Unified error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Decryption(#[from] DecryptionError),
    #[error(transparent)]
    TextDecode(#[from] TextDecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
