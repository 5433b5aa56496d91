//! Secret decryption.
//!
//! A [`Crypter`] turns recorded ciphertext back into the serialized JSON of
//! the secret's inner value. Extraction only asks for decryption when the
//! caller requested revealed output; the hidden path never reaches a crypter,
//! so [`RefusingCrypter`] is always safe to pass when not revealing.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Failure to turn ciphertext into plaintext.
///
/// Messages never include the ciphertext or any partial plaintext.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CrypterError {
    /// No decryption capability was configured for this snapshot.
    #[error("secrets cannot be decrypted: no secrets provider is configured")]
    Unavailable,
    /// The ciphertext could not be decoded by this crypter.
    #[error("secret ciphertext is malformed for the '{provider}' secrets provider")]
    Malformed { provider: &'static str },
}

/// Decrypts secret ciphertext recorded in a snapshot.
pub trait Crypter {
    /// Decrypts `ciphertext` into the JSON encoding of the secret value.
    fn decrypt(&self, ciphertext: &str) -> Result<String, CrypterError>;
}

impl<T: Crypter + ?Sized> Crypter for &T {
    fn decrypt(&self, ciphertext: &str) -> Result<String, CrypterError> {
        (**self).decrypt(ciphertext)
    }
}

impl<T: Crypter + ?Sized> Crypter for Box<T> {
    fn decrypt(&self, ciphertext: &str) -> Result<String, CrypterError> {
        (**self).decrypt(ciphertext)
    }
}

// =============================================================================
// RefusingCrypter
// =============================================================================

/// A crypter that rejects every decryption request.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefusingCrypter;

impl Crypter for RefusingCrypter {
    fn decrypt(&self, _ciphertext: &str) -> Result<String, CrypterError> {
        Err(CrypterError::Unavailable)
    }
}

// =============================================================================
// Base64Crypter
// =============================================================================

/// The `b64` secrets provider: ciphertext is the standard base64 encoding of
/// the plaintext.
#[derive(Clone, Copy, Debug, Default)]
pub struct Base64Crypter;

impl Base64Crypter {
    pub const PROVIDER: &'static str = "b64";

    /// Encodes `plaintext` the way this provider records it.
    #[must_use]
    pub fn encrypt(&self, plaintext: &str) -> String {
        STANDARD.encode(plaintext)
    }
}

impl Crypter for Base64Crypter {
    fn decrypt(&self, ciphertext: &str) -> Result<String, CrypterError> {
        let malformed = CrypterError::Malformed {
            provider: Self::PROVIDER,
        };
        let bytes = STANDARD.decode(ciphertext).map_err(|_| malformed.clone())?;
        String::from_utf8(bytes).map_err(|_| malformed)
    }
}
