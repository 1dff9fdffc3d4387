//! AES-256-GCM text encryption
//!
//! Ciphertexts are `base64(nonce || ciphertext)` with a fresh random
//! 12-byte nonce per message, so encrypting the same text twice yields
//! different output.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use std::fmt;

/// Key length in bytes
pub const KEY_LENGTH: usize = 32;

/// Nonce length in bytes
pub const NONCE_LENGTH: usize = 12;

/// Encryption errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Invalid ciphertext encoding: {0}")]
    Encoding(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),
}

impl CryptoError {
    /// Check if the error was caused by the input rather than the key or cipher
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::Decryption(_))
    }
}

/// Encrypts and decrypts UTF-8 text with a shared 256-bit key
#[derive(Clone)]
pub struct TextEncryptor {
    cipher: Aes256Gcm,
}

impl TextEncryptor {
    /// Create an encryptor from raw key bytes
    ///
    /// # Errors
    /// Returns `CryptoError::InvalidKey` unless the key is exactly 32 bytes
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_LENGTH {
            return Err(CryptoError::InvalidKey(format!(
                "Key must be {KEY_LENGTH} bytes, got {}",
                key.len()
            )));
        }

        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        Ok(Self { cipher })
    }

    /// Create an encryptor from a base64-encoded key
    ///
    /// # Errors
    /// Returns `CryptoError::InvalidKey` if the key is not valid base64 or has the wrong length
    pub fn from_base64_key(key: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(key.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("Invalid base64 key: {e}")))?;
        Self::new(&bytes)
    }

    /// Encrypt text, returning base64 of nonce followed by ciphertext
    ///
    /// # Errors
    /// Returns `CryptoError::Encryption` if the cipher rejects the input
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut output = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend(ciphertext);

        Ok(BASE64.encode(output))
    }

    /// Decrypt a value produced by [`TextEncryptor::encrypt`]
    ///
    /// # Errors
    /// Returns `CryptoError::Encoding` for malformed input and
    /// `CryptoError::Decryption` if authentication fails
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let data = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Encoding(e.to_string()))?;

        if data.len() < NONCE_LENGTH {
            return Err(CryptoError::Encoding(format!(
                "Ciphertext shorter than {NONCE_LENGTH}-byte nonce"
            )));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LENGTH);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::Encoding(e.to_string()))
    }
}

impl fmt::Debug for TextEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextEncryptor").finish_non_exhaustive()
    }
}

/// Generate a random base64-encoded 256-bit key
#[must_use]
pub fn generate_key() -> String {
    let mut key = [0u8; KEY_LENGTH];
    OsRng.fill_bytes(&mut key);
    BASE64.encode(key)
}
