//! Symmetric text encryption

mod text_encryptor;

pub use text_encryptor::{generate_key, CryptoError, TextEncryptor, KEY_LENGTH, NONCE_LENGTH};
