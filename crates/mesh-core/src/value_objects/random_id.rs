//! Random identifier generation

use rand::Rng;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const NUMERIC: &[u8] = b"0123456789";

/// Length of identifiers produced by [`generate_request_id`]
pub const REQUEST_ID_LENGTH: usize = 16;

fn random_from(charset: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

/// Generate a random string of `[A-Za-z0-9]` characters
pub fn random_alphanumeric(len: usize) -> String {
    random_from(ALPHANUMERIC, len)
}

/// Generate a random string of decimal digits
///
/// Leading zeros are kept, so the result is always exactly `len` characters.
pub fn random_numeric(len: usize) -> String {
    random_from(NUMERIC, len)
}

/// Generate an identifier for correlating a request across services
pub fn generate_request_id() -> String {
    random_alphanumeric(REQUEST_ID_LENGTH)
}
