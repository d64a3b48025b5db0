use crate::crypto::aead::NONCE_LEN;
use crate::error::CodecError;

pub const SALT_LEN: usize = 16;

fn fill(buf: &mut [u8]) -> Result<(), CodecError> {
    getrandom::getrandom(buf).map_err(|e| CodecError::Random(e.to_string()))
}

/// Fresh KDF salt from the OS RNG. Called once per encode.
pub fn fresh_salt() -> Result<[u8; SALT_LEN], CodecError> {
    let mut salt = [0u8; SALT_LEN];
    fill(&mut salt)?;
    Ok(salt)
}

/// Fresh AEAD nonce from the OS RNG. Never cached or derived.
pub fn fresh_nonce() -> Result<[u8; NONCE_LEN], CodecError> {
    let mut nonce = [0u8; NONCE_LEN];
    fill(&mut nonce)?;
    Ok(nonce)
}
