use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};

use crate::crypto::kdf::DerivedKey;
use crate::error::CodecError;

/// AES-GCM standard nonce size.
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Seal a whole buffer; output is `ciphertext ‖ tag`. No associated data.
pub fn seal_whole(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let aead = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CodecError::Seal)?;
    aead.encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| CodecError::Seal)
}

/// Open a whole buffer. Any tag mismatch is an authentication failure and
/// yields no plaintext.
pub fn open_whole(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let aead = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| CodecError::AuthenticationFailed)?;
    aead.decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CodecError::AuthenticationFailed)
}
