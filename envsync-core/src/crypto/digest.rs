use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

/// SHA-256 of the plaintext, standard base64. Used for equality checks only,
/// so records can be compared without the password.
pub fn content_hash(plaintext: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(plaintext))
}
