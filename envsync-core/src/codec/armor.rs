//! Byte layout of an encoded blob and its text wrapping.
//!
//! ```text
//! base64( salt[16] ‖ nonce[12] ‖ ciphertext ‖ tag[16] )
//! ```

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::crypto::aead::{NONCE_LEN, TAG_LEN};
use crate::crypto::nonce::SALT_LEN;
use crate::error::CodecError;

pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;
pub const MIN_BLOB_LEN: usize = HEADER_LEN + TAG_LEN;

/// Borrowed view over a decoded blob.
pub struct Sealed<'a> {
    pub salt: &'a [u8; SALT_LEN],
    pub nonce: &'a [u8; NONCE_LEN],
    /// Ciphertext with the tag appended.
    pub body: &'a [u8],
}

pub fn wrap(salt: &[u8; SALT_LEN], nonce: &[u8; NONCE_LEN], body: &[u8]) -> String {
    let mut raw = Vec::with_capacity(HEADER_LEN + body.len());
    raw.extend_from_slice(salt);
    raw.extend_from_slice(nonce);
    raw.extend_from_slice(body);
    STANDARD.encode(raw)
}

pub fn unwrap_text(blob: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(blob.trim())
        .map_err(|e| CodecError::Malformed(format!("invalid base64: {e}")))
}

pub fn split(raw: &[u8]) -> Result<Sealed<'_>, CodecError> {
    if raw.len() < MIN_BLOB_LEN {
        return Err(CodecError::Malformed(format!(
            "too short: {} bytes, need at least {MIN_BLOB_LEN}",
            raw.len()
        )));
    }
    let (salt, rest) = raw.split_at(SALT_LEN);
    let (nonce, body) = rest.split_at(NONCE_LEN);
    Ok(Sealed {
        salt: salt
            .try_into()
            .map_err(|_| CodecError::Malformed("salt".into()))?,
        nonce: nonce
            .try_into()
            .map_err(|_| CodecError::Malformed("nonce".into()))?,
        body,
    })
}
