//! Password-based encryption of file contents.
//!
//! Every call to [`Codec::encode`] draws a new salt and a new nonce, so the
//! same plaintext never encodes to the same blob twice. Keys are derived with
//! Argon2id and content is sealed with AES-256-GCM.

pub mod armor;

use crate::crypto::aead::{open_whole, seal_whole};
use crate::crypto::kdf::{KdfParams, derive_key};
use crate::crypto::nonce::{fresh_nonce, fresh_salt};
use crate::error::CodecError;

#[derive(Clone, Copy, Debug, Default)]
pub struct Codec {
    kdf: KdfParams,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default cost profile. Blobs are only readable by a codec
    /// built with the same profile.
    pub fn with_kdf(kdf: KdfParams) -> Self {
        Self { kdf }
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }

    pub fn encode(&self, plaintext: &[u8], password: &str) -> Result<String, CodecError> {
        let salt = fresh_salt()?;
        let nonce = fresh_nonce()?;
        let key = derive_key(password.as_bytes(), &salt, &self.kdf)?;
        let body = seal_whole(&key, &nonce, plaintext)?;
        Ok(armor::wrap(&salt, &nonce, &body))
    }

    pub fn decode(&self, blob: &str, password: &str) -> Result<Vec<u8>, CodecError> {
        let raw = armor::unwrap_text(blob)?;
        let sealed = armor::split(&raw)?;
        let key = derive_key(password.as_bytes(), sealed.salt, &self.kdf)?;
        open_whole(&key, sealed.nonce, sealed.body)
    }
}
