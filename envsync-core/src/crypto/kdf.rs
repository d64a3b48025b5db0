use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CodecError;

pub const KEY_LEN: usize = 32;

/// Argon2id cost profile. Encoder and decoder must use the same profile; it
/// is not recorded in the blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub lanes: u32,
}

impl Default for KdfParams {
    /// 64 MiB, one pass, four lanes.
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 1,
            lanes: 4,
        }
    }
}

impl KdfParams {
    pub const fn new(memory_kib: u32, iterations: u32, lanes: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            lanes,
        }
    }
}

/// 32-byte key, wiped on drop.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

pub fn derive_key(password: &[u8], salt: &[u8], params: &KdfParams) -> Result<DerivedKey, CodecError> {
    let p = Params::new(
        params.memory_kib,
        params.iterations,
        params.lanes,
        Some(KEY_LEN),
    )
    .map_err(|e| CodecError::Kdf(e.to_string()))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, p);
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    argon
        .hash_password_into(password, salt, &mut out[..])
        .map_err(|e| CodecError::Kdf(e.to_string()))?;
    Ok(DerivedKey(out))
}
