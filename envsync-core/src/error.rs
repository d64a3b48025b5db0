use std::path::PathBuf;

use thiserror::Error;

/// Failures of the encryption codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Tag mismatch on open: wrong password or tampered ciphertext.
    #[error("authentication failed (wrong password?)")]
    AuthenticationFailed,

    #[error("malformed blob: {0}")]
    Malformed(String),

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("random source unavailable: {0}")]
    Random(String),

    #[error("encryption failed")]
    Seal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unsupported database URL '{0}': use libsql://, https://, file: or memory:")]
    UnsupportedScheme(String),

    #[error("{backend} backends are not supported by this build")]
    UnsupportedBackend { backend: &'static str },

    #[error("failed to {op}: {message}")]
    Backend { op: &'static str, message: String },

    #[error("unrecognized timestamp '{value}' in stored record")]
    Timestamp { value: String },

    /// `env_files` predates repository scoping: keyed by `path`, no `repo_id`.
    #[error(
        "table env_files uses the old path-keyed layout (no repo_id column); \
         drop or rename it, then sync again"
    )]
    LegacySchema,
}

impl StoreError {
    pub fn backend(op: &'static str, err: impl std::fmt::Display) -> Self {
        StoreError::Backend {
            op,
            message: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to resolve identity for {path}: {reason}")]
    Resolution { path: PathBuf, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to decrypt: {0}")]
    Codec(#[from] CodecError),

    #[error("failed to {op} {path}: {source}")]
    LocalIo {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("candidate list {path}: {message}")]
    Candidates { path: PathBuf, message: String },

    #[error("no env files found. Run 'env-sync scan <path>' first")]
    NoCandidates,

    #[error("scan root {path}: {message}")]
    ScanRoot { path: PathBuf, message: String },

    #[error("worker pool: {0}")]
    Pool(String),

    #[error("cannot render output: {0}")]
    Output(String),
}

/// Coarse classification used by the run report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Resolution,
    Store,
    Authentication,
    LocalIo,
    Other,
}

impl SyncError {
    pub fn local_io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::LocalIo {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Resolution { .. } => ErrorKind::Resolution,
            SyncError::Store(_) => ErrorKind::Store,
            SyncError::Codec(CodecError::AuthenticationFailed) => ErrorKind::Authentication,
            SyncError::LocalIo { .. } => ErrorKind::LocalIo,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_authentication_failure(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, SyncError>;
