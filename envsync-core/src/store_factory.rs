use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StoreError;
use crate::store::RecordStore;
use crate::store_libsql::LibsqlStore;
use crate::store_mem::MemoryStore;

pub const AUTH_TOKEN_ENV: &str = "ENV_SYNC_AUTH_TOKEN";

/// Concrete backend selected from a connection string.
#[derive(Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    LibsqlRemote { url: String, auth_token: String },
    LibsqlLocal { path: PathBuf },
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Memory => f.write_str("Memory"),
            Backend::LibsqlRemote { url, .. } => f
                .debug_struct("LibsqlRemote")
                .field("url", url)
                .field("auth_token", &"[REDACTED]")
                .finish(),
            Backend::LibsqlLocal { path } => {
                f.debug_struct("LibsqlLocal").field("path", path).finish()
            }
        }
    }
}

impl Backend {
    /// `libsql://`, `http(s)://` → remote libsql (token from `?authToken=` or
    /// `ENV_SYNC_AUTH_TOKEN`), `file:` → local database file, `memory:` →
    /// in-process store.
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        let url = url.trim();
        let lower = url.to_ascii_lowercase();
        if lower.starts_with("libsql://")
            || lower.starts_with("http://")
            || lower.starts_with("https://")
        {
            let (base, token) = split_auth_token(url);
            let auth_token = token
                .or_else(|| std::env::var(AUTH_TOKEN_ENV).ok())
                .unwrap_or_default();
            return Ok(Backend::LibsqlRemote {
                url: base,
                auth_token,
            });
        }
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            return Err(StoreError::UnsupportedBackend {
                backend: "PostgreSQL",
            });
        }
        if let Some(rest) = url.strip_prefix("file:") {
            let path = rest.strip_prefix("//").unwrap_or(rest);
            if path.is_empty() {
                return Err(StoreError::UnsupportedScheme(url.to_string()));
            }
            return Ok(Backend::LibsqlLocal {
                path: PathBuf::from(path),
            });
        }
        if lower == "memory:" || lower == "memory://" {
            return Ok(Backend::Memory);
        }
        Err(StoreError::UnsupportedScheme(redact(url)))
    }
}

/// Split `authToken` out of the query string; other parameters stay.
fn split_auth_token(url: &str) -> (String, Option<String>) {
    let Some((base, query)) = url.split_once('?') else {
        return (url.to_string(), None);
    };
    let mut token = None;
    let mut rest = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some(("authToken", v)) => token = Some(v.to_string()),
            _ => rest.push(pair),
        }
    }
    let base = if rest.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", rest.join("&"))
    };
    (base, token)
}

/// Connection strings carry credentials; keep errors printable.
pub fn redact(url: &str) -> String {
    let cut = url.find('?').unwrap_or(url.len()).min(50);
    let mut shown: String = url.chars().take(cut).collect();
    if shown.len() < url.len() {
        shown.push_str("...");
    }
    shown
}

pub fn open_store(backend: Backend) -> Result<Arc<dyn RecordStore>, StoreError> {
    match backend {
        Backend::Memory => Ok(Arc::new(MemoryStore::new())),
        Backend::LibsqlRemote { url, auth_token } => {
            Ok(Arc::new(LibsqlStore::connect_remote(url, auth_token)?))
        }
        Backend::LibsqlLocal { path } => Ok(Arc::new(LibsqlStore::open_local(&path)?)),
    }
}

pub fn open_store_url(url: &str) -> Result<Arc<dyn RecordStore>, StoreError> {
    open_store(Backend::from_url(url)?)
}
