//! Maps a file on disk to its `(scope, relative_path)` identity.
//!
//! Files inside a git working copy with an `origin` remote are keyed by the
//! normalized remote, so clones of the same repository on different machines
//! share records. Everything else is keyed relative to a caller-supplied base
//! directory under the [`ScopeKey::Local`] sentinel.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use git2::Repository;
use regex::Regex;
use tracing::trace;

use crate::domain::{FileKey, ScopeKey};
use crate::error::{Result, SyncError};
use crate::util::paths::{canonical, relative_slash};

const ORIGIN: &str = "origin";

// scheme://[user[:pass]@]host[:port]/path
static URL_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:[a-z][a-z0-9+.-]*)://(?:[^@/]*@)?([^/:]+)(?::\d*)?/+(.+)$")
        .unwrap_or_else(|e| panic!("remote url pattern: {e}"))
});

// user@host:owner/repo (scp-like)
static SCP_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^@/]+@)?([^/:]+):/*([^/].*)$")
        .unwrap_or_else(|e| panic!("scp url pattern: {e}"))
});

/// A git working copy that has an `origin` remote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkingCopy {
    pub root: PathBuf,
    pub remote_url: String,
}

/// Local-only probe: discovers the repository containing `dir` and reads the
/// origin URL from its config. `None` when there is no repository, it is
/// bare, or it has no usable origin.
pub fn probe_working_copy(dir: &Path) -> Option<WorkingCopy> {
    let repo = Repository::discover(dir).ok()?;
    let root = canonical(repo.workdir()?);
    let remote = repo.find_remote(ORIGIN).ok()?;
    let url = remote.url()?.trim().to_string();
    if url.is_empty() {
        return None;
    }
    Some(WorkingCopy {
        root,
        remote_url: url,
    })
}

/// Canonical `host/owner/repo` for the many spellings of one remote.
///
/// ```
/// use envsync_core::identity::normalize_remote_url;
/// assert_eq!(normalize_remote_url("git@github.com:acme/api.git"), "github.com/acme/api");
/// assert_eq!(normalize_remote_url("https://github.com/acme/api"), "github.com/acme/api");
/// ```
pub fn normalize_remote_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');

    if let Some(c) = URL_FORM.captures(trimmed) {
        return format!("{}/{}", &c[1], &c[2]);
    }
    // Windows drive paths look scp-like ("C:/repos/x"); leave local paths alone.
    let looks_local = trimmed.contains("://")
        || trimmed.starts_with('/')
        || trimmed.starts_with('.')
        || (trimmed.as_bytes().get(1) == Some(&b':') && !trimmed.contains('@'));
    if !looks_local {
        if let Some(c) = SCP_FORM.captures(trimmed) {
            return format!("{}/{}", &c[1], &c[2]);
        }
    }
    trimmed.to_string()
}

/// Resolve the identity of `path`; `base` is used for files outside a
/// repository with a remote.
pub fn resolve(path: &Path, base: &Path) -> Result<FileKey> {
    let file = canonical(path);
    let dir = file.parent().unwrap_or(&file);

    if let Some(wc) = probe_working_copy(dir) {
        if let Some(rel) = relative_slash(&file, &wc.root) {
            let scope = ScopeKey::Remote(normalize_remote_url(&wc.remote_url));
            trace!(path = %path.display(), %scope, "resolved via git remote");
            return Ok(FileKey::new(scope, rel));
        }
    }

    let base = canonical(base);
    relative_slash(&file, &base)
        .map(|rel| FileKey::new(ScopeKey::Local, rel))
        .ok_or_else(|| SyncError::Resolution {
            path: path.to_path_buf(),
            reason: format!(
                "not in a git repository with an origin remote and not under {}",
                base.display()
            ),
        })
}
