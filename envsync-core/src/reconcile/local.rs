use std::fs;
use std::path::Path;

use crate::crypto::digest::content_hash;
use crate::domain::{FileKey, LocalFile};
use crate::error::{Result, SyncError};
use crate::util::timestamp::modified_at;

impl LocalFile {
    /// Stat and read `path` for one pass. The mtime is taken before the read
    /// so a concurrent edit shows up as newer on the next run.
    pub fn load(path: &Path, key: FileKey) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| SyncError::local_io("stat", path, e))?;
        if !meta.is_file() {
            return Err(SyncError::local_io(
                "read",
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        let modified_at = modified_at(&meta).map_err(|e| SyncError::local_io("stat", path, e))?;
        let plaintext = fs::read(path).map_err(|e| SyncError::local_io("read", path, e))?;
        Ok(Self {
            absolute_path: path.to_path_buf(),
            key,
            content_hash: content_hash(&plaintext),
            plaintext,
            modified_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScopeKey;
    use crate::error::ErrorKind;

    #[test]
    fn loads_bytes_hash_and_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join(".env");
        fs::write(&p, b"A=1\n").unwrap();
        let f = LocalFile::load(&p, FileKey::new(ScopeKey::Local, ".env")).unwrap();
        assert_eq!(f.plaintext, b"A=1\n");
        assert_eq!(f.content_hash, content_hash(b"A=1\n"));
        assert_eq!(f.absolute_path, p);
    }

    #[test]
    fn missing_file_is_local_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFile::load(
            &dir.path().join("gone"),
            FileKey::new(ScopeKey::Local, "gone"),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LocalIo);
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFile::load(dir.path(), FileKey::new(ScopeKey::Local, "d")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LocalIo);
    }
}
