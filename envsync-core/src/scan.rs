use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, SyncError};
use crate::util::paths::canonical;

const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor"];

/// `.env` itself or any `.env.<suffix>`.
pub fn is_env_file_name(name: &str) -> bool {
    name == ".env" || name.starts_with(".env.")
}

fn descend(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !(name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()))
}

/// Recursively collect env files under `root`, sorted and absolute.
/// Unreadable entries are skipped.
pub fn scan(root: &Path) -> Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(root).map_err(|_| SyncError::ScanRoot {
        path: root.to_path_buf(),
        message: "path does not exist".to_string(),
    })?;
    if !meta.is_dir() {
        return Err(SyncError::ScanRoot {
            path: root.to_path_buf(),
            message: "path is not a directory".to_string(),
        });
    }
    let root = canonical(root);

    let mut found = Vec::new();
    for entry in WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(descend)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                trace!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_env_file_name(&entry.file_name().to_string_lossy()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    debug!(root = %root.display(), count = found.len(), "scan finished");
    Ok(found)
}
