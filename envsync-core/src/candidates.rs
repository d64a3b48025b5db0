use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

pub const CANDIDATES_FILE: &str = "env-files.json";

/// Files remembered by the last scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateList {
    pub files: Vec<PathBuf>,
}

impl CandidateList {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    /// A missing file is an empty list.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(candidates_error(path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| candidates_error(path, e))
    }

    /// Replace the stored list, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| candidates_error(path, e))?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|e| candidates_error(path, e))?;
        fs::write(path, json).map_err(|e| candidates_error(path, e))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

fn candidates_error(path: &Path, err: impl std::fmt::Display) -> SyncError {
    SyncError::Candidates {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
