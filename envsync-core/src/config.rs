use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::candidates::CANDIDATES_FILE;
use crate::executor::DEFAULT_WORKERS;
use crate::store_factory::redact;

pub const DB_ENV: &str = "ENV_SYNC_DB";
pub const PASSWORD_ENV: &str = "ENV_SYNC_PASSWORD";
pub const STATE_DIR_NAME: &str = ".env-sync";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Resolved inputs of a run.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    pub database_url: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Root for files outside a repository with a remote.
    pub base: PathBuf,
    pub workers: usize,
    /// Holds the candidate list.
    pub state_dir: PathBuf,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            password: String::new(),
            base: PathBuf::from("."),
            workers: DEFAULT_WORKERS,
            state_dir: PathBuf::from(STATE_DIR_NAME),
        }
    }
}

impl fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSettings")
            .field("database_url", &redact(&self.database_url))
            .field("password", &"[REDACTED]")
            .field("base", &self.base)
            .field("workers", &self.workers)
            .field("state_dir", &self.state_dir)
            .finish()
    }
}

impl SyncSettings {
    pub fn candidates_path(&self) -> PathBuf {
        self.state_dir.join(CANDIDATES_FILE)
    }
}

/// Parse `30s`, `15m`, `1h`, `2h30m`. Units: `s`, `m`, `h`; at least one
/// component; the total must be non-zero.
pub fn parse_interval(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty interval".to_string());
    }
    let mut total = 0u64;
    let mut digits = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            other => return Err(format!("unknown unit '{other}' in '{text}'")),
        };
        let n: u64 = digits
            .parse()
            .map_err(|_| format!("missing number before '{c}' in '{text}'"))?;
        total = n
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| format!("interval '{text}' is too large"))?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(format!("missing unit after '{digits}' in '{text}' (use s, m or h)"));
    }
    if total == 0 {
        return Err("interval must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(total))
}
