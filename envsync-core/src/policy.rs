use serde::{Deserialize, Serialize};

/// How a run treats the remote side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Decide per file from hashes and timestamps.
    #[default]
    Reconcile,
    /// Push every file regardless of the remote record.
    ForcePush,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub direction: Direction,
    /// Decide and report only; no store writes, no disk writes.
    pub dry_run: bool,
}

impl Policy {
    pub fn reconcile() -> Self {
        Self::default()
    }

    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    pub fn force_push() -> Self {
        Self {
            direction: Direction::ForcePush,
            dry_run: false,
        }
    }
}
