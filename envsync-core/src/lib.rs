#![forbid(unsafe_code)]

pub mod error;
pub mod policy;

pub mod util {
    pub mod paths;
    pub mod timestamp;
}

pub mod codec;

pub mod crypto {
    pub mod aead;
    pub mod digest;
    pub mod kdf;
    pub mod nonce;
}

pub mod domain;
pub mod identity;

pub mod store;
pub mod store_factory;
pub mod store_libsql;
pub mod store_mem;

pub mod reconcile;
pub mod stats;

pub mod executor;
pub mod report;

pub mod candidates;
pub mod config;
pub mod scan;
pub mod sync;
pub mod transfer;

// Re-exports: stable API surface
pub use candidates::CandidateList;
pub use codec::Codec;
pub use config::{SyncSettings, parse_interval};
pub use domain::{FileKey, FileRecord, RecordMeta, ScopeKey};
pub use error::{CodecError, ErrorKind, Result, StoreError, SyncError};
pub use executor::Executor;
pub use policy::{Direction, Policy};
pub use reconcile::{Action, decide};
pub use report::{ConsoleSink, Discard, ResultSink, RunReport, RunStatus};
pub use scan::scan;
pub use store::RecordStore;
pub use store_factory::{Backend, open_store, open_store_url};
pub use sync::run_sync;
pub use transfer::restore_all;
