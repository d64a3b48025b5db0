use std::future::Future;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use libsql::{Builder, Connection, Database, Row, Value};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::domain::{FileKey, FileRecord, NewRecord, RecordMeta, ScopeKey};
use crate::error::StoreError;
use crate::store::{CREATE_INDEX, CREATE_TABLE, RecordStore, TABLE};

const UPSERT: &str = "INSERT INTO env_files (repo_id, relative_path, contents, file_hash, file_modified_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
    ON CONFLICT (repo_id, relative_path)
    DO UPDATE SET
        contents = excluded.contents,
        file_hash = excluded.file_hash,
        file_modified_at = excluded.file_modified_at,
        updated_at = CURRENT_TIMESTAMP";

const SELECT_ONE: &str = "SELECT repo_id, relative_path, contents, file_hash, file_modified_at, created_at, updated_at
    FROM env_files WHERE repo_id = ?1 AND relative_path = ?2";

const SELECT_META: &str = "SELECT repo_id, relative_path, file_hash, file_modified_at, created_at, updated_at
    FROM env_files ORDER BY repo_id, relative_path";

/// libsql-backed store (Turso over HTTP, or a local database file).
///
/// The client is async; each call blocks the calling worker on a private
/// runtime. Remote connections are shared by all workers. A local file
/// connection is used by one caller at a time.
pub struct LibsqlStore {
    rt: Runtime,
    _db: Database,
    conn: Connection,
    serial: Option<Mutex<()>>,
}

impl LibsqlStore {
    pub fn connect_remote(url: String, auth_token: String) -> Result<Self, StoreError> {
        let rt = runtime()?;
        let db = rt
            .block_on(Builder::new_remote(url, auth_token).build())
            .map_err(|e| StoreError::backend("connect to database", e))?;
        Self::finish(rt, db, false)
    }

    pub fn open_local(path: &Path) -> Result<Self, StoreError> {
        let rt = runtime()?;
        let db = rt
            .block_on(Builder::new_local(path).build())
            .map_err(|e| StoreError::backend("open database file", e))?;
        Self::finish(rt, db, true)
    }

    fn finish(rt: Runtime, db: Database, local: bool) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::backend("connect to database", e))?;
        let store = Self {
            rt,
            _db: db,
            conn,
            serial: local.then(|| Mutex::new(())),
        };
        store.ping()?;
        Ok(store)
    }

    fn ping(&self) -> Result<(), StoreError> {
        self.run(async {
            let mut rows = self.conn.query("SELECT 1", ()).await?;
            rows.next().await?;
            Ok(())
        })
        .map_err(|e| StoreError::backend("ping database", e))
    }

    /// Column names of an existing `env_files`; empty when the table is absent.
    fn existing_columns(&self) -> Result<Vec<String>, StoreError> {
        let pragma = format!("PRAGMA table_info({TABLE})");
        self.run(async {
            let mut rows = self.conn.query(&pragma, ()).await?;
            let mut names = Vec::new();
            while let Some(row) = rows.next().await? {
                names.push(text(&row, 1)?);
            }
            Ok(names)
        })
        .map_err(|e| StoreError::backend("inspect table", e))
    }

    fn run<T>(&self, fut: impl Future<Output = libsql::Result<T>>) -> libsql::Result<T> {
        let _guard: Option<MutexGuard<'_, ()>> = self
            .serial
            .as_ref()
            .map(|m| m.lock().unwrap_or_else(|poisoned| poisoned.into_inner()));
        self.rt.block_on(fut)
    }
}

fn runtime() -> Result<Runtime, StoreError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("envsync-store")
        .enable_all()
        .build()
        .map_err(|e| StoreError::backend("start store runtime", e))
}

/// Columns are declared DATETIME/TEXT but remote replicas may hand back
/// other value types; render everything as text.
fn text(row: &Row, idx: i32) -> libsql::Result<String> {
    Ok(match row.get_value(idx)? {
        Value::Text(s) => s,
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
    })
}

impl RecordStore for LibsqlStore {
    fn init_schema(&self) -> Result<(), StoreError> {
        let columns = self.existing_columns()?;
        if !columns.is_empty() && !columns.iter().any(|c| c == "repo_id") {
            return Err(StoreError::LegacySchema);
        }
        self.run(async { self.conn.execute(CREATE_TABLE, ()).await })
            .map_err(|e| StoreError::backend("create table", e))?;
        if let Err(e) = self.run(async { self.conn.execute(CREATE_INDEX, ()).await }) {
            warn!(error = %e, "index creation skipped");
        }
        debug!("schema ready");
        Ok(())
    }

    fn get(&self, key: &FileKey) -> Result<Option<FileRecord>, StoreError> {
        let scope = key.scope.as_str().to_string();
        let path = key.relative_path.clone();
        self.run(async {
            let mut rows = self
                .conn
                .query(SELECT_ONE, libsql::params![scope, path])
                .await?;
            let Some(row) = rows.next().await? else {
                return Ok(None);
            };
            Ok(Some(FileRecord {
                key: FileKey::new(ScopeKey::from_stored(&text(&row, 0)?), text(&row, 1)?),
                encoded_blob: text(&row, 2)?,
                content_hash: text(&row, 3)?,
                content_modified_at: text(&row, 4)?,
                created_at: text(&row, 5)?,
                updated_at: text(&row, 6)?,
            }))
        })
        .map_err(|e| StoreError::backend("query env file", e))
    }

    fn upsert(&self, record: &NewRecord) -> Result<(), StoreError> {
        let params = libsql::params![
            record.key.scope.as_str().to_string(),
            record.key.relative_path.clone(),
            record.encoded_blob.clone(),
            record.content_hash.clone(),
            record.content_modified_at.clone(),
        ];
        self.run(async { self.conn.execute(UPSERT, params).await })
            .map(|_| ())
            .map_err(|e| StoreError::backend("upsert env file", e))
    }

    fn list(&self) -> Result<Vec<RecordMeta>, StoreError> {
        self.run(async {
            let mut rows = self.conn.query(SELECT_META, ()).await?;
            let mut out = Vec::new();
            while let Some(row) = rows.next().await? {
                out.push(RecordMeta {
                    key: FileKey::new(ScopeKey::from_stored(&text(&row, 0)?), text(&row, 1)?),
                    content_hash: text(&row, 2)?,
                    content_modified_at: text(&row, 3)?,
                    created_at: text(&row, 4)?,
                    updated_at: text(&row, 5)?,
                });
            }
            Ok(out)
        })
        .map_err(|e| StoreError::backend("list env files", e))
    }
}
