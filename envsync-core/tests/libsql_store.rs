use envsync_core::domain::{FileKey, NewRecord, ScopeKey};
use envsync_core::error::StoreError;
use envsync_core::store::RecordStore;
use envsync_core::store_factory::{Backend, open_store};
use pretty_assertions::assert_eq;

fn record(scope: ScopeKey, path: &str, hash: &str) -> NewRecord {
    NewRecord {
        key: FileKey::new(scope, path),
        encoded_blob: format!("blob-{hash}"),
        content_hash: hash.into(),
        content_modified_at: "2024-02-03 04:05:06".into(),
    }
}

#[test]
fn local_database_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("envs.db");
    let url = format!("file:{}", db.display());
    let store = open_store(Backend::from_url(&url).unwrap()).unwrap();

    store.init_schema().unwrap();
    // Idempotent.
    store.init_schema().unwrap();

    let gh = ScopeKey::Remote("github.com/acme/api".into());
    assert_eq!(store.get(&FileKey::new(gh.clone(), ".env")).unwrap(), None);

    store.upsert(&record(gh.clone(), ".env", "h1")).unwrap();
    store.upsert(&record(ScopeKey::Local, "x/.env", "h2")).unwrap();
    store.upsert(&record(gh.clone(), ".env", "h3")).unwrap();

    let got = store
        .get(&FileKey::new(gh.clone(), ".env"))
        .unwrap()
        .unwrap();
    assert_eq!(got.content_hash, "h3");
    assert_eq!(got.encoded_blob, "blob-h3");
    assert_eq!(got.content_modified_at, "2024-02-03 04:05:06");
    assert!(!got.created_at.is_empty());

    let listed: Vec<_> = store
        .list()
        .unwrap()
        .into_iter()
        .map(|m| (m.key.scope, m.key.relative_path))
        .collect();
    assert_eq!(
        listed,
        vec![
            (ScopeKey::Local, "x/.env".to_string()),
            (gh, ".env".to_string()),
        ]
    );
}

#[test]
fn reopening_sees_previous_writes() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("file:{}", dir.path().join("envs.db").display());
    {
        let store = open_store(Backend::from_url(&url).unwrap()).unwrap();
        store.init_schema().unwrap();
        store.upsert(&record(ScopeKey::Local, ".env", "h")).unwrap();
    }
    let store = open_store(Backend::from_url(&url).unwrap()).unwrap();
    store.init_schema().unwrap();
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn path_keyed_table_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("old.db");
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async {
        let db = libsql::Builder::new_local(&file).build().await.unwrap();
        let conn = db.connect().unwrap();
        conn.execute(
            "CREATE TABLE env_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL UNIQUE,
                contents TEXT NOT NULL
            )",
            (),
        )
        .await
        .unwrap();
    });
    drop(rt);

    let url = format!("file:{}", file.display());
    let store = open_store(Backend::from_url(&url).unwrap()).unwrap();
    assert_eq!(store.init_schema(), Err(StoreError::LegacySchema));
}
