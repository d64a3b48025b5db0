mod common;

use std::fs;

use common::{PASSWORD, cheap_codec, mtime_of, write_with_mtime};
use envsync_core::domain::{FileKey, FileRecord, ScopeKey};
use envsync_core::reconcile::Action;
use envsync_core::report::{Discard, FileResult};
use envsync_core::stats::Stats;
use envsync_core::store::RecordStore;
use envsync_core::store_mem::MemoryStore;
use envsync_core::sync::sync_files;
use envsync_core::util::timestamp::format_stored;
use envsync_core::{Policy, SyncSettings};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const T0: OffsetDateTime = datetime!(2024-06-01 10:00:00 UTC);

fn settings(base: &TempDir, workers: usize) -> SyncSettings {
    SyncSettings {
        database_url: "memory:".into(),
        password: PASSWORD.into(),
        base: base.path().to_path_buf(),
        workers,
        state_dir: base.path().join("state"),
    }
}

fn three_files(dir: &TempDir) -> Vec<std::path::PathBuf> {
    vec![
        write_with_mtime(&dir.path().join("a/.env"), "A=1\n", T0),
        write_with_mtime(&dir.path().join("b/.env.local"), "B=2\n", T0),
        write_with_mtime(&dir.path().join("c/.env.production"), "C=3\n", T0),
    ]
}

fn snapshot(files: &[std::path::PathBuf]) -> Vec<(Vec<u8>, OffsetDateTime)> {
    files
        .iter()
        .map(|p| (fs::read(p).unwrap(), mtime_of(p)))
        .collect()
}

#[test]
fn empty_store_uploads_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let files = three_files(&dir);
    let store = MemoryStore::new();
    let codec = cheap_codec();

    let report = sync_files(
        &store,
        &files,
        &settings(&dir, 4),
        Policy::reconcile(),
        &codec,
        &mut Discard,
    )
    .unwrap();

    assert_eq!(
        report.stats,
        Stats {
            uploaded: 3,
            ..Stats::default()
        }
    );
    assert_eq!(store.len(), 3);
    let rec = store
        .get(&FileKey::new(ScopeKey::Local, "b/.env.local"))
        .unwrap()
        .unwrap();
    assert_eq!(rec.content_modified_at, format_stored(T0).unwrap());
    assert_eq!(codec.decode(&rec.encoded_blob, PASSWORD).unwrap(), b"B=2\n");
}

#[test]
fn identical_content_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_with_mtime(&dir.path().join(".env"), "SAME=1\n", T0);
    let store = MemoryStore::new();
    let codec = cheap_codec();
    let cfg = settings(&dir, 1);

    sync_files(&store, &[file.clone()], &cfg, Policy::reconcile(), &codec, &mut Discard).unwrap();
    // Touch the file far into the future: equal hashes still win.
    write_with_mtime(&file, "SAME=1\n", T0 + Duration::days(30));
    let report =
        sync_files(&store, &[file], &cfg, Policy::reconcile(), &codec, &mut Discard).unwrap();

    assert_eq!(
        report.stats,
        Stats {
            skipped: 1,
            ..Stats::default()
        }
    );
    assert_eq!(store.write_count(), 1);
}

#[test]
fn newer_remote_is_downloaded_with_its_mtime() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_with_mtime(&dir.path().join(".env"), "OLD=1\n", T0);
    let store = MemoryStore::new();
    let codec = cheap_codec();
    let remote_time = T0 + Duration::seconds(10);
    store
        .insert_record(FileRecord {
            key: FileKey::new(ScopeKey::Local, ".env"),
            encoded_blob: codec.encode(b"NEW=2\n", PASSWORD).unwrap(),
            content_hash: envsync_core::crypto::digest::content_hash(b"NEW=2\n"),
            content_modified_at: format_stored(remote_time).unwrap(),
            created_at: format_stored(T0).unwrap(),
            updated_at: format_stored(remote_time).unwrap(),
        })
        .unwrap();

    let mut lines: Vec<FileResult> = Vec::new();
    let report = sync_files(
        &store,
        &[file.clone()],
        &settings(&dir, 2),
        Policy::reconcile(),
        &codec,
        &mut lines,
    )
    .unwrap();

    assert_eq!(report.stats.downloaded, 1);
    assert_eq!(fs::read(&file).unwrap(), b"NEW=2\n");
    assert_eq!(mtime_of(&file).unix_timestamp(), remote_time.unix_timestamp());
    assert_eq!(store.write_count(), 0);
    match &lines[..] {
        [FileResult::Done(o)] => {
            assert_eq!(o.action, Action::Download);
            assert_eq!(o.note, None);
        }
        other => panic!("unexpected results: {other:?}"),
    }
}

#[test]
fn newer_local_is_uploaded_over_remote() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_with_mtime(&dir.path().join(".env"), "LOCAL=2\n", T0 + Duration::minutes(5));
    let store = MemoryStore::new();
    let codec = cheap_codec();
    store
        .insert_record(FileRecord {
            key: FileKey::new(ScopeKey::Local, ".env"),
            encoded_blob: codec.encode(b"REMOTE=1\n", PASSWORD).unwrap(),
            content_hash: "stale".into(),
            content_modified_at: format_stored(T0).unwrap(),
            created_at: format_stored(T0).unwrap(),
            updated_at: format_stored(T0).unwrap(),
        })
        .unwrap();

    let report = sync_files(
        &store,
        &[file],
        &settings(&dir, 1),
        Policy::reconcile(),
        &codec,
        &mut Discard,
    )
    .unwrap();

    assert_eq!(report.stats.uploaded, 1);
    let rec = store
        .get(&FileKey::new(ScopeKey::Local, ".env"))
        .unwrap()
        .unwrap();
    assert_eq!(codec.decode(&rec.encoded_blob, PASSWORD).unwrap(), b"LOCAL=2\n");
    assert_eq!(rec.created_at, format_stored(T0).unwrap());
}

#[test]
fn same_second_edits_keep_local_and_count_as_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_with_mtime(&dir.path().join(".env"), "MINE=1\n", T0);
    let store = MemoryStore::new();
    let codec = cheap_codec();
    store
        .insert_record(FileRecord {
            key: FileKey::new(ScopeKey::Local, ".env"),
            encoded_blob: codec.encode(b"THEIRS=1\n", PASSWORD).unwrap(),
            content_hash: "theirs".into(),
            content_modified_at: format_stored(T0).unwrap(),
            created_at: String::new(),
            updated_at: String::new(),
        })
        .unwrap();

    let report = sync_files(
        &store,
        &[file.clone()],
        &settings(&dir, 1),
        Policy::reconcile(),
        &codec,
        &mut Discard,
    )
    .unwrap();

    assert_eq!(
        report.stats,
        Stats {
            conflicted: 1,
            ..Stats::default()
        }
    );
    assert_eq!(fs::read(&file).unwrap(), b"MINE=1\n");
    assert_eq!(store.write_count(), 1);
}

#[test]
fn dry_run_decides_like_a_real_run_but_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let files = three_files(&dir);
    let before = snapshot(&files);
    let store = MemoryStore::new();
    let codec = cheap_codec();

    let mut lines: Vec<FileResult> = Vec::new();
    let report = sync_files(
        &store,
        &files,
        &settings(&dir, 3),
        Policy::dry_run(),
        &codec,
        &mut lines,
    )
    .unwrap();

    assert_eq!(report.stats.uploaded, 3);
    assert!(report.dry_run);
    assert_eq!(store.write_count(), 0);
    assert!(store.is_empty());
    assert_eq!(snapshot(&files), before);
    assert!(lines.iter().all(|l| l.line().ends_with("[DRY RUN]")));
}

#[test]
fn dry_run_never_touches_a_file_that_would_be_downloaded() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_with_mtime(&dir.path().join(".env"), "OLD=1\n", T0);
    let store = MemoryStore::new();
    let codec = cheap_codec();
    store
        .insert_record(FileRecord {
            key: FileKey::new(ScopeKey::Local, ".env"),
            encoded_blob: codec.encode(b"NEW=1\n", PASSWORD).unwrap(),
            content_hash: "new".into(),
            content_modified_at: format_stored(T0 + Duration::hours(1)).unwrap(),
            created_at: String::new(),
            updated_at: String::new(),
        })
        .unwrap();

    let report = sync_files(
        &store,
        &[file.clone()],
        &settings(&dir, 1),
        Policy::dry_run(),
        &codec,
        &mut Discard,
    )
    .unwrap();

    assert_eq!(report.stats.downloaded, 1);
    assert_eq!(fs::read(&file).unwrap(), b"OLD=1\n");
    assert_eq!(mtime_of(&file), T0);
}
