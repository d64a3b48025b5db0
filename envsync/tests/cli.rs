use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn env_sync(state: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_env-sync"))
        .arg("--state-dir")
        .arg(state)
        .args(args)
        .env_remove("ENV_SYNC_DB")
        .env_remove("ENV_SYNC_PASSWORD")
        .env_remove("ENV_SYNC_AUTH_TOKEN")
        .env("RUST_LOG", "off")
        .output()
        .expect("spawn env-sync")
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

#[test]
fn scan_list_sync_restore() {
    let work = tempfile::tempdir().unwrap();
    let state = work.path().join("state");
    let project = work.path().join("project");
    fs::create_dir_all(project.join("svc")).unwrap();
    fs::write(project.join(".env"), "ROOT=1\n").unwrap();
    fs::write(project.join("svc/.env.local"), "SVC=1\n").unwrap();

    let scan = env_sync(&state, &["scan", project.to_str().unwrap()]);
    assert!(scan.status.success(), "{scan:?}");
    assert!(stdout(&scan).contains("Found and saved 2 .env file(s)"));

    let list = env_sync(&state, &["list"]);
    assert!(stdout(&list).contains("Remembered 2 .env file(s):"));

    let db = format!("file:{}", work.path().join("envs.db").display());
    let base = project.to_str().unwrap();
    let common = ["--db", db.as_str(), "--password", "pw", "--base", base];

    let first = env_sync(&state, &[&["sync"][..], &common[..]].concat());
    assert!(first.status.success(), "{first:?}");
    assert!(stdout(&first).contains("↑ Uploaded (local newer):   2"));

    let second = env_sync(&state, &[&["--json", "sync"][..], &common[..]].concat());
    assert!(second.status.success());
    let report: serde_json::Value = serde_json::from_slice(&second.stdout).unwrap();
    assert_eq!(report["stats"]["skipped"], 2);

    let remote = env_sync(&state, &["remote", "--db", db.as_str()]);
    assert!(stdout(&remote).contains("svc/.env.local"));

    let out = work.path().join("restore");
    let restore = env_sync(
        &state,
        &["download", "--db", db.as_str(), "--password", "pw", "--output", out.to_str().unwrap()],
    );
    assert!(restore.status.success(), "{restore:?}");
    assert_eq!(
        fs::read_to_string(out.join("[local]/svc/.env.local")).unwrap(),
        "SVC=1\n"
    );

    // Hashes still match, so nothing needs decrypting.
    let other_pw = ["sync", "--db", db.as_str(), "--password", "nope", "--base", base];
    let wrong = env_sync(&state, &other_pw);
    assert!(wrong.status.success());
}

#[test]
fn sync_without_scan_exits_with_one() {
    let work = tempfile::tempdir().unwrap();
    let out = env_sync(
        &work.path().join("state"),
        &["sync", "--db", "memory:", "--password", "pw"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no env files found"));
}

#[test]
fn postgres_is_reported_as_unsupported() {
    let work = tempfile::tempdir().unwrap();
    let out = env_sync(&work.path().join("state"), &["remote", "--db", "postgres://u:p@h/db"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not supported"));
}
