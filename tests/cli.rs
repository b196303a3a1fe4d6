use std::path::Path;
use std::process::{Command, Output};
use user_store::User;

fn user_store(data: &Path, env: &[(&str, &str)], args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_user-store"));
    cmd.env_remove("DATA_PATH")
        .env_remove("USER_STORE_WRITE_MODE")
        .env_remove("USER_STORE_PRETTY")
        .env("RUST_LOG", "off")
        .arg("--data-path")
        .arg(data);
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.args(args).output().unwrap()
}

fn create_args() -> [&'static str; 5] {
    ["create", "--name", "Ada", "--email", "a@x.com"]
}

// ---- environment config -------------------------------------------------------

#[test]
fn bad_write_mode_in_env_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("u.json");
    let out = user_store(
        &data,
        &[("USER_STORE_WRITE_MODE", "bogus"), ("USER_STORE_PRETTY", "0")],
        &create_args(),
    );
    assert_eq!(out.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown write mode"));
    assert!(!data.exists());
}

#[test]
fn bad_pretty_flag_in_env_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("u.json");
    let out = user_store(&data, &[("USER_STORE_PRETTY", "sometimes")], &create_args());
    assert_eq!(out.status.code(), Some(5));
    assert!(!data.exists());
}

#[test]
fn pretty_off_in_env_writes_compact_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("u.json");
    let out = user_store(
        &data,
        &[("USER_STORE_PRETTY", "0"), ("USER_STORE_WRITE_MODE", "in-place")],
        &create_args(),
    );
    assert!(out.status.success());
    let raw = std::fs::read_to_string(&data).unwrap();
    assert_eq!(raw.lines().count(), 1);
}

#[test]
fn data_path_comes_from_env_when_flag_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("from_env").join("u.json");
    let out = Command::new(env!("CARGO_BIN_EXE_user-store"))
        .env("DATA_PATH", &data)
        .env_remove("USER_STORE_WRITE_MODE")
        .env_remove("USER_STORE_PRETTY")
        .env("RUST_LOG", "off")
        .args(create_args())
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(data.is_file());
}

#[test]
fn compact_flag_overrides_env() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("u.json");
    let mut args = vec!["--compact"];
    args.extend(create_args());
    let out = user_store(&data, &[("USER_STORE_PRETTY", "1")], &args);
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(&data).unwrap().lines().count(), 1);
}

// ---- commands and exit codes --------------------------------------------------

#[test]
fn create_prints_the_new_user() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("u.json");
    let out = user_store(&data, &[], &create_args());
    assert!(out.status.success());
    let created: User = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(created.email, "a@x.com");

    let out = user_store(&data, &[], &["get", &created.id]);
    assert!(out.status.success());
    let fetched: User = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn exit_codes_per_error_kind() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("u.json");
    assert!(user_store(&data, &[], &create_args()).status.success());

    let conflict = user_store(&data, &[], &create_args());
    assert_eq!(conflict.status.code(), Some(4));

    let missing = user_store(&data, &[], &["delete", "ghost"]);
    assert_eq!(missing.status.code(), Some(3));

    let invalid = user_store(&data, &[], &["create", "--name", "Ada", "--email", "nope"]);
    assert_eq!(invalid.status.code(), Some(5));

    let usage = user_store(&data, &[], &["frobnicate"]);
    assert_eq!(usage.status.code(), Some(2));
}

#[test]
fn metrics_flag_dumps_counters() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("u.json");
    let mut args = vec!["--metrics"];
    args.extend(create_args());
    let out = user_store(&data, &[], &args);
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("user_api_users_created_total 1"));
    assert!(stderr.contains("user_api_users_total 1"));
}
