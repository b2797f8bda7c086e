//! Integration tests for the `tm` CLI.
//!
//! Each test points config and state at a temp directory, runs `tm` as a
//! subprocess, and checks stdout, stderr and the files left behind. Nothing
//! here needs a live server: requests go to a closed local port.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

/// Nothing listens on the discard port, so connections are refused at once.
const DEAD_SERVER: &str = "http://127.0.0.1:9/api/";

/// Get the path to the built `tm` binary.
fn tm_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tm");
    path
}

/// Run `tm` with config and state isolated under `root`.
fn tm(root: &Path, args: &[&str]) -> Output {
    Command::new(tm_bin())
        .args(args)
        .env("TASKMATE_CONFIG", root.join("config.toml"))
        .env("XDG_STATE_HOME", root.join("state"))
        .env("HOME", root)
        .env_remove("TASKMATE_BASE_URL")
        .env_remove("TASKMATE_PASSWORD")
        .env_remove("TASKMATE_LOG")
        .output()
        .expect("failed to run tm")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tm(tmp.path(), &["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for cmd in ["login", "register", "logout", "whoami", "list", "add", "edit", "done", "delete", "config"] {
        assert!(text.contains(cmd), "help is missing {cmd}:\n{text}");
    }
}

#[test]
fn config_shows_defaults_without_a_file() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tm(tmp.path(), &["config"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("base_url: http://localhost:8000/api/"));
    assert!(!tmp.path().join("config.toml").exists());
}

#[test]
fn config_path_prints_location() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tm(tmp.path(), &["config", "--path"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        tmp.path().join("config.toml").display().to_string()
    );
}

#[test]
fn set_base_url_persists_and_keeps_comments() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config.toml");
    fs::write(
        &config,
        "# my settings\n[server]\nbase_url = \"http://old/api/\"\n\n[ui]\nshow_key_hints = false\n",
    )
    .unwrap();

    let output = tm(
        tmp.path(),
        &["config", "--set-base-url", "https://tasks.example.com/api"],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let written = fs::read_to_string(&config).unwrap();
    assert!(written.starts_with("# my settings"));
    assert!(written.contains("show_key_hints = false"));

    let output = tm(tmp.path(), &["config", "--json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(
        json["server"]["base_url"],
        serde_json::json!("https://tasks.example.com/api/")
    );
}

#[test]
fn set_base_url_rejects_garbage() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tm(tmp.path(), &["config", "--set-base-url", "not a url"]);
    assert!(!output.status.success());
    assert!(stderr(&output).starts_with("error:"));
    assert!(!tmp.path().join("config.toml").exists());
}

#[test]
fn whoami_without_server_is_anonymous() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tm(tmp.path(), &["--base-url", DEAD_SERVER, "whoami"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "anonymous");
    assert!(!tmp.path().join("state/taskmate/session.json").exists());
}

#[test]
fn list_against_dead_server_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tm(tmp.path(), &["--base-url", DEAD_SERVER, "list"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("error: Failed to fetch tasks"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn edit_without_changes_fails_before_any_request() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tm(tmp.path(), &["--base-url", DEAD_SERVER, "edit", "3"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!stderr(&output).contains("Failed to fetch tasks"));
}

#[test]
fn login_without_password_source_fails() {
    let tmp = tempfile::tempdir().unwrap();
    // stdin is closed, so the prompt reads nothing
    let output = Command::new(tm_bin())
        .args(["--base-url", DEAD_SERVER, "login", "ada"])
        .env("TASKMATE_CONFIG", tmp.path().join("config.toml"))
        .env("XDG_STATE_HOME", tmp.path().join("state"))
        .env_remove("TASKMATE_PASSWORD")
        .stdin(std::process::Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(!tmp.path().join("state/taskmate/session.json").exists());
}
