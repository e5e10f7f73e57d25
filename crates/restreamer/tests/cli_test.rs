//! Integration tests for the `restreamer` CLI binary.
//!
//! These cover argument parsing, help output, shell completions, local-only
//! commands and error exit codes, all without a live daemon.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `restreamer` binary with env isolation.
///
/// Clears all `RESTREAMER_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn restreamer_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("restreamer");
    cmd.env("HOME", "/tmp/restreamer-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/restreamer-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("RESTREAMER_PROFILE")
        .env_remove("RESTREAMER_URL")
        .env_remove("RESTREAMER_USERNAME")
        .env_remove("RESTREAMER_PASSWORD")
        .env_remove("RESTREAMER_OUTPUT")
        .env_remove("RESTREAMER_INSECURE")
        .env_remove("RESTREAMER_TIMEOUT")
        .env_remove("RESTREAMER_SERVICES_FILE");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn services_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"{
            "services": [
                {
                    "name": "Twitch",
                    "common": true,
                    "servers": [{ "name": "Auto", "url": "rtmp://live.twitch.tv/app" }]
                },
                {
                    "name": "Niche",
                    "servers": [{ "name": "EU", "url": "rtmp://eu.niche.example/live" }]
                }
            ]
        }"#,
    )
    .unwrap();
    file
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = restreamer_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    restreamer_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Restreamer")
            .and(predicate::str::contains("processes"))
            .and(predicate::str::contains("outputs"))
            .and(predicate::str::contains("playout")),
    );
}

#[test]
fn test_version_flag() {
    restreamer_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("restreamer"));
}

#[test]
fn test_subcommand_help_lists_actions() {
    restreamer_cmd()
        .args(["processes", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("create")
                .and(predicate::str::contains("restart"))
                .and(predicate::str::contains("probe")),
        );
}

#[test]
fn test_invalid_subcommand() {
    restreamer_cmd()
        .arg("transcode")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_invalid_output_format() {
    restreamer_cmd()
        .args(["--output", "xml", "ping"])
        .assert()
        .failure()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    restreamer_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    restreamer_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    restreamer_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("restreamer"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    restreamer_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_without_file() {
    restreamer_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_command_without_config_fails() {
    let output = restreamer_cmd().args(["processes", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("config init"),
        "Expected setup hint in output:\n{text}"
    );
}

#[test]
fn test_unknown_profile_fails() {
    let output = restreamer_cmd()
        .args(["--profile", "edge", "info"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("edge"));
}

// ── Validation before any network activity ──────────────────────────

#[test]
fn test_empty_process_id_is_usage_error() {
    restreamer_cmd()
        .args(["--url", "http://127.0.0.1:9", "processes", "get", ""])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("process id is required"));
}

#[test]
fn test_password_without_username_is_usage_error() {
    restreamer_cmd()
        .args(["--url", "http://127.0.0.1:9", "--password", "secret", "ping"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_encoding_set_without_flags_is_usage_error() {
    restreamer_cmd()
        .args([
            "--url",
            "http://127.0.0.1:9",
            "outputs",
            "encoding-set",
            "main",
            "youtube",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("nothing to change"));
}

#[test]
fn test_unreachable_daemon_is_connection_error() {
    restreamer_cmd()
        .args(["--url", "http://127.0.0.1:9", "--timeout", "3", "ping"])
        .assert()
        .failure()
        .code(7);
}

// ── Services catalog ────────────────────────────────────────────────

#[test]
fn test_services_list_plain() {
    let file = services_file();
    restreamer_cmd()
        .args(["--output", "plain", "services", "--file"])
        .arg(file.path())
        .arg("list")
        .assert()
        .success()
        .stdout("Twitch\nNiche\n");
}

#[test]
fn test_services_list_common_only() {
    let file = services_file();
    restreamer_cmd()
        .args(["--output", "plain", "services", "--file"])
        .arg(file.path())
        .args(["list", "--common"])
        .assert()
        .success()
        .stdout("Twitch\n");
}

#[test]
fn test_services_show_json() {
    let file = services_file();
    restreamer_cmd()
        .args(["--output", "json", "services", "--file"])
        .arg(file.path())
        .args(["show", "Twitch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rtmp://live.twitch.tv/app"));
}

#[test]
fn test_services_show_unknown() {
    let file = services_file();
    restreamer_cmd()
        .args(["services", "--file"])
        .arg(file.path())
        .args(["show", "twitch"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_services_missing_file() {
    restreamer_cmd()
        .args([
            "services",
            "--file",
            "/tmp/restreamer-cli-test-nonexistent/services.json",
            "list",
        ])
        .assert()
        .failure()
        .code(1);
}

// ── Multistream (local actions) ─────────────────────────────────────

#[test]
fn test_multistream_platforms_plain() {
    restreamer_cmd()
        .args(["--output", "plain", "multistream", "platforms"])
        .assert()
        .success()
        .stdout("twitch\nyoutube\nfacebook\nkick\ntiktok\ninstagram\nx\n");
}

#[test]
fn test_multistream_platforms_vertical_tiktok() {
    restreamer_cmd()
        .args(["--output", "json", "ms", "platforms", "--orientation", "vertical"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"rtmp://live.tiktok.com/live\"")
                .and(predicate::str::contains("live/horizontal").not()),
        );
}

#[test]
fn test_multistream_filter() {
    restreamer_cmd()
        .args(["multistream", "filter", "--from", "horizontal", "--to", "vertical"])
        .assert()
        .success()
        .stdout("crop=ih*9/16:ih,scale=1080:1920\n");

    restreamer_cmd()
        .args(["multistream", "filter", "--from", "square", "--to", "square"])
        .assert()
        .success()
        .stdout("-\n");
}
