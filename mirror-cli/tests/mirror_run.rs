//! End-to-end tests for `mirrorctl` with a shell script standing in for the
//! mirroring tool. The script honors the `/L` list-only flag and reads its
//! exit code from marker files inside each destination.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FAKE_TOOL: &str = r#"#!/bin/sh
# argv: <source> <dest> [flags...] — /L marks a dry run.
dest="$2"
simulate=no
for arg in "$@"; do
    [ "$arg" = "/L" ] && simulate=yes
done
if [ "$simulate" = "yes" ]; then
    [ -f "$dest/.dry-exit-code" ] && exit "$(cat "$dest/.dry-exit-code")"
    exit 0
fi
[ -f "$dest/.exit-code" ] && exit "$(cat "$dest/.exit-code")"
exit 0
"#;

struct Fixture {
    _root: TempDir,
    config: PathBuf,
    dests: Vec<PathBuf>,
    log_dir: PathBuf,
}

fn fixture(dest_count: usize, extra_config: &str) -> Fixture {
    let root = TempDir::new().expect("tempdir");

    let tool = root.path().join("fake-mirror-tool.sh");
    fs::write(&tool, FAKE_TOOL).expect("write tool");
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod tool");

    let source = root.path().join("source");
    fs::create_dir_all(&source).expect("mkdir source");
    fs::write(source.join("payload.txt"), "data").expect("seed source");

    let mut dests = Vec::new();
    for n in 1..=dest_count {
        let dest = root.path().join(format!("dest-{n}"));
        fs::create_dir_all(&dest).expect("mkdir dest");
        dests.push(dest);
    }

    let log_dir = root.path().join("logs");
    let dest_json: Vec<String> = dests
        .iter()
        .map(|d| format!("\"{}\"", d.display()))
        .collect();
    let config = root.path().join("mirror.json");
    fs::write(
        &config,
        format!(
            r#"{{
                "SourceDir": "{}",
                "DestDirs": [{}],
                "Exclusions": ["node_modules"],
                "ToolPath": "{}",
                "LogDir": "{}",
                "RetryDelaySeconds": 1
                {}
            }}"#,
            source.display(),
            dest_json.join(", "),
            tool.display(),
            log_dir.display(),
            extra_config,
        ),
    )
    .expect("write config");

    Fixture {
        _root: root,
        config,
        dests,
        log_dir,
    }
}

fn mirrorctl(fixture: &Fixture) -> Command {
    let mut cmd = Command::cargo_bin("mirrorctl").expect("binary built");
    cmd.arg("--config").arg(&fixture.config);
    cmd
}

fn log_contents(log_dir: &Path, stream: &str) -> String {
    fs::read_to_string(log_dir.join(format!("{stream}.log"))).unwrap_or_default()
}

#[test]
fn clean_run_exits_zero_and_writes_all_streams() {
    let fixture = fixture(2, "");

    mirrorctl(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains("mirror run completed"));

    let test_log = log_contents(&fixture.log_dir, "test");
    assert!(test_log.contains("[dry-run]"), "test log: {test_log}");

    let run_log = log_contents(&fixture.log_dir, "run");
    assert!(
        run_log.contains("mirrored successfully"),
        "run log: {run_log}"
    );
}

#[test]
fn dry_run_failure_exits_one_before_any_real_copy() {
    let fixture = fixture(2, "");
    fs::write(fixture.dests[0].join(".dry-exit-code"), "16").expect("marker");

    mirrorctl(&fixture)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("validation failed"));

    let error_log = log_contents(&fixture.log_dir, "error");
    assert!(error_log.contains("dry run failed"), "error log: {error_log}");

    // The real-run stream never opened: validation aborted the pass.
    assert!(!fixture.log_dir.join("run.log").exists());
}

#[test]
fn persistent_destination_failure_still_exits_zero() {
    let fixture = fixture(2, r#", "MaxRetries": 1"#);
    fs::write(fixture.dests[0].join(".exit-code"), "16").expect("marker");

    mirrorctl(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains("completed with failures"));

    let error_log = log_contents(&fixture.log_dir, "error");
    assert!(
        error_log.contains("retry budget exhausted"),
        "error log: {error_log}"
    );
}

#[test]
fn missing_config_file_exits_one() {
    let fixture = fixture(1, "");
    let mut cmd = Command::cargo_bin("mirrorctl").expect("binary built");
    cmd.arg("--config")
        .arg(fixture.config.with_extension("missing.json"));

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("loading config"));
}

#[test]
fn empty_dest_dirs_is_a_config_error() {
    let root = TempDir::new().expect("tempdir");
    let source = root.path().join("source");
    fs::create_dir_all(&source).expect("mkdir source");
    let config = root.path().join("mirror.json");
    fs::write(
        &config,
        format!(
            r#"{{ "SourceDir": "{}", "DestDirs": [], "Exclusions": [] }}"#,
            source.display()
        ),
    )
    .expect("write config");

    let mut cmd = Command::cargo_bin("mirrorctl").expect("binary built");
    cmd.arg("--config").arg(&config);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("destination"));
}
