//! End-to-end tests for the regress CLI
//!
//! These tests run the built binary against stub test executables (small
//! shell scripts) placed in a temporary `--dirpath` directory, then check
//! exit codes, stage logs, and which stubs were spawned.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

const PASS: &str = "[  PASSED  ] 1 test.";

/// Stub test binary: records its invocation, then prints `$<NAME>_OUT`
/// (default: the gtest pass line). Recovery phases are gated on exit status.
const STUB: &str = r#"#!/bin/sh
name=$(basename "$0")
echo "$name $*" >> "$(dirname "$0")/calls.txt"
case "$1" in
  --gtest_filter=*abort_random*) exit 134 ;;
  --gtest_filter=*recovery_random*) exit "${RECOVERY_EXIT:-0}" ;;
  --gtest_filter=*vol_del*) printf '%s\n' "${VOL_DEL_OUT:-[  PASSED  ] 1 test.}"; exit 0 ;;
esac
case "$name" in
  test_volume) printf '%s\n' "${NORMAL_OUT:-[  PASSED  ] 1 test.}" ;;
  test_load) printf '%s\n' "${LOAD_OUT:-[  PASSED  ] 1 test.}" ;;
  test_mapping) printf '%s\n' "${MAPPING_OUT:-[  PASSED  ] 1 test.}" ;;
esac
exit "${STUB_EXIT:-0}"
"#;

/// Test context with a stub binary directory, log directory and config
struct TestContext {
    _temp: tempfile::TempDir,
    bin_dir: PathBuf,
    log_dir: PathBuf,
    config_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let bin_dir = temp.path().join("bin");
        let log_dir = temp.path().join("logs");
        fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");

        for name in ["test_volume", "test_load", "test_mapping"] {
            let path = bin_dir.join(name);
            fs::write(&path, STUB).expect("Failed to write stub");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("Failed to chmod stub");
        }

        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            format!(
                r#"
[notify]
enabled = false

[logs]
dir = "{}"

[sequence]
settle_secs = 0
"#,
                log_dir.display()
            ),
        )
        .expect("Failed to write config");

        Self {
            _temp: temp,
            bin_dir,
            log_dir,
            config_path,
        }
    }

    /// Run regress with the given arguments and extra environment
    fn run(&self, args: &[&str], env: &[(&str, &str)]) -> RunOutput {
        let mut dirpath = self.bin_dir.display().to_string();
        dirpath.push('/');

        let output = Command::new(env!("CARGO_BIN_EXE_regress"))
            .args(["--config", self.config_path.to_str().unwrap()])
            .args(["--dirpath", &dirpath])
            .args(args)
            .envs(env.iter().copied())
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to run regress");

        RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        }
    }

    /// Append raw TOML to the config file
    fn append_config(&self, extra: &str) {
        let mut config = fs::read_to_string(&self.config_path).expect("Failed to read config");
        config.push_str(extra);
        fs::write(&self.config_path, config).expect("Failed to write config");
    }

    /// Stub invocations, one `"<program> <args>"` line each
    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.bin_dir.join("calls.txt"))
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    fn programs(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.split_whitespace().next().unwrap_or_default().to_string())
            .collect()
    }

    fn log(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.log_dir.join(name)).ok()
    }
}

#[derive(Debug)]
struct RunOutput {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

fn assert_code(out: &RunOutput, expected: i32) {
    assert_eq!(
        out.code,
        Some(expected),
        "unexpected exit status\nstdout: {}\nstderr: {}",
        out.stdout,
        out.stderr
    );
}

// ============== Tests ==============

#[test]
fn test_no_mode_is_noop() {
    let ctx = TestContext::new();
    let out = ctx.run(&[], &[]);

    assert_code(&out, 0);
    assert!(ctx.calls().is_empty());
}

#[test]
fn test_empty_mode_is_noop() {
    let ctx = TestContext::new();
    let out = ctx.run(&["-t", ""], &[]);

    assert_code(&out, 0);
    assert!(ctx.calls().is_empty());
}

#[test]
fn test_unknown_mode_is_usage_error() {
    let ctx = TestContext::new();

    for mode in ["Normal", "unknown"] {
        let out = ctx.run(&["-t", mode], &[]);
        assert_code(&out, 2);
        assert!(out.stderr.contains("Unknown test suite"), "stderr: {}", out.stderr);
    }
    assert!(ctx.calls().is_empty());
}

#[test]
fn test_single_stage_writes_log() {
    let ctx = TestContext::new();
    let out = ctx.run(&["-t", "normal"], &[]);

    assert_code(&out, 0);
    assert_eq!(
        ctx.calls(),
        ["test_volume --run_time=12000 --max_num_writes=5000000"]
    );
    assert_eq!(ctx.log("log_normal.txt").as_deref(), Some("[  PASSED  ] 1 test.\n"));
    assert!(out.stdout.contains("Regression Passed"));
}

#[test]
fn test_single_stage_failure_exit_code() {
    let ctx = TestContext::new();
    let out = ctx.run(&["--test_suits", "vol_del"], &[("VOL_DEL_OUT", "[  PASSED  ] 2 tests.")]);

    assert_code(&out, 1);
    assert_eq!(
        ctx.log("log_delete.txt").as_deref(),
        Some("[  PASSED  ] 2 tests.\n")
    );
}

#[test]
fn test_nonzero_exit_with_marker_still_passes() {
    let ctx = TestContext::new();
    let out = ctx.run(&["-t", "mapping"], &[("STUB_EXIT", "1")]);

    assert_code(&out, 0);
    assert_eq!(ctx.programs(), ["test_mapping"]);
}

#[test]
fn test_sequence_runs_all_stages_in_order() {
    let ctx = TestContext::new();
    let out = ctx.run(&["-t", "sequence"], &[]);

    assert_code(&out, 0);
    assert_eq!(ctx.programs(), ["test_volume", "test_load", "test_mapping"]);
    for log in ["log_normal.txt", "log_load.txt", "log_mapping.txt"] {
        assert!(ctx.log(log).unwrap().contains(PASS), "missing {log}");
    }
}

#[test]
fn test_sequence_halts_on_first_failure() {
    let ctx = TestContext::new();
    let out = ctx.run(&["-t", "sequence"], &[("NORMAL_OUT", "[  FAILED  ] 1 test")]);

    assert_code(&out, 1);
    assert_eq!(ctx.programs(), ["test_volume"]);
    assert!(ctx.log("log_load.txt").is_none());
    assert!(ctx.log("log_mapping.txt").is_none());
    assert!(out.stdout.contains("Pipeline halted at"));
}

#[test]
fn test_recovery_gated_on_second_phase() {
    let ctx = TestContext::new();

    let out = ctx.run(&["-t", "recovery"], &[]);
    assert_code(&out, 0);
    let calls = ctx.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains("--gtest_filter=*abort_random*"));
    assert!(calls[1].contains("--enable_crash_handler=1"));

    let out = ctx.run(&["-t", "recovery"], &[("RECOVERY_EXIT", "3")]);
    assert_code(&out, 1);
    assert!(out.stdout.contains("Recovery: exited with status 3"), "stdout: {}", out.stdout);
}

#[test]
fn test_blank_pass_marker_rejected() {
    let ctx = TestContext::new();
    ctx.append_config("\n[stages.normal]\npass_marker = \"\"\n");

    let out = ctx.run(&["-t", "normal"], &[("NORMAL_OUT", "[  FAILED  ] 1 test, listed below:")]);

    assert_code(&out, 2);
    assert!(out.stderr.contains("pass_marker"), "stderr: {}", out.stderr);
    assert!(ctx.calls().is_empty());
    assert!(ctx.log("log_normal.txt").is_none());
}

#[test]
fn test_log_dir_override() {
    let ctx = TestContext::new();
    let alt = ctx.log_dir.with_file_name("alt-logs");
    let out = ctx.run(&["-t", "load", "--log-dir", alt.to_str().unwrap()], &[]);

    assert_code(&out, 0);
    assert!(Path::new(&alt).join("log_load.txt").exists());
    assert!(ctx.log("log_load.txt").is_none());
}

#[test]
fn test_missing_executables_fail_stage() {
    let ctx = TestContext::new();
    let empty = ctx.log_dir.with_file_name("empty-bin");
    fs::create_dir_all(&empty).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_regress"))
        .args(["--config", ctx.config_path.to_str().unwrap()])
        .args(["-d", empty.to_str().unwrap(), "-t", "normal"])
        .output()
        .expect("Failed to run regress");

    assert_eq!(output.status.code(), Some(1));
}
