//! End-to-end tests for the install-vapoursynth-libs binary
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_install-vapoursynth-libs");

/// A sandbox whose PATH holds only stand-ins for the required tools.
struct Sandbox {
    tools: TempDir,
    cwd: TempDir,
}

impl Sandbox {
    fn with_tools(names: &[&str]) -> Self {
        let tools = tempfile::tempdir().unwrap();
        for name in names {
            let path = tools.path().join(name);
            fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        Self {
            tools,
            cwd: tempfile::tempdir().unwrap(),
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(BIN)
            .args(args)
            .current_dir(self.cwd.path())
            .env("PATH", self.tools.path())
            .env_remove("VSLIBS_WORK_DIR")
            .env_remove("VSLIBS_RELEASE_URL")
            .output()
            .unwrap()
    }

    fn cwd_is_empty(&self) -> bool {
        is_empty(self.cwd.path())
    }
}

fn is_empty(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_missing_tools_stop_before_anything_else() {
    let sandbox = Sandbox::with_tools(&[]);
    let out = sandbox.run(&["install", "64", "R65", "prefix", "dlltool", "gendef"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).contains("Please make sure that p7zip and rsync are installed."));
    assert!(sandbox.cwd_is_empty());
}

#[test]
fn test_only_one_tool_present_still_fails() {
    let sandbox = Sandbox::with_tools(&["rsync"]);
    let out = sandbox.run(&["--help"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).contains("p7zip and rsync"));
}

#[test]
fn test_wrong_argument_count_prints_usage() {
    let sandbox = Sandbox::with_tools(&["rsync", "7z"]);

    for args in [
        &[][..],
        &["install", "64", "R65"][..],
        &["install", "64", "R65", "prefix", "dlltool", "gendef", "extra"][..],
    ] {
        let out = sandbox.run(args);
        assert_eq!(out.status.code(), Some(1), "args: {args:?}");
        assert!(stdout(&out).contains("Usage: install-vapoursynth-libs"));
    }
    assert!(sandbox.cwd_is_empty());
}

#[test]
fn test_unknown_subcommand_and_arch_print_usage() {
    let sandbox = Sandbox::with_tools(&["rsync", "7z"]);

    let out = sandbox.run(&["reinstall", "64", "R65", "prefix", "dlltool", "gendef"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).contains("Usage:"));

    let out = sandbox.run(&["install", "arm", "R65", "prefix", "dlltool", "gendef"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).contains("Usage:"));
}

#[test]
fn test_old_release_is_rejected_without_side_effects() {
    let sandbox = Sandbox::with_tools(&["rsync", "7z"]);
    let out = sandbox.run(&["install", "64", "R57", "prefix", "dlltool", "gendef"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("VapourSynth version must be 58 or higher."));
    assert!(sandbox.cwd_is_empty());
}

#[test]
fn test_uninstall_is_a_no_op() {
    let sandbox = Sandbox::with_tools(&["rsync", "7z"]);
    let out = sandbox.run(&["uninstall", "64", "R65", "prefix", "dlltool", "gendef"]);

    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("nothing was removed"));
    assert!(sandbox.cwd_is_empty());
}

#[test]
fn test_uninstall_ignores_arch_value() {
    let sandbox = Sandbox::with_tools(&["rsync", "7z"]);
    let out = sandbox.run(&["uninstall", "arm64", "R65", "prefix", "dlltool", "gendef"]);

    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("nothing was removed from prefix"));
    assert!(sandbox.cwd_is_empty());
}

#[test]
fn test_help_and_version_exit_zero() {
    let sandbox = Sandbox::with_tools(&["rsync", "7z"]);

    let out = sandbox.run(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("install"));

    let out = sandbox.run(&["--version"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).starts_with("install-vapoursynth-libs"));
}
