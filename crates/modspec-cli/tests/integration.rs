//! Integration tests for the modspec binary

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const V1_MANIFEST: &str = r#"{
    "schemaVersion": 1,
    "id": "example-mod",
    "version": "1.4.2",
    "name": "Example Mod",
    "environment": "client",
    "depends": {"loader": ">=0.14.0", "minecraft": ["1.20.x"]},
    "entrypoints": {"main": ["net.example.Init"], "client": [{"adapter": "kotlin", "value": "net.example.Client"}]}
}"#;

const V0_MANIFEST: &str = r#"{
    "id": "legacy-mod",
    "version": "0.3.0",
    "side": "server",
    "initializer": "net.example.Legacy",
    "schemaVersion": 0
}"#;

struct Harness {
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let Ok(dir) = TempDir::new() else {
            panic!("temp dir");
        };
        Harness { dir }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("modspec.toml")
    }

    fn write(&self, relative: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if fs::write(&path, body).is_err() {
            panic!("failed to write {}", path.display());
        }
        path
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("modspec");
        cmd.env("MODSPEC_CONFIG", self.config_path());
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn test_version() {
    Harness::new()
        .command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("modspec"));
}

#[test]
fn test_help() {
    Harness::new()
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("versioned mod manifests"));
}

#[test]
fn test_invalid_command() {
    Harness::new().command().arg("invalid").assert().failure();
}

#[test]
fn test_inspect_prints_json() {
    let env = Harness::new();
    let path = env.write("a/mod.json", V1_MANIFEST);
    env.command()
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"example-mod\""))
        .stdout(predicate::str::contains("net.example.Client"));
}

#[test]
fn test_inspect_directory_and_v0_rescan() {
    let env = Harness::new();
    env.write("legacy/mod.json", V0_MANIFEST);
    env.command()
        .arg("inspect")
        .arg(env.path().join("legacy"))
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy-mod"))
        .stdout(predicate::str::contains("net.example.Legacy"));
}

#[test]
fn test_inspect_missing_field_fails() {
    let env = Harness::new();
    let path = env.write("broken.json", r#"{"schemaVersion": 1, "version": "1.0.0"}"#);
    env.command()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field 'id'"))
        .stderr(predicate::str::contains("broken.json"));
}

#[test]
fn test_check_reports_each_failure() {
    let env = Harness::new();
    let good = env.write("good/mod.json", V1_MANIFEST);
    let bad = env.write("bad.json", r#"{"schemaVersion": 9, "id": "x", "version": "1"}"#);
    env.command()
        .arg("check")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("example-mod"))
        .stderr(predicate::str::contains("Unsupported schema version \"9\""))
        .stderr(predicate::str::contains("1 of 2 manifest(s) failed to parse"));
}

#[test]
fn test_check_all_valid() {
    let env = Harness::new();
    let a = env.write("a/mod.json", V1_MANIFEST);
    let b = env.write("b/mod.json", V0_MANIFEST);
    env.command().arg("check").arg(&a).arg(&b).assert().success();
}

#[test]
fn test_matches_exit_code() {
    let env = Harness::new();
    env.command()
        .args(["matches", "1.20.1", "1.20.x", ">=1.19"])
        .assert()
        .success()
        .stdout(predicate::str::contains("matches"));
    env.command()
        .args(["matches", "2.0.0", "<2.0.0"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("does not match"));
}

#[test]
fn test_config_set_then_show() {
    let env = Harness::new();
    env.command()
        .args(["config", "set", "manifest-file-name", "unit.json"])
        .assert()
        .success();
    env.command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"))
        .stdout(predicate::str::contains("unit.json"));

    env.write("custom/unit.json", V1_MANIFEST);
    env.command()
        .arg("inspect")
        .arg(env.path().join("custom"))
        .assert()
        .success()
        .stdout(predicate::str::contains("example-mod"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    Harness::new()
        .command()
        .args(["config", "set", "no-such-key", "1"])
        .assert()
        .failure();
}

#[test]
fn test_config_path() {
    Harness::new()
        .command()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("modspec.toml"));
}
