//! End-to-end tests for the `kiln` binary against the bundled blueprints.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

const BLUEPRINTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../blueprints");

/// A scratch directory with its own config file, so the host's
/// configuration never leaks into a test.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self::with_config("[generation]\ninit_git = false\n")
    }

    fn with_config(config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    fn kiln(&self) -> Command {
        let mut cmd = cargo::cargo_bin_cmd!("kiln");
        cmd.current_dir(self.path())
            .env_remove("KILN_BLUEPRINTS_DIR")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--config")
            .arg(self.config_path())
            .arg("--blueprints")
            .arg(BLUEPRINTS);
        cmd
    }

    fn new_web_api(&self, name: &str) -> Command {
        let mut cmd = self.kiln();
        cmd.args([
            "new",
            name,
            "--module",
            "github.com/acme/orders",
            "--kind",
            "web-api",
            "--framework",
            "gin",
            "--no-git",
        ]);
        cmd
    }
}

// ── basics ───────────────────────────────────────────────────────────────────

#[test]
fn help_describes_the_tool() {
    cargo::cargo_bin_cmd!("kiln")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("kiln"))
        .stdout(predicate::str::contains("blueprint"));
}

#[test]
fn version_matches_cargo() {
    cargo::cargo_bin_cmd!("kiln")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn new_help_lists_feature_flags() {
    cargo::cargo_bin_cmd!("kiln")
        .args(["new", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--module"))
        .stdout(predicate::str::contains("--db"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn no_color_env_accepts_conventional_values() {
    let sandbox = Sandbox::new();
    for value in ["1", "yes", "true", "0", ""] {
        sandbox
            .kiln()
            .env("NO_COLOR", value)
            .args(["list", "--format", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cli-clean"));
    }
}

// ── list ─────────────────────────────────────────────────────────────────────

#[test]
fn list_prints_every_blueprint_id() {
    let sandbox = Sandbox::new();
    sandbox
        .kiln()
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cli-clean"))
        .stdout(predicate::str::contains("library-standard"))
        .stdout(predicate::str::contains("web-api-clean"));
}

#[test]
fn list_json_is_machine_readable() {
    let sandbox = Sandbox::new();
    let assert = sandbox
        .kiln()
        .args(["list", "--format", "json", "--kind", "web-api"])
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "web-api-clean");
    assert!(
        items[0]["frameworks"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f == "gin")
    );
}

#[test]
fn list_csv_has_header_and_filtered_rows() {
    let sandbox = Sandbox::new();
    sandbox
        .kiln()
        .args(["list", "--format", "csv", "--framework", "none"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,version,kind,architecture,frameworks,name"))
        .stdout(predicate::str::contains("cli-clean"))
        .stdout(predicate::str::contains("web-api-clean").not());
}

#[test]
fn missing_blueprint_directory_is_a_configuration_error() {
    let sandbox = Sandbox::new();
    let mut cmd = cargo::cargo_bin_cmd!("kiln");
    cmd.current_dir(sandbox.path())
        .env_remove("KILN_BLUEPRINTS_DIR")
        .arg("--config")
        .arg(sandbox.config_path())
        .args(["--blueprints", "no-such-dir", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("no-such-dir"));
}

// ── new ──────────────────────────────────────────────────────────────────────

#[test]
fn dry_run_previews_without_writing() {
    let sandbox = Sandbox::new();
    sandbox
        .new_web_api("orders")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("go.mod"))
        .stdout(predicate::str::contains("internal/server/gin.go"));

    assert!(!sandbox.path().join("orders").exists());
}

#[test]
fn generates_a_project_with_one_framework() {
    let sandbox = Sandbox::new();
    sandbox
        .new_web_api("orders")
        .args(["--db", "postgres", "--deploy", "docker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 'orders'"));

    let root = sandbox.path().join("orders");
    let go_mod = fs::read_to_string(root.join("go.mod")).unwrap();
    assert!(go_mod.starts_with("module github.com/acme/orders\n"));
    assert!(go_mod.contains("github.com/gin-gonic/gin"));
    assert!(go_mod.contains("github.com/jackc/pgx/v5"));
    assert!(!go_mod.contains("labstack/echo"));

    assert!(root.join("cmd/orders/main.go").is_file());
    assert!(root.join("internal/server/gin.go").is_file());
    assert!(!root.join("internal/server/chi.go").exists());
    assert!(root.join("internal/database/database.go").is_file());
    assert!(root.join("Dockerfile").is_file());
    assert!(!root.join(".git").exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(root.join("scripts/run.sh")).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }
}

#[test]
fn output_flag_sets_the_parent_directory() {
    let sandbox = Sandbox::new();
    let parent = sandbox.path().join("work");
    fs::create_dir(&parent).unwrap();

    sandbox
        .kiln()
        .args([
            "new",
            "tool",
            "--module",
            "github.com/acme/tool",
            "--kind",
            "cli",
            "--no-git",
            "--var",
            "command_name=acme",
            "--output",
        ])
        .arg(&parent)
        .assert()
        .success();

    let root_go = fs::read_to_string(parent.join("tool/cmd/root.go")).unwrap();
    assert!(root_go.contains("acme"));
}

#[test]
fn second_run_conflicts_and_leaves_the_first_intact() {
    let sandbox = Sandbox::new();
    sandbox.new_web_api("orders").assert().success();

    let go_mod = sandbox.path().join("orders/go.mod");
    fs::write(&go_mod, "module edited\n").unwrap();

    sandbox
        .new_web_api("orders")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&go_mod).unwrap(), "module edited\n");
}

#[test]
fn unknown_kind_is_not_found_and_writes_nothing() {
    let sandbox = Sandbox::new();
    sandbox
        .kiln()
        .args(["new", "app", "--module", "example.com/app", "--kind", "desktop"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("desktop"))
        .stderr(predicate::str::contains("web-api"));

    assert!(!sandbox.path().join("app").exists());
}

#[test]
fn architecture_mismatch_names_the_available_one() {
    let sandbox = Sandbox::new();
    sandbox
        .kiln()
        .args(["new", "sdk", "--module", "example.com/sdk", "--kind", "library"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("standard"));
}

#[test]
fn missing_module_is_a_validation_error() {
    let sandbox = Sandbox::new();
    sandbox
        .kiln()
        .args(["new", "orders", "--kind", "web-api"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("module path is required"));
}

#[test]
fn missing_module_is_reported_before_bad_feature_values() {
    let sandbox = Sandbox::new();
    sandbox
        .kiln()
        .args(["new", "demo", "--kind", "cli", "--logger", "log4go", "--db", "oracle"])
        .arg("--dry-run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("module path is required"))
        .stderr(predicate::str::contains("log4go").not())
        .stderr(predicate::str::contains("oracle").not());
}

#[test]
fn unknown_database_is_a_validation_error() {
    let sandbox = Sandbox::new();
    sandbox
        .new_web_api("orders")
        .args(["--db", "oracle", "--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("oracle"));
}

#[test]
fn out_of_range_go_version_is_rejected() {
    let sandbox = Sandbox::new();
    sandbox
        .new_web_api("orders")
        .args(["--go-version", "1.9"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid toolchain version"));

    assert!(!sandbox.path().join("orders").exists());
}

#[test]
fn malformed_variable_is_a_validation_error() {
    let sandbox = Sandbox::new();
    sandbox
        .new_web_api("orders")
        .args(["--var", "http_port"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn json_output_reports_the_generation_result() {
    let sandbox = Sandbox::new();
    let assert = sandbox
        .new_web_api("orders")
        .args(["--dry-run", "--output-format", "json"])
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["blueprint"], "web-api-clean@1.0.0");
    assert!(json["error"].is_null());
    assert!(json["files_created"].as_array().unwrap().is_empty());
    assert!(
        json["preview"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["path"] == "go.mod")
    );
}

#[test]
fn json_output_carries_the_error_code_on_failure() {
    let sandbox = Sandbox::new();
    let assert = sandbox
        .kiln()
        .args([
            "new",
            "app",
            "--module",
            "example.com/app",
            "--kind",
            "desktop",
            "--output-format",
            "json",
        ])
        .assert()
        .code(3);

    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "blueprint-not-found");
    assert_eq!(json["error"]["retryable"], false);
}

// ── profiles and config ──────────────────────────────────────────────────────

const PROFILE_CONFIG: &str = r#"
current_profile = "work"

[profiles.work.identity]
author = "Grace Hopper"
license = "Apache-2.0"

[profiles.work.defaults]
architecture = "standard"

[generation]
init_git = false
"#;

#[test]
fn current_profile_supplies_defaults() {
    let sandbox = Sandbox::with_config(PROFILE_CONFIG);
    sandbox
        .kiln()
        .args(["new", "sdk", "--module", "example.com/sdk", "--kind", "library"])
        .assert()
        .success();

    let readme = fs::read_to_string(sandbox.path().join("sdk/README.md")).unwrap();
    assert!(readme.contains("Grace Hopper"));
    // LICENSE is only rendered for MIT.
    assert!(!sandbox.path().join("sdk/LICENSE").exists());
}

#[test]
fn explicit_flags_beat_profile_defaults() {
    let sandbox = Sandbox::with_config(PROFILE_CONFIG);
    sandbox
        .kiln()
        .args([
            "new",
            "sdk",
            "--module",
            "example.com/sdk",
            "--kind",
            "library",
            "--license",
            "MIT",
        ])
        .assert()
        .success();

    let license = fs::read_to_string(sandbox.path().join("sdk/LICENSE")).unwrap();
    assert!(license.contains("Grace Hopper"));
}

#[test]
fn unknown_profile_is_not_found() {
    let sandbox = Sandbox::with_config(PROFILE_CONFIG);
    sandbox
        .new_web_api("orders")
        .args(["--profile", "home"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("home"))
        .stderr(predicate::str::contains("work"));
}

#[test]
fn profile_commands_read_the_config() {
    let sandbox = Sandbox::with_config(PROFILE_CONFIG);
    sandbox
        .kiln()
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* work"));

    sandbox
        .kiln()
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grace Hopper"));
}

#[test]
fn config_get_reads_dotted_keys() {
    let sandbox = Sandbox::with_config(PROFILE_CONFIG);
    sandbox
        .kiln()
        .args(["config", "get", "profiles.work.identity.license"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Apache-2.0\n"));

    sandbox
        .kiln()
        .args(["config", "get", "no.such.key"])
        .assert()
        .code(2);
}

#[test]
fn malformed_config_file_exits_with_configuration_error() {
    let sandbox = Sandbox::with_config("generation = [");
    sandbox.kiln().args(["list"]).assert().code(4);
}

#[test]
fn init_writes_config_once() {
    let sandbox = Sandbox::new();
    let target = sandbox.path().join("fresh/config.toml");

    let init = |force: bool| {
        let mut cmd = cargo::cargo_bin_cmd!("kiln");
        cmd.current_dir(sandbox.path()).arg("--config").arg(&target).arg("init");
        if force {
            cmd.arg("--force");
        }
        cmd.assert()
    };

    init(false).success();
    let written = fs::read_to_string(&target).unwrap();
    assert!(written.contains("init_git = true"));

    init(false).code(2);
    init(true).success();
}

#[test]
fn completions_name_the_binary() {
    cargo::cargo_bin_cmd!("kiln")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kiln"));
}
