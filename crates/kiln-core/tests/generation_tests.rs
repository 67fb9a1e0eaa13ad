//! End-to-end generation through the public API, with in-memory adapters.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use kiln_core::application::{
    FileSystemError, FsOperation, PostStepError, RenderError, ToolchainError,
};
use kiln_core::domain::{
    Architecture, BlueprintMetadata, FileSpec, Framework, ProfileDefaults, ProjectKind,
};
use kiln_core::prelude::*;

// ── Fakes ────────────────────────────────────────────────────────────────────

/// Substitutes `{{ key }}` with string values; `when` names a single flag.
struct FlagEngine;

impl TemplateEngine for FlagEngine {
    fn render(&self, _: &str, source: &str, ctx: &RenderContext) -> Result<String, RenderError> {
        let mut out = source.to_string();
        for key in ctx.keys() {
            if let Some(value) = ctx.str(key) {
                out = out.replace(&format!("{{{{ {key} }}}}"), value);
            }
        }
        Ok(out)
    }

    fn evaluate(&self, _: &str, expr: &str, ctx: &RenderContext) -> Result<bool, RenderError> {
        Ok(ctx.flag(expr.trim()))
    }
}

#[derive(Default)]
struct MemFs {
    dirs: Mutex<BTreeSet<PathBuf>>,
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    fail_on: Option<PathBuf>,
}

impl MemFs {
    fn rooted() -> Self {
        let fs = Self::default();
        fs.dirs.lock().unwrap().insert(PathBuf::from("/"));
        fs
    }

    fn failing_on(path: &str) -> Self {
        Self {
            fail_on: Some(PathBuf::from(path)),
            ..Self::rooted()
        }
    }

    fn tree(&self) -> (BTreeSet<PathBuf>, BTreeMap<PathBuf, Vec<u8>>) {
        (self.dirs.lock().unwrap().clone(), self.files.lock().unwrap().clone())
    }

    fn read(&self, path: &str) -> String {
        String::from_utf8(self.files.lock().unwrap()[Path::new(path)].clone()).unwrap()
    }
}

impl Filesystem for MemFs {
    fn exists(&self, path: &Path) -> bool {
        self.is_dir(path) || self.files.lock().unwrap().contains_key(path)
    }
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }
    fn create_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        self.dirs.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }
    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        if self.fail_on.as_deref() == Some(path) {
            return Err(FileSystemError::new(
                FsOperation::WriteFile,
                path,
                io::ErrorKind::StorageFull,
                "no space left on device",
            ));
        }
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
    fn set_executable(&self, _: &Path) -> Result<(), FileSystemError> {
        Ok(())
    }
    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }
    fn remove_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        self.dirs.lock().unwrap().remove(path);
        Ok(())
    }
}

struct FixedClock;

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }
}

struct Probe(&'static str);

impl ToolchainProbe for Probe {
    fn detect(&self) -> Result<String, ToolchainError> {
        if self.0.is_empty() {
            Err(ToolchainError::new("go: command not found"))
        } else {
            Ok(self.0.to_string())
        }
    }
}

struct FailingRepo;

impl RepositoryInitializer for FailingRepo {
    fn init(&self, _: &Path) -> Result<(), PostStepError> {
        Err(PostStepError::new("repository already exists"))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn registry() -> Arc<BlueprintRegistry> {
    let mut web = Blueprint::builder("web-api-clean", "1.0.0")
        .kind(ProjectKind::WebApi)
        .architecture(Architecture::Clean)
        .metadata(BlueprintMetadata {
            name: "Web API".into(),
            ..BlueprintMetadata::default()
        })
        .file(FileSpec::template("go.mod.tmpl", "module {{ module_path }}\n\ngo {{ go_version }}\n"))
        .file(FileSpec::template("cmd/{{ name }}/main.go", "package main // {{ name }}\n"));
    for fw in [Framework::Gin, Framework::Echo, Framework::Chi] {
        web = web
            .framework(Some(fw))
            .file(FileSpec::template(
                format!("internal/http/{}.go", fw),
                format!("package http // {fw}\n"),
            )
            .when(format!("framework_{fw}")));
    }

    let cli = Blueprint::builder("cli-clean", "1.0.0")
        .kind(ProjectKind::Cli)
        .architecture(Architecture::Clean)
        .file(FileSpec::template("main.go", "package main // {{ author }}\n"))
        .file(FileSpec::literal("scripts/run.sh", "#!/bin/sh\n").executable(true));

    Arc::new(BlueprintRegistry::new([web.build().unwrap(), cli.build().unwrap()]).unwrap())
}

fn generator(fs: Arc<MemFs>, probe: &'static str) -> Generator {
    Generator::builder(registry())
        .engine(Arc::new(FlagEngine))
        .filesystem(fs)
        .toolchain(Arc::new(Probe(probe)))
        .clock(Arc::new(FixedClock))
        .build()
        .unwrap()
}

fn web_request(framework: &str) -> ProjectRequest {
    ProjectRequest::builder()
        .name("orders")
        .module_path("github.com/acme/orders")
        .kind("web-api")
        .framework(framework)
        .build()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn generates_only_the_selected_framework_files() {
    let fs = Arc::new(MemFs::rooted());
    let result = generator(fs.clone(), "").generate(&web_request("gin"), &GenerateOptions::new("/out"));

    assert!(result.success, "{:?}", result.error);
    let created: Vec<String> = result
        .files_created
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    assert_eq!(created, vec!["cmd/orders/main.go", "go.mod", "internal/http/gin.go"]);
    assert_eq!(fs.read("/out/go.mod"), "module github.com/acme/orders\n\ngo 1.22\n");
}

#[test]
fn dry_run_leaves_the_tree_untouched() {
    let fs = Arc::new(MemFs::rooted());
    let before = fs.tree();
    let result = generator(fs.clone(), "")
        .generate(&web_request("echo"), &GenerateOptions::new("/out").dry_run(true));

    assert!(result.success);
    assert_eq!(result.preview.len(), 3);
    assert!(result.files_created.is_empty());
    assert_eq!(fs.tree(), before);
}

#[test]
fn failed_write_restores_the_output_root() {
    let fs = Arc::new(MemFs::failing_on("/out/internal/http/chi.go"));
    let before = fs.tree();
    let result = generator(fs.clone(), "").generate(&web_request("chi"), &GenerateOptions::new("/out"));

    let err = result.error.expect("write must fail");
    assert_eq!(err.code(), ErrorCode::Filesystem);
    assert!(err.is_retryable());
    assert_eq!(fs.tree(), before);
}

#[test]
fn identical_requests_produce_identical_trees() {
    let a = Arc::new(MemFs::rooted());
    let b = Arc::new(MemFs::rooted());
    generator(a.clone(), "").generate(&web_request("gin"), &GenerateOptions::new("/out"));
    generator(b.clone(), "").generate(&web_request("gin"), &GenerateOptions::new("/out"));
    assert_eq!(a.tree(), b.tree());
}

#[test]
fn second_run_into_same_root_conflicts_and_keeps_first_output() {
    let fs = Arc::new(MemFs::rooted());
    let kiln = generator(fs.clone(), "");
    assert!(kiln.generate(&web_request("gin"), &GenerateOptions::new("/out")).success);
    let after_first = fs.tree();

    let second = kiln.generate(&web_request("gin"), &GenerateOptions::new("/out"));
    assert!(!second.success);
    assert_eq!(fs.tree(), after_first);
}

#[test]
fn profile_defaults_apply_and_request_wins() {
    let fs = Arc::new(MemFs::rooted());
    let profile = Profile {
        name: "team".into(),
        defaults: ProfileDefaults {
            runtime_version: "1.24".into(),
            framework: "echo".into(),
            ..ProfileDefaults::default()
        },
        ..Profile::default()
    };

    let result = generator(fs.clone(), "").generate(
        &web_request(""),
        &GenerateOptions::new("/a").profile(profile.clone()),
    );
    assert!(result.success, "{:?}", result.error);
    assert!(fs.read("/a/go.mod").ends_with("go 1.24\n"));
    assert!(fs.exists(Path::new("/a/internal/http/echo.go")));

    let result = generator(fs.clone(), "").generate(
        &web_request("chi"),
        &GenerateOptions::new("/b").profile(profile),
    );
    assert!(result.success);
    assert!(fs.exists(Path::new("/b/internal/http/chi.go")));
    assert!(!fs.exists(Path::new("/b/internal/http/echo.go")));
}

#[test]
fn toolchain_floor_and_auto_detection() {
    let fs = Arc::new(MemFs::rooted());

    let mut req = web_request("gin");
    req.runtime_version = "1.10".into();
    let result = generator(fs.clone(), "").generate(&req, &GenerateOptions::new("/x"));
    let err = result.error.unwrap();
    assert_eq!(err.code(), ErrorCode::Validation);
    assert!(err.to_string().contains("invalid toolchain version"));

    req.runtime_version = "auto".into();
    let result = generator(fs.clone(), "go1.23.1").generate(&req, &GenerateOptions::new("/y"));
    assert!(result.success, "{:?}", result.error);
    assert!(fs.read("/y/go.mod").ends_with("go 1.23\n"));
}

#[test]
fn unknown_kind_names_the_value_and_writes_nothing() {
    let fs = Arc::new(MemFs::rooted());
    let before = fs.tree();
    let mut req = web_request("gin");
    req.kind = "unknown-type".into();

    let result = generator(fs.clone(), "").generate(&req, &GenerateOptions::new("/out"));
    let err = result.error.unwrap();
    assert_eq!(err.code(), ErrorCode::BlueprintNotFound);
    assert!(err.to_string().contains("unknown-type"));
    assert_eq!(fs.tree(), before);
}

#[test]
fn first_missing_field_is_reported() {
    let fs = Arc::new(MemFs::rooted());
    let req = ProjectRequest::builder().kind("cli").build();
    let result = generator(fs, "").generate(&req, &GenerateOptions::new("/out"));
    assert_eq!(result.error.unwrap().to_string(), "project name is required");
}

#[test]
fn post_step_failure_keeps_generated_files() {
    let fs = Arc::new(MemFs::rooted());
    let generator = Generator::builder(registry())
        .engine(Arc::new(FlagEngine))
        .filesystem(fs.clone())
        .toolchain(Arc::new(Probe("")))
        .clock(Arc::new(FixedClock))
        .repository(Arc::new(FailingRepo))
        .build()
        .unwrap();

    let req = ProjectRequest::builder()
        .name("tool")
        .module_path("example.com/tool")
        .kind("cli")
        .author("Ada")
        .build();
    let result = generator.generate(&req, &GenerateOptions::new("/tool").init_repository(true));

    assert!(result.success);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(fs.read("/tool/main.go"), "package main // Ada\n");
    assert!(fs.exists(Path::new("/tool/scripts/run.sh")));
}
