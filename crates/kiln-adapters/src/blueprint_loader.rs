//! Filesystem-based blueprint loader.
//!
//! Discovers and parses `blueprint.toml` manifests from a directory tree,
//! converting them into domain [`Blueprint`] objects ready for the registry.
//!
//! # Directory layout expected
//!
//! ```text
//! blueprints/
//! ├── web-api-clean/
//! │   ├── blueprint.toml        ← manifest (required)
//! │   ├── go.mod.tmpl
//! │   └── cmd/{{ name }}/main.go.tmpl
//! └── cli-clean/
//!     ├── blueprint.toml
//!     └── main.go.tmpl
//! ```
//!
//! # `blueprint.toml` format
//!
//! ```toml
//! [blueprint]
//! id      = "web-api-clean"
//! version = "1.0.0"
//!
//! [key]
//! kind         = "web-api"
//! architecture = "clean"
//! frameworks   = ["gin", "echo"]   # "none" for framework-less; default ["none"]
//!
//! [metadata]
//! name        = "Web API (Clean)"
//! description = "HTTP service"     # optional
//! tags        = ["http"]           # optional
//!
//! [[variables]]
//! name     = "http_port"
//! default  = "8080"
//! required = false
//! allowed  = []
//!
//! # Optional per-file overrides. Files not listed here are parameterized
//! # when they contain `{{` or `{%`, literal otherwise, and always included.
//! [[files]]
//! path       = "internal/db/db.go.tmpl"
//! when       = "has_database"
//! type       = "parameterized"   # literal | parameterized
//! executable = false
//! ```

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use kiln_core::domain::{
    Architecture, Blueprint, BlueprintError, BlueprintMetadata, FileSpec, Framework, NO_FRAMEWORK,
    ProjectKind, VariableSpec,
};

pub const MANIFEST_FILE: &str = "blueprint.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `blueprint.toml` file.
#[derive(Debug, Deserialize, Clone)]
pub struct BlueprintManifest {
    pub blueprint: IdentitySection,
    pub key: KeySection,
    #[serde(default)]
    pub metadata: MetadataSection,
    #[serde(default)]
    pub variables: Vec<VariableEntry>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentitySection {
    pub id: String,
    pub version: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeySection {
    pub kind: String,
    pub architecture: String,
    #[serde(default)]
    pub frameworks: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MetadataSection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VariableEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    pub default: Option<String>,
    #[serde(default)]
    pub allowed: Vec<String>,
}

/// One entry under `[[files]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct FileEntry {
    pub path: String,
    pub when: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<FileType>,
    #[serde(default)]
    pub executable: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Copied byte-for-byte.
    Literal,
    /// Rendered through the template engine.
    Parameterized,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`Blueprint`]s from a directory of blueprint directories.
///
/// Each immediate subdirectory holding a valid `blueprint.toml` is one
/// blueprint. A subdirectory that fails to load is logged at `WARN` and
/// skipped so one broken blueprint does not hide the others.
#[derive(Debug, Clone)]
pub struct BlueprintLoader {
    root: PathBuf,
}

impl BlueprintLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every valid blueprint under the root, ordered by directory name.
    ///
    /// # Errors
    ///
    /// [`BlueprintError::Source`] when the root is missing or unreadable.
    #[instrument(skip(self), fields(dir = %self.root.display()))]
    pub fn load_all(&self) -> Result<Vec<Blueprint>, BlueprintError> {
        if !self.root.is_dir() {
            return Err(self.source_error("directory not found"));
        }

        let read_dir = fs::read_dir(&self.root).map_err(|e| self.source_error(e))?;
        let mut dirs = Vec::new();
        for entry in read_dir {
            let path = entry.map_err(|e| self.source_error(e))?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();

        let mut blueprints = Vec::with_capacity(dirs.len());
        for dir in dirs {
            match load_dir(&dir) {
                Ok(bp) => {
                    debug!(id = %bp.id, version = %bp.version, files = bp.files.len(), "loaded blueprint");
                    blueprints.push(bp);
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping blueprint directory");
                }
            }
        }

        debug!(count = blueprints.len(), "finished loading blueprints");
        Ok(blueprints)
    }

    fn source_error(&self, reason: impl ToString) -> BlueprintError {
        BlueprintError::Source {
            path: self.root.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Load one blueprint directory.
#[instrument(fields(dir = %dir.display()))]
pub fn load_dir(dir: &Path) -> Result<Blueprint, BlueprintError> {
    let label = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());
    let invalid = |reason: String| BlueprintError::invalid(label.clone(), reason);

    let manifest_path = dir.join(MANIFEST_FILE);
    let raw = fs::read_to_string(&manifest_path)
        .map_err(|e| invalid(format!("cannot read {MANIFEST_FILE}: {e}")))?;
    let manifest: BlueprintManifest =
        toml::from_str(&raw).map_err(|e| invalid(format!("cannot parse {MANIFEST_FILE}: {e}")))?;

    let kind: ProjectKind = manifest
        .key
        .kind
        .parse()
        .map_err(|e| invalid(format!("{e}")))?;
    let architecture: Architecture = manifest
        .key
        .architecture
        .parse()
        .map_err(|e| invalid(format!("{e}")))?;

    let mut builder = Blueprint::builder(&manifest.blueprint.id, &manifest.blueprint.version)
        .kind(kind)
        .architecture(architecture)
        .metadata(BlueprintMetadata {
            name: manifest.metadata.name.clone(),
            description: manifest.metadata.description.clone(),
            tags: manifest.metadata.tags.clone(),
        });

    for framework in parse_frameworks(&manifest.key.frameworks).map_err(invalid)? {
        builder = builder.framework(framework);
    }

    for var in &manifest.variables {
        builder = builder.variable(VariableSpec {
            name: var.name.clone(),
            description: var.description.clone(),
            required: var.required,
            default: var.default.clone(),
            allowed: var.allowed.clone(),
        });
    }

    for file in read_files(dir, &manifest).map_err(invalid)? {
        builder = builder.file(file);
    }

    builder.build()
}

/// An empty list means the blueprint serves framework-less requests only.
fn parse_frameworks(raw: &[String]) -> Result<Vec<Option<Framework>>, String> {
    if raw.is_empty() {
        return Ok(vec![None]);
    }
    raw.iter()
        .map(|fw| {
            if fw.trim().eq_ignore_ascii_case(NO_FRAMEWORK) {
                Ok(None)
            } else {
                fw.parse::<Framework>().map(Some).map_err(|e| e.to_string())
            }
        })
        .collect()
}

/// Walk the blueprint directory and turn every file into a [`FileSpec`],
/// applying manifest overrides.
fn read_files(dir: &Path, manifest: &BlueprintManifest) -> Result<Vec<FileSpec>, String> {
    let mut overrides: HashMap<String, &FileEntry> = manifest
        .files
        .iter()
        .map(|f| (normalize_path(&f.path), f))
        .collect();

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| format!("directory walk error: {e}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|_| format!("cannot relativise '{}'", entry.path().display()))?;
        let rel = normalize_path(&rel.to_string_lossy());
        if rel == MANIFEST_FILE {
            continue;
        }

        let bytes =
            fs::read(entry.path()).map_err(|e| format!("cannot read file '{rel}': {e}"))?;
        let entry_override = overrides.remove(&rel);
        files.push(file_spec(&rel, bytes, entry_override, source_is_executable(&entry))?);
    }

    if let Some(missing) = overrides.keys().min() {
        return Err(format!("[[files]] entry '{missing}' has no matching file"));
    }
    Ok(files)
}

fn file_spec(
    rel: &str,
    bytes: Vec<u8>,
    entry: Option<&FileEntry>,
    executable: bool,
) -> Result<FileSpec, String> {
    let declared = entry.and_then(|e| e.file_type);
    let mut spec = match (declared, String::from_utf8(bytes)) {
        (Some(FileType::Literal), Ok(text)) => FileSpec::literal(rel, text),
        (Some(FileType::Literal), Err(e)) => FileSpec::literal(rel, e.into_bytes()),
        (Some(FileType::Parameterized), Ok(text)) => FileSpec::template(rel, text),
        (Some(FileType::Parameterized), Err(_)) => {
            return Err(format!("file '{rel}' is declared parameterized but is not UTF-8"));
        }
        (None, Ok(text)) if looks_parameterized(&text) => FileSpec::template(rel, text),
        (None, Ok(text)) => FileSpec::literal(rel, text),
        (None, Err(e)) => FileSpec::literal(rel, e.into_bytes()),
    };

    if let Some(entry) = entry {
        if let Some(when) = &entry.when {
            spec = spec.when(when.clone());
        }
    }
    Ok(spec.executable(executable || entry.is_some_and(|e| e.executable)))
}

fn looks_parameterized(text: &str) -> bool {
    text.contains("{{") || text.contains("{%")
}

#[cfg(unix)]
fn source_is_executable(entry: &walkdir::DirEntry) -> bool {
    use std::os::unix::fs::PermissionsExt;
    entry
        .metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn source_is_executable(_: &walkdir::DirEntry) -> bool {
    false
}

/// Forward slashes everywhere so overrides match on every platform.
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
