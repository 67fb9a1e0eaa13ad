//! Application layer errors.
//!
//! These are failures of the generation pipeline itself (rendering, writing,
//! adapters), as opposed to a bad request or a bad blueprint, which live in
//! [`crate::domain::error`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

// ── Rendering ────────────────────────────────────────────────────────────────

/// A blueprint file could not be turned into output bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("failed to render '{file}': {message}")]
    Template { file: String, message: String },

    #[error("invalid predicate '{expression}' on '{file}': {message}")]
    Predicate {
        file: String,
        expression: String,
        message: String,
    },

    #[error("'{file}' renders to an invalid path '{rendered}': {reason}")]
    InvalidPath {
        file: String,
        rendered: String,
        reason: String,
    },

    #[error("more than one blueprint file renders to '{path}'")]
    DuplicatePath { path: String },

    #[error("'{path}' is used both as a file and as a directory")]
    PathCollision { path: String },
}

impl RenderError {
    pub fn template(file: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Template {
            file: file.into(),
            message: message.to_string(),
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Template { file, .. } => vec![
                format!("Check the template syntax in '{file}'"),
                "Undefined variables are errors; declare them in blueprint.toml".into(),
            ],
            Self::Predicate { file, .. } => vec![format!(
                "Fix the `when` expression for '{file}' in blueprint.toml"
            )],
            Self::InvalidPath { .. } | Self::DuplicatePath { .. } | Self::PathCollision { .. } => {
                vec!["Check the file paths declared by the blueprint".into()]
            }
        }
    }
}

// ── Filesystem ───────────────────────────────────────────────────────────────

/// The filesystem call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FsOperation {
    Stat,
    CreateDir,
    WriteFile,
    SetPermissions,
    RemoveFile,
    RemoveDir,
}

impl FsOperation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stat => "stat",
            Self::CreateDir => "create directory",
            Self::WriteFile => "write file",
            Self::SetPermissions => "set permissions",
            Self::RemoveFile => "remove file",
            Self::RemoveDir => "remove directory",
        }
    }
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rollback step that could not be undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackStep {
    pub operation: FsOperation,
    pub path: PathBuf,
    pub message: String,
}

/// Everything rollback left behind. Attached to the triggering error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackFailure {
    pub failures: Vec<RollbackStep>,
}

impl RollbackFailure {
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn push(&mut self, operation: FsOperation, path: &Path, message: impl Into<String>) {
        self.failures.push(RollbackStep {
            operation,
            path: path.to_path_buf(),
            message: message.into(),
        });
    }
}

impl fmt::Display for RollbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rollback left {} item(s) behind", self.failures.len())?;
        for step in &self.failures {
            write!(f, "; {} {}: {}", step.operation, step.path.display(), step.message)?;
        }
        Ok(())
    }
}

/// A filesystem operation failed.
///
/// `kind` keeps the `io::ErrorKind` so callers can tell a conflict
/// (`AlreadyExists`) from a permission problem without string matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to {operation} {}: {message}{}", .path.display(), rollback_hint(.rollback))]
pub struct FileSystemError {
    pub operation: FsOperation,
    pub path: PathBuf,
    pub kind: io::ErrorKind,
    pub message: String,
    pub rollback: Option<RollbackFailure>,
}

fn rollback_hint(rollback: &Option<RollbackFailure>) -> String {
    match rollback {
        Some(r) if !r.is_empty() => format!(" ({r})"),
        _ => String::new(),
    }
}

impl FileSystemError {
    pub fn new(
        operation: FsOperation,
        path: impl Into<PathBuf>,
        kind: io::ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            path: path.into(),
            kind,
            message: message.into(),
            rollback: None,
        }
    }

    pub fn io(operation: FsOperation, path: impl Into<PathBuf>, err: &io::Error) -> Self {
        Self::new(operation, path, err.kind(), err.to_string())
    }

    /// A file already exists where one would be written.
    pub fn conflict(path: impl Into<PathBuf>) -> Self {
        Self::new(
            FsOperation::WriteFile,
            path,
            io::ErrorKind::AlreadyExists,
            "file already exists",
        )
    }

    pub fn with_rollback(mut self, rollback: RollbackFailure) -> Self {
        self.rollback = (!rollback.is_empty()).then_some(rollback);
        self
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == io::ErrorKind::AlreadyExists
    }

    pub fn suggestions(&self) -> Vec<String> {
        let mut out = match self.kind {
            io::ErrorKind::AlreadyExists => vec![
                format!("'{}' already exists", self.path.display()),
                "Choose a different project name or output directory".into(),
            ],
            io::ErrorKind::PermissionDenied => vec![
                format!("Check write permissions for '{}'", self.path.display()),
            ],
            _ => vec!["Check that the output directory is writable and has free space".into()],
        };
        if self.rollback.is_some() {
            out.push("Some generated files could not be cleaned up; remove them manually".into());
        }
        out
    }
}

// ── Adapters ─────────────────────────────────────────────────────────────────

/// The host toolchain could not be queried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ToolchainError {
    pub message: String,
}

impl ToolchainError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An optional post-generation step failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PostStepError {
    pub message: String,
}

impl PostStepError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A non-fatal problem reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostStepWarning {
    pub step: String,
    pub message: String,
}

impl fmt::Display for PostStepWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.message)
    }
}
