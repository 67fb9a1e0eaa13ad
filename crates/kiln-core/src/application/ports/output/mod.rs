//! Driven (output) ports, implemented by infrastructure.
//!
//! The `kiln-adapters` crate provides the production implementations; the
//! `mockall` doubles generated here back the service tests.

use std::path::Path;

use chrono::NaiveDate;

use crate::application::error::{FileSystemError, PostStepError, RenderError, ToolchainError};
use crate::domain::RenderContext;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kiln_adapters::filesystem::LocalFilesystem` (production)
/// - `kiln_adapters::filesystem::MemoryFilesystem` (testing, fault injection)
///
/// Operations are single-step on purpose: `create_dir` creates exactly one
/// level and `remove_dir` only removes an empty directory, so the writer can
/// record and undo each mutation individually.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Create one directory. The parent must exist.
    fn create_dir(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Create a new file and write `contents`. Fails with `AlreadyExists`
    /// when the path is taken; an existing file is never truncated.
    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError>;

    /// Mark a file executable for user, group and other.
    fn set_executable(&self, path: &Path) -> Result<(), FileSystemError>;

    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Remove an empty directory; fails with `DirectoryNotEmpty` otherwise.
    fn remove_dir(&self, path: &Path) -> Result<(), FileSystemError>;
}

/// Port for the template language.
///
/// Implemented by `kiln_adapters::engine::MiniJinjaEngine`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateEngine: Send + Sync {
    /// Render `source` against `context`. `name` is used in diagnostics.
    fn render(
        &self,
        name: &str,
        source: &str,
        context: &RenderContext,
    ) -> Result<String, RenderError>;

    /// Evaluate a boolean expression such as `has_database and not orm_gorm`.
    fn evaluate(
        &self,
        name: &str,
        expression: &str,
        context: &RenderContext,
    ) -> Result<bool, RenderError>;
}

/// Port for detecting the host toolchain version (`auto`).
#[cfg_attr(test, mockall::automock)]
pub trait ToolchainProbe: Send + Sync {
    /// The installed version, e.g. `1.22.4`.
    fn detect(&self) -> Result<String, ToolchainError>;
}

/// Port for the optional "initialise a repository" post-step.
#[cfg_attr(test, mockall::automock)]
pub trait RepositoryInitializer: Send + Sync {
    fn init(&self, root: &Path) -> Result<(), PostStepError>;
}

/// Port for the current date, so generated output is reproducible in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
