use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Why a string cannot be used as a path inside a generated project.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PathViolation {
    #[error("path is empty")]
    Empty,
    #[error("absolute paths are not allowed")]
    Absolute,
    #[error("parent directory components ('..') are not allowed")]
    ParentTraversal,
}

/// A filesystem path guaranteed to stay inside the output root.
///
/// Invariant: relative, non-empty, no `..`. Backslashes are normalised to
/// `/` and `.` components are dropped at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    pub fn try_new(raw: &str) -> Result<Self, PathViolation> {
        let normalized = raw.trim().replace('\\', "/");
        if normalized.starts_with('/') {
            return Err(PathViolation::Absolute);
        }

        let mut out = PathBuf::new();
        for component in Path::new(&normalized).components() {
            match component {
                Component::Normal(part) => out.push(part),
                Component::CurDir => {}
                Component::ParentDir => return Err(PathViolation::ParentTraversal),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(PathViolation::Absolute);
                }
            }
        }

        if out.as_os_str().is_empty() {
            return Err(PathViolation::Empty);
        }
        Ok(Self(out))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_separators_and_dot_components() {
        let p = RelativePath::try_new("./cmd\\api/./main.go").unwrap();
        assert_eq!(p.as_path(), Path::new("cmd/api/main.go"));
    }

    #[test]
    fn rejects_escapes() {
        assert_eq!(RelativePath::try_new("/etc/passwd"), Err(PathViolation::Absolute));
        assert_eq!(
            RelativePath::try_new("internal/../../x"),
            Err(PathViolation::ParentTraversal)
        );
        assert_eq!(RelativePath::try_new("  "), Err(PathViolation::Empty));
        assert_eq!(RelativePath::try_new("./"), Err(PathViolation::Empty));
    }
}
