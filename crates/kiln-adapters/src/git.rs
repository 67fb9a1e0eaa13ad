//! Repository initialization post-step.

use std::path::Path;

use tracing::{debug, instrument};

use kiln_core::application::{PostStepError, ports::RepositoryInitializer};

/// Creates an empty git repository in the generated project.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitInitializer;

impl GitInitializer {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryInitializer for GitInitializer {
    #[instrument(skip(self), fields(root = %root.display()))]
    fn init(&self, root: &Path) -> Result<(), PostStepError> {
        if root.join(".git").exists() {
            return Err(PostStepError::new(format!(
                "'{}' is already a git repository",
                root.display()
            )));
        }
        git2::Repository::init(root)
            .map_err(|e| PostStepError::new(format!("git init failed: {}", e.message())))?;
        debug!("initialized git repository");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn initializes_a_repository() {
        let tmp = TempDir::new().unwrap();
        GitInitializer::new().init(tmp.path()).unwrap();
        assert!(tmp.path().join(".git").is_dir());
    }

    #[test]
    fn refuses_an_existing_repository() {
        let tmp = TempDir::new().unwrap();
        GitInitializer::new().init(tmp.path()).unwrap();
        let err = GitInitializer::new().init(tmp.path()).unwrap_err();
        assert!(err.message.contains("already a git repository"));
    }
}
