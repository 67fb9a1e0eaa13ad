use std::path::{Path, PathBuf};

use serde::Serialize;

use super::common::RelativePath;

/// A fully rendered file, held in memory until the writer commits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFile {
    pub path: RelativePath,
    #[serde(skip)]
    pub contents: Vec<u8>,
    pub size: usize,
    pub executable: bool,
}

impl RenderedFile {
    pub fn new(path: RelativePath, contents: Vec<u8>, executable: bool) -> Self {
        Self {
            size: contents.len(),
            path,
            contents,
            executable,
        }
    }

    pub fn relative_path(&self) -> &Path {
        self.path.as_path()
    }

    /// Where this file lands under `root`.
    pub fn target(&self, root: &Path) -> PathBuf {
        root.join(self.path.as_path())
    }

    /// Contents as text, if they are valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}
