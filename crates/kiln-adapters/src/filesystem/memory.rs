//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    io,
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use kiln_core::application::{FileSystemError, FsOperation, ports::Filesystem};

/// In-memory filesystem with the same single-step semantics as
/// [`super::LocalFilesystem`], plus fault injection.
///
/// Clones share state, so a test can keep a handle while the generator owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
    executables: BTreeSet<PathBuf>,
    faults: BTreeMap<(FsOperation, PathBuf), io::ErrorKind>,
}

/// Point-in-time copy of the whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub directories: BTreeSet<PathBuf>,
    pub files: BTreeMap<PathBuf, Vec<u8>>,
    pub executables: BTreeSet<PathBuf>,
}

impl MemoryFilesystem {
    /// An empty filesystem containing only `/`.
    pub fn new() -> Self {
        let fs = Self::default();
        fs.write().directories.insert(PathBuf::from("/"));
        fs
    }

    /// Pre-create `path` and all of its ancestors.
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        {
            let mut inner = self.write();
            for ancestor in path.as_ref().ancestors() {
                if !ancestor.as_os_str().is_empty() {
                    inner.directories.insert(ancestor.to_path_buf());
                }
            }
        }
        self
    }

    /// Pre-create a file. Its parent must already exist.
    pub fn with_file(self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.write()
            .files
            .insert(path.as_ref().to_path_buf(), contents.into());
        self
    }

    /// Make `operation` on `path` fail with `kind`.
    pub fn fail_on(&self, operation: FsOperation, path: impl AsRef<Path>, kind: io::ErrorKind) {
        self.write()
            .faults
            .insert((operation, path.as_ref().to_path_buf()), kind);
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.read().files.get(path.as_ref()).cloned()
    }

    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.read_file(path).and_then(|b| String::from_utf8(b).ok())
    }

    pub fn is_executable(&self, path: impl AsRef<Path>) -> bool {
        self.read().executables.contains(path.as_ref())
    }

    pub fn list_files(&self) -> Vec<PathBuf> {
        self.read().files.keys().cloned().collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.read();
        Snapshot {
            directories: inner.directories.clone(),
            files: inner.files.clone(),
            executables: inner.executables.clone(),
        }
    }

    // A poisoned lock only means another test thread panicked mid-write;
    // the maps are still usable.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Inner {
    fn check(&self, operation: FsOperation, path: &Path) -> Result<(), FileSystemError> {
        match self.faults.get(&(operation, path.to_path_buf())) {
            Some(kind) => Err(FileSystemError::new(
                operation,
                path,
                *kind,
                format!("injected failure: {kind}"),
            )),
            None => Ok(()),
        }
    }

    fn occupied(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }

    fn require_parent(&self, operation: FsOperation, path: &Path) -> Result<(), FileSystemError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.directories.contains(parent) => {
                Err(FileSystemError::new(
                    operation,
                    path,
                    io::ErrorKind::NotFound,
                    "parent directory does not exist",
                ))
            }
            _ => Ok(()),
        }
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.read().occupied(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.read().directories.contains(path)
    }

    fn create_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        let mut inner = self.write();
        inner.check(FsOperation::CreateDir, path)?;
        if inner.occupied(path) {
            return Err(FileSystemError::new(
                FsOperation::CreateDir,
                path,
                io::ErrorKind::AlreadyExists,
                "path already exists",
            ));
        }
        inner.require_parent(FsOperation::CreateDir, path)?;
        inner.directories.insert(path.to_path_buf());
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        let mut inner = self.write();
        inner.check(FsOperation::WriteFile, path)?;
        if inner.occupied(path) {
            return Err(FileSystemError::new(
                FsOperation::WriteFile,
                path,
                io::ErrorKind::AlreadyExists,
                "path already exists",
            ));
        }
        inner.require_parent(FsOperation::WriteFile, path)?;
        inner.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn set_executable(&self, path: &Path) -> Result<(), FileSystemError> {
        let mut inner = self.write();
        inner.check(FsOperation::SetPermissions, path)?;
        if !inner.files.contains_key(path) {
            return Err(FileSystemError::new(
                FsOperation::SetPermissions,
                path,
                io::ErrorKind::NotFound,
                "no such file",
            ));
        }
        inner.executables.insert(path.to_path_buf());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError> {
        let mut inner = self.write();
        inner.check(FsOperation::RemoveFile, path)?;
        if inner.files.remove(path).is_none() {
            return Err(FileSystemError::new(
                FsOperation::RemoveFile,
                path,
                io::ErrorKind::NotFound,
                "no such file",
            ));
        }
        inner.executables.remove(path);
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        let mut inner = self.write();
        inner.check(FsOperation::RemoveDir, path)?;
        if !inner.directories.contains(path) {
            return Err(FileSystemError::new(
                FsOperation::RemoveDir,
                path,
                io::ErrorKind::NotFound,
                "no such directory",
            ));
        }
        let has_children = inner
            .files
            .keys()
            .chain(inner.directories.iter())
            .any(|p| p.parent() == Some(path));
        if has_children {
            return Err(FileSystemError::new(
                FsOperation::RemoveDir,
                path,
                io::ErrorKind::DirectoryNotEmpty,
                "directory not empty",
            ));
        }
        inner.directories.remove(path);
        Ok(())
    }
}
