//! Local filesystem adapter using std::fs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use kiln_core::application::{FileSystemError, FsOperation, ports::Filesystem};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        // Dangling symlinks still occupy the name.
        path.symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        std::fs::create_dir(path).map_err(|e| FileSystemError::io(FsOperation::CreateDir, path, &e))
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| FileSystemError::io(FsOperation::WriteFile, path, &e))?;
        file.write_all(contents)
            .map_err(|e| FileSystemError::io(FsOperation::WriteFile, path, &e))
    }

    fn set_executable(&self, path: &Path) -> Result<(), FileSystemError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .map_err(|e| FileSystemError::io(FsOperation::Stat, path, &e))?;
            let mut perms = metadata.permissions();
            perms.set_mode(perms.mode() | 0o111);
            std::fs::set_permissions(path, perms)
                .map_err(|e| FileSystemError::io(FsOperation::SetPermissions, path, &e))?;
        }
        #[cfg(not(unix))]
        {
            let _ = path;
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError> {
        std::fs::remove_file(path)
            .map_err(|e| FileSystemError::io(FsOperation::RemoveFile, path, &e))
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        std::fs::remove_dir(path).map_err(|e| FileSystemError::io(FsOperation::RemoveDir, path, &e))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn create_dir_is_single_level() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();

        let err = fs.create_dir(&tmp.path().join("a/b")).unwrap_err();
        assert_eq!(err.kind, io::ErrorKind::NotFound);
        assert_eq!(err.operation, FsOperation::CreateDir);

        fs.create_dir(&tmp.path().join("a")).unwrap();
        fs.create_dir(&tmp.path().join("a/b")).unwrap();
        assert!(fs.is_dir(&tmp.path().join("a/b")));
    }

    #[test]
    fn write_then_remove_file() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let file = tmp.path().join("go.mod");

        fs.write_file(&file, b"module x\n").unwrap();
        assert_eq!(std::fs::read(&file).unwrap(), b"module x\n");
        assert!(fs.exists(&file));
        assert!(!fs.is_dir(&file));

        fs.remove_file(&file).unwrap();
        assert!(!fs.exists(&file));
    }

    #[test]
    fn write_file_never_truncates_an_existing_file() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let file = tmp.path().join("go.mod");
        std::fs::write(&file, b"module mine\n").unwrap();

        let err = fs.write_file(&file, b"module theirs\n").unwrap_err();
        assert_eq!(err.kind, io::ErrorKind::AlreadyExists);
        assert_eq!(err.operation, FsOperation::WriteFile);
        assert_eq!(std::fs::read(&file).unwrap(), b"module mine\n");
    }

    #[test]
    fn remove_dir_refuses_non_empty_directories() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let dir = tmp.path().join("cmd");
        fs.create_dir(&dir).unwrap();
        fs.write_file(&dir.join("main.go"), b"package main\n").unwrap();

        let err = fs.remove_dir(&dir).unwrap_err();
        assert_eq!(err.operation, FsOperation::RemoveDir);
        assert!(fs.exists(&dir.join("main.go")));
    }

    #[cfg(unix)]
    #[test]
    fn set_executable_adds_execute_bits() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let script = tmp.path().join("run.sh");
        fs.write_file(&script, b"#!/bin/sh\n").unwrap();
        fs.set_executable(&script).unwrap();

        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
