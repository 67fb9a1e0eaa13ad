//! Transactional filesystem writer.
//!
//! A commit is planned up front (every file plus every ancestor directory,
//! parents before children, siblings in lexical order) and executed one
//! single-step filesystem call at a time. Each mutation is recorded in a
//! [`GenerationTransaction`] *before* it is attempted, so a failure at any
//! point can be undone in reverse order, a torn write included.
//!
//! Pre-existing directories are never recorded and therefore never removed.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, trace, warn};

use crate::application::{
    error::{FileSystemError, FsOperation, RollbackFailure},
    ports::Filesystem,
};
use crate::domain::RenderedFile;

// ── Transaction ──────────────────────────────────────────────────────────────

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsAction {
    CreatedDir(PathBuf),
    WroteFile(PathBuf),
}

/// Ordered log of the mutations made by one commit.
///
/// Finalize with [`commit`](Self::commit) or [`rollback`](Self::rollback).
/// A transaction dropped without either (an early return or a panic
/// unwinding through the writer) rolls itself back.
pub struct GenerationTransaction<'a> {
    fs: &'a dyn Filesystem,
    log: Vec<FsAction>,
    finalized: bool,
}

impl<'a> GenerationTransaction<'a> {
    pub fn begin(fs: &'a dyn Filesystem) -> Self {
        Self {
            fs,
            log: Vec::new(),
            finalized: false,
        }
    }

    pub fn actions(&self) -> &[FsAction] {
        &self.log
    }

    /// Create `path` unless it is already a directory.
    pub fn ensure_dir(&mut self, path: &Path) -> Result<(), FileSystemError> {
        if self.fs.is_dir(path) {
            trace!(path = %path.display(), "Directory exists");
            return Ok(());
        }
        if self.fs.exists(path) {
            return Err(FileSystemError::new(
                FsOperation::CreateDir,
                path,
                io::ErrorKind::AlreadyExists,
                "a file exists where a directory is needed",
            ));
        }
        self.fs.create_dir(path)?;
        self.log.push(FsAction::CreatedDir(path.to_path_buf()));
        Ok(())
    }

    /// Write a new file. An existing file is a conflict, never overwritten.
    pub fn write_file(
        &mut self,
        path: &Path,
        contents: &[u8],
        executable: bool,
    ) -> Result<(), FileSystemError> {
        if self.fs.exists(path) {
            return Err(FileSystemError::conflict(path));
        }
        self.log.push(FsAction::WroteFile(path.to_path_buf()));
        if let Err(err) = self.fs.write_file(path, contents) {
            if err.kind == io::ErrorKind::AlreadyExists {
                // Created by someone else after the check; not ours to undo.
                self.log.pop();
                return Err(FileSystemError::conflict(path));
            }
            return Err(err);
        }
        if executable {
            self.fs.set_executable(path)?;
        }
        Ok(())
    }

    /// Keep everything written so far.
    pub fn commit(mut self) -> Vec<FsAction> {
        self.finalized = true;
        std::mem::take(&mut self.log)
    }

    /// Undo everything written so far, newest first.
    pub fn rollback(mut self) -> RollbackFailure {
        self.finalized = true;
        self.undo()
    }

    fn undo(&mut self) -> RollbackFailure {
        let mut failure = RollbackFailure::default();
        for action in std::mem::take(&mut self.log).into_iter().rev() {
            match action {
                FsAction::WroteFile(path) => match self.fs.remove_file(&path) {
                    Ok(()) => trace!(path = %path.display(), "Removed file"),
                    Err(e) if e.kind == io::ErrorKind::NotFound => {}
                    Err(e) => failure.push(FsOperation::RemoveFile, &path, e.message),
                },
                FsAction::CreatedDir(path) => match self.fs.remove_dir(&path) {
                    Ok(()) => trace!(path = %path.display(), "Removed directory"),
                    Err(e) if e.kind == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        if e.kind == io::ErrorKind::DirectoryNotEmpty {
                            warn!(path = %path.display(), "Directory not empty, leaving it in place");
                        }
                        failure.push(FsOperation::RemoveDir, &path, e.message);
                    }
                },
            }
        }
        failure
    }
}

impl Drop for GenerationTransaction<'_> {
    fn drop(&mut self) {
        if self.finalized || self.log.is_empty() {
            return;
        }
        warn!(actions = self.log.len(), "Transaction dropped unfinished, rolling back");
        let failure = self.undo();
        if !failure.is_empty() {
            warn!(%failure, "Rollback incomplete");
        }
    }
}

// ── Writer ───────────────────────────────────────────────────────────────────

/// One step of a commit plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedEntry<'f> {
    Dir,
    File(&'f RenderedFile),
}

pub struct TransactionalWriter {
    fs: Arc<dyn Filesystem>,
}

impl TransactionalWriter {
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }

    /// Every path the commit will visit, in execution order.
    ///
    /// Includes `root` and all of its ancestors, so a missing output
    /// directory is created level by level.
    pub fn plan<'f>(root: &Path, files: &'f [RenderedFile]) -> BTreeMap<PathBuf, PlannedEntry<'f>> {
        let mut plan = BTreeMap::new();
        let mut add_dirs = |path: &Path| {
            for dir in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
                plan.entry(dir.to_path_buf()).or_insert(PlannedEntry::Dir);
            }
        };
        add_dirs(root);
        for file in files {
            let target = file.target(root);
            if let Some(parent) = target.parent() {
                add_dirs(parent);
            }
        }
        for file in files {
            plan.insert(file.target(root), PlannedEntry::File(file));
        }
        plan
    }

    /// Write `files` under `root` all-or-nothing.
    ///
    /// Returns the written paths relative to `root`. On failure nothing this
    /// call created is left behind; whatever rollback could not undo is
    /// reported in [`FileSystemError::rollback`].
    #[instrument(skip_all, fields(root = %root.display(), files = files.len()))]
    pub fn commit(
        &self,
        root: &Path,
        files: &[RenderedFile],
    ) -> Result<Vec<PathBuf>, FileSystemError> {
        let plan = Self::plan(root, files);
        let mut tx = GenerationTransaction::begin(self.fs.as_ref());

        for (path, entry) in &plan {
            let step = match entry {
                PlannedEntry::Dir => tx.ensure_dir(path),
                PlannedEntry::File(file) => tx.write_file(path, &file.contents, file.executable),
            };
            if let Err(err) = step {
                warn!(error = %err, "Write failed, rolling back");
                let rollback = tx.rollback();
                if rollback.is_empty() {
                    info!("Rollback complete");
                } else {
                    warn!(%rollback, "Rollback incomplete");
                }
                return Err(err.with_rollback(rollback));
            }
        }

        let actions = tx.commit();
        debug!(actions = actions.len(), "Transaction committed");
        Ok(files.iter().map(|f| f.relative_path().to_path_buf()).collect())
    }
}
