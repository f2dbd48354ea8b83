//! Local disk implementation of [`FileSystem`] on top of `tokio::fs`.

use async_trait::async_trait;
use std::fs::Permissions;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use super::{
    AccessMode, DirEntry, DirHandle, FileHandle, FileSystem, FsError, FsResult, WritableFile,
};

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn request_permission(&self, dir: &DirHandle, mode: AccessMode) -> FsResult<()> {
        let path = dir.path();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| FsError::from_io(path, e))?;

        if !metadata.is_dir() {
            return Err(FsError::NotADirectory(path.to_path_buf()));
        }

        // Opening the directory is the real read check; mode bits can lie
        // under ACLs and mount options.
        tokio::fs::read_dir(path)
            .await
            .map_err(|e| FsError::from_io(path, e))?;

        // Same for writing: mode bits say nothing about who owns the
        // directory, so try creating a file in it.
        if mode == AccessMode::ReadWrite {
            let scratch_dir = path.to_path_buf();
            tokio::task::spawn_blocking(move || tempfile::tempfile_in(scratch_dir))
                .await
                .map_err(|e| join_error(path, e))?
                .map_err(|e| FsError::from_io(path, e))?;
        }

        tracing::debug!("Access granted on {} ({:?})", path.display(), mode);
        Ok(())
    }

    async fn list_dir(&self, dir: &DirHandle) -> FsResult<Vec<DirEntry>> {
        let path = dir.path();
        let mut read_dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| FsError::from_io(path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| FsError::from_io(path, e))?
        {
            let entry_path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            let is_dir = match entry.file_type().await {
                Ok(ft) if ft.is_symlink() => match tokio::fs::metadata(&entry_path).await {
                    Ok(target) => target.is_dir(),
                    Err(e) => {
                        tracing::debug!("Skipping dangling link {}: {}", entry_path.display(), e);
                        continue;
                    }
                },
                Ok(ft) => ft.is_dir(),
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", entry_path.display(), e);
                    continue;
                }
            };

            entries.push(if is_dir {
                DirEntry::directory(name, DirHandle::new(entry_path))
            } else {
                DirEntry::file(name, FileHandle::new(entry_path))
            });
        }

        Ok(entries)
    }

    async fn read_file(&self, file: &FileHandle) -> FsResult<String> {
        let path = file.path();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| FsError::from_io(path, e))?;
        if metadata.is_dir() {
            return Err(FsError::NotAFile(path.to_path_buf()));
        }

        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FsError::from_io(path, e))
    }

    async fn create_writable(&self, file: &FileHandle) -> FsResult<Box<dyn WritableFile>> {
        let requested = file.path();
        // Through a link, the file it points at is what gets replaced.
        let target = match tokio::fs::canonicalize(requested).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => requested.to_path_buf(),
            Err(e) => return Err(FsError::from_io(requested, e)),
        };

        let permissions = match tokio::fs::metadata(&target).await {
            Ok(metadata) if metadata.is_dir() => return Err(FsError::NotAFile(target)),
            Ok(metadata) => Some(metadata.permissions()),
            Err(_) => None,
        };

        let staged_for = target.clone();
        let (handle, staging) =
            tokio::task::spawn_blocking(move || staging_file(&staged_for, permissions))
                .await
                .map_err(|e| join_error(&target, e))?
                .map_err(|e| FsError::from_io(&target, e))?;

        Ok(Box::new(LocalWritable {
            target,
            staging: Some(staging),
            file: Some(tokio::fs::File::from_std(handle)),
        }))
    }
}

/// Creates a fresh sibling of `target` to write into, carrying the target's
/// permissions. Every writable gets its own, so concurrent saves never share
/// one.
fn staging_file(
    target: &Path,
    permissions: Option<Permissions>,
) -> io::Result<(std::fs::File, TempPath)> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let staged = tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".treepad-save")
        .tempfile_in(dir)?;
    if let Some(permissions) = permissions {
        staged.as_file().set_permissions(permissions)?;
    }
    Ok(staged.into_parts())
}

fn join_error(path: &Path, err: tokio::task::JoinError) -> FsError {
    FsError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Writable for a local file.
///
/// Content goes to a staging file; `close` syncs it and renames it over the
/// target, so a failed write never leaves a half-written target behind. A
/// staging file that is never committed is removed on drop.
struct LocalWritable {
    target: PathBuf,
    staging: Option<TempPath>,
    file: Option<tokio::fs::File>,
}

impl LocalWritable {
    fn closed(&self) -> FsError {
        FsError::Io {
            path: self.target.clone(),
            message: "writable already closed".to_string(),
        }
    }
}

#[async_trait]
impl WritableFile for LocalWritable {
    async fn write(&mut self, content: &str) -> FsResult<()> {
        let Some(file) = self.file.as_mut() else {
            return Err(self.closed());
        };
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| FsError::from_io(&self.target, e))
    }

    async fn close(&mut self) -> FsResult<()> {
        let (Some(mut file), Some(staging)) = (self.file.take(), self.staging.take()) else {
            return Err(self.closed());
        };

        file.flush()
            .await
            .map_err(|e| FsError::from_io(&self.target, e))?;
        file.sync_all()
            .await
            .map_err(|e| FsError::from_io(&self.target, e))?;
        drop(file);

        let target = self.target.clone();
        tokio::task::spawn_blocking(move || staging.persist(&target))
            .await
            .map_err(|e| join_error(&self.target, e))?
            .map_err(|e| FsError::from_io(&self.target, e.error))?;
        Ok(())
    }
}
