//! The filesystem capability.
//!
//! Everything the editor knows about disk goes through [`FileSystem`]:
//! permission checks on the root, directory listings, whole-file reads and
//! scoped writes. Handles are opaque to the rest of the crate; views only
//! read their names.

mod local;
#[cfg(test)]
pub(crate) mod memory;

pub use local::LocalFileSystem;

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Result type for filesystem operations
pub type FsResult<T> = Result<T, FsError>;

/// Errors reported by a [`FileSystem`].
///
/// Cloneable so results can travel inside UI messages; IO errors keep their
/// rendered message instead of the source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Not valid UTF-8 text: {}", .0.display())]
    InvalidUtf8(PathBuf),

    #[error("Selection cancelled")]
    Cancelled,

    #[error("IO error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl FsError {
    /// Classifies an IO error raised while touching `path`.
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path),
            io::ErrorKind::InvalidData => FsError::InvalidUtf8(path),
            _ => FsError::Io {
                path,
                message: err.to_string(),
            },
        }
    }

    /// Returns true if access was revoked or never granted.
    ///
    /// The UI answers these by asking for permission on the root again
    /// instead of just showing the message.
    pub fn is_permission_lost(&self) -> bool {
        matches!(self, FsError::PermissionDenied(_))
    }
}

/// Access level requested on the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    ReadWrite,
}

/// Handle to a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirHandle {
    name: String,
    path: PathBuf,
}

impl DirHandle {
    /// Creates a handle for `path`, named after its last component.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self { name, path }
    }

    /// Returns the directory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if `file` lies somewhere below this directory.
    pub fn contains(&self, file: &FileHandle) -> bool {
        file.path.starts_with(&self.path)
    }
}

/// Handle to a regular file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    name: String,
    path: PathBuf,
}

impl FileHandle {
    /// Creates a handle for `path`, named after its last component.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self { name, path }
    }

    /// Returns the file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Handle carried by a directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryHandle {
    File(FileHandle),
    Directory(DirHandle),
}

impl EntryHandle {
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryHandle::File(_) => EntryKind::File,
            EntryHandle::Directory(_) => EntryKind::Directory,
        }
    }
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub handle: EntryHandle,
}

impl DirEntry {
    pub fn file(name: impl Into<String>, handle: FileHandle) -> Self {
        Self {
            name: name.into(),
            handle: EntryHandle::File(handle),
        }
    }

    pub fn directory(name: impl Into<String>, handle: DirHandle) -> Self {
        Self {
            name: name.into(),
            handle: EntryHandle::Directory(handle),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.handle.kind()
    }

    pub fn is_directory(&self) -> bool {
        self.kind() == EntryKind::Directory
    }
}

/// Host filesystem operations used by the editor.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Confirms the directory is usable with `mode`, failing with
    /// [`FsError::PermissionDenied`] if it is not.
    async fn request_permission(&self, dir: &DirHandle, mode: AccessMode) -> FsResult<()>;

    /// Enumerates the direct children of `dir`.
    ///
    /// The order is whatever the host produces.
    async fn list_dir(&self, dir: &DirHandle) -> FsResult<Vec<DirEntry>>;

    /// Reads a whole file as text.
    async fn read_file(&self, file: &FileHandle) -> FsResult<String>;

    /// Opens a writable for replacing the file's content.
    ///
    /// Nothing is committed until [`WritableFile::close`] succeeds.
    async fn create_writable(&self, file: &FileHandle) -> FsResult<Box<dyn WritableFile>>;
}

/// Scoped write access to one file.
#[async_trait]
pub trait WritableFile: Send {
    /// Appends `content` to what will be committed.
    async fn write(&mut self, content: &str) -> FsResult<()>;

    /// Commits the written content.
    async fn close(&mut self) -> FsResult<()>;
}

/// Replaces the content of `file`: open a writable, write, close.
pub async fn write_file(fs: &dyn FileSystem, file: &FileHandle, content: &str) -> FsResult<()> {
    let mut writable = fs.create_writable(file).await?;
    writable.write(content).await?;
    writable.close().await
}
