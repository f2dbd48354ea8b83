//! In-memory [`FileSystem`] for tests.
//!
//! Directories remember insertion order so listings come back in a known,
//! deliberately unsorted order. Paths can be marked denied to simulate
//! revoked access, and writes can be made to fail.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    AccessMode, DirEntry, DirHandle, FileHandle, FileSystem, FsError, FsResult, WritableFile,
};

enum Node {
    Dir(Vec<String>),
    File(String),
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<PathBuf, Node>,
    denied: HashSet<PathBuf>,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryFileSystem {
    inner: Arc<Mutex<Inner>>,
    list_calls: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryFileSystem {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        let fs = Self::default();
        fs.inner
            .lock()
            .unwrap()
            .nodes
            .insert(root.into(), Node::Dir(Vec::new()));
        fs
    }

    pub(crate) fn add_dir(&self, path: impl AsRef<Path>) -> DirHandle {
        let path = path.as_ref().to_path_buf();
        self.link(&path);
        self.inner
            .lock()
            .unwrap()
            .nodes
            .insert(path.clone(), Node::Dir(Vec::new()));
        DirHandle::new(path)
    }

    pub(crate) fn add_file(&self, path: impl AsRef<Path>, content: &str) -> FileHandle {
        let path = path.as_ref().to_path_buf();
        self.link(&path);
        self.inner
            .lock()
            .unwrap()
            .nodes
            .insert(path.clone(), Node::File(content.to_string()));
        FileHandle::new(path)
    }

    pub(crate) fn deny(&self, path: impl AsRef<Path>) {
        self.inner
            .lock()
            .unwrap()
            .denied
            .insert(path.as_ref().to_path_buf());
    }

    pub(crate) fn allow(&self, path: impl AsRef<Path>) {
        self.inner.lock().unwrap().denied.remove(path.as_ref());
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.inner.lock().unwrap().nodes.get(path.as_ref()) {
            Some(Node::File(text)) => Some(text.clone()),
            _ => None,
        }
    }

    fn link(&self, path: &Path) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        let mut inner = self.inner.lock().unwrap();
        if let Some(Node::Dir(children)) = inner.nodes.get_mut(parent) {
            let name = name.to_string_lossy().into_owned();
            if !children.contains(&name) {
                children.push(name);
            }
        }
    }

    fn check(inner: &Inner, path: &Path) -> FsResult<()> {
        if inner.denied.iter().any(|d| path.starts_with(d)) {
            return Err(FsError::PermissionDenied(path.to_path_buf()));
        }
        Ok(())
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn request_permission(&self, dir: &DirHandle, _mode: AccessMode) -> FsResult<()> {
        let inner = self.inner.lock().unwrap();
        Self::check(&inner, dir.path())?;
        match inner.nodes.get(dir.path()) {
            Some(Node::Dir(_)) => Ok(()),
            Some(Node::File(_)) => Err(FsError::NotADirectory(dir.path().to_path_buf())),
            None => Err(FsError::NotFound(dir.path().to_path_buf())),
        }
    }

    async fn list_dir(&self, dir: &DirHandle) -> FsResult<Vec<DirEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().unwrap();
        Self::check(&inner, dir.path())?;
        let Some(Node::Dir(children)) = inner.nodes.get(dir.path()) else {
            return Err(FsError::NotADirectory(dir.path().to_path_buf()));
        };

        Ok(children
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                match inner.nodes.get(&path) {
                    Some(Node::Dir(_)) => DirEntry::directory(name.clone(), DirHandle::new(path)),
                    _ => DirEntry::file(name.clone(), FileHandle::new(path)),
                }
            })
            .collect())
    }

    async fn read_file(&self, file: &FileHandle) -> FsResult<String> {
        let inner = self.inner.lock().unwrap();
        Self::check(&inner, file.path())?;
        match inner.nodes.get(file.path()) {
            Some(Node::File(text)) => Ok(text.clone()),
            Some(Node::Dir(_)) => Err(FsError::NotAFile(file.path().to_path_buf())),
            None => Err(FsError::NotFound(file.path().to_path_buf())),
        }
    }

    async fn create_writable(&self, file: &FileHandle) -> FsResult<Box<dyn WritableFile>> {
        {
            let inner = self.inner.lock().unwrap();
            Self::check(&inner, file.path())?;
        }
        Ok(Box::new(MemoryWritable {
            fs: self.clone(),
            path: file.path().to_path_buf(),
            staged: String::new(),
        }))
    }
}

struct MemoryWritable {
    fs: MemoryFileSystem,
    path: PathBuf,
    staged: String,
}

#[async_trait]
impl WritableFile for MemoryWritable {
    async fn write(&mut self, content: &str) -> FsResult<()> {
        if self.fs.fail_writes.load(Ordering::SeqCst) {
            return Err(FsError::Io {
                path: self.path.clone(),
                message: "disk full".to_string(),
            });
        }
        self.staged.push_str(content);
        Ok(())
    }

    async fn close(&mut self) -> FsResult<()> {
        let staged = std::mem::take(&mut self.staged);
        self.fs.add_file(&self.path, &staged);
        Ok(())
    }
}
