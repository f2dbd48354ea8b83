//! Async halves of the editor's requests.
//!
//! Each function takes an owned request plus a shared filesystem and
//! returns the request paired with its result, ready to be handed back to
//! the [`Editor`](crate::Editor). The results are `Clone` so they can ride
//! inside UI messages.

use std::sync::Arc;

use crate::file_editor::{LoadRequest, SaveRequest};
use crate::fs::{self, AccessMode, DirEntry, DirHandle, FileSystem, FsResult};
use crate::tree::ListRequest;

#[derive(Debug, Clone)]
pub struct ListingDone {
    pub request: ListRequest,
    pub result: FsResult<Vec<DirEntry>>,
}

#[derive(Debug, Clone)]
pub struct LoadDone {
    pub request: LoadRequest,
    pub result: FsResult<String>,
}

#[derive(Debug, Clone)]
pub struct SaveDone {
    pub request: SaveRequest,
    pub result: FsResult<()>,
}

/// Lists one directory node.
pub async fn list(fs: Arc<dyn FileSystem>, request: ListRequest) -> ListingDone {
    let result = fs.list_dir(&request.dir).await;
    ListingDone { request, result }
}

/// Reads the file an editor is waiting for.
pub async fn load(fs: Arc<dyn FileSystem>, request: LoadRequest) -> LoadDone {
    let result = fs.read_file(&request.file).await;
    LoadDone { request, result }
}

/// Writes the content captured by a save.
pub async fn save(fs: Arc<dyn FileSystem>, request: SaveRequest) -> SaveDone {
    let result = fs::write_file(fs.as_ref(), &request.file, &request.content).await;
    SaveDone { request, result }
}

/// Asks for read-write access on `root`, handing the root back on success.
pub async fn grant_access(fs: Arc<dyn FileSystem>, root: DirHandle) -> FsResult<DirHandle> {
    fs.request_permission(&root, AccessMode::ReadWrite).await?;
    Ok(root)
}
