//! # Treepad Core
//!
//! Editor state and the filesystem boundary, free of any UI toolkit.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Editor                            │
//! │  ┌───────────┐  ┌──────────────────┐  ┌────────────────┐  │
//! │  │  Session  │  │  DirectoryTree   │  │   FileEditor   │  │
//! │  │ root/file │  │ nodes by path    │  │ buffer + state │  │
//! │  └───────────┘  └──────────────────┘  └────────────────┘  │
//! │        Config · Keymap · EventBus                         │
//! └──────────────────────────────────────────────────────────┘
//!                │ ListRequest / LoadRequest / SaveRequest
//!                ▼
//!        tasks::*  ──►  dyn FileSystem (LocalFileSystem)
//! ```
//!
//! State changes are synchronous. Anything touching the disk is described by
//! a request value, executed by an async task and fed back as a result. Each
//! request carries a [`Generation`]; a result whose generation is no longer
//! current is discarded instead of overwriting newer state.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod command;
pub mod config;
pub mod editor;
pub mod event;
pub mod file_editor;
pub mod fs;
pub mod keymap;
pub mod session;
pub mod tasks;
pub mod tree;

pub use command::Command;
pub use config::Config;
pub use editor::{Editor, Retry};
pub use event::{EditorEvent, EventBus};
pub use file_editor::{EditorPhase, FileEditor, LoadOutcome, LoadRequest, SaveOutcome, SaveRequest};
pub use fs::{
    AccessMode, DirEntry, DirHandle, EntryHandle, EntryKind, FileHandle, FileSystem, FsError,
    FsResult, LocalFileSystem, WritableFile,
};
pub use keymap::{Key, KeyPress, Keymap, Modifiers};
pub use session::Session;
pub use tree::{DirectoryTree, ListRequest, ListingOutcome, NodePath, RowKind, TreeRow};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No active file")]
    NoActiveFile,

    #[error("File is not loaded yet: {0}")]
    NotLoaded(String),

    #[error("Still saving {0}")]
    SaveInProgress(String),

    #[error("No project is open")]
    NoRoot,

    #[error("Tree node not found: {0}")]
    NodeNotFound(NodePath),

    #[error("Filesystem error: {0}")]
    Fs(#[from] FsError),
}

/// Identifier of one asynchronous request.
///
/// Generations are unique for the life of the process and only ever
/// increase, so comparing the generation of a result against the latest one
/// issued for the same target tells whether the result is still wanted,
/// even across a change of root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

impl Generation {
    pub(crate) fn next() -> Self {
        Self(NEXT_GENERATION.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_increase() {
        let a = Generation::next();
        let b = Generation::next();
        assert!(b > a);
        assert_ne!(a, b);
    }
}
