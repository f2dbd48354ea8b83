//! Session state: the opened root and the active file.

use crate::fs::{DirHandle, FileHandle};

/// The two references every view reads.
///
/// Only the setters below mutate them; the tree and editor views receive
/// the session explicitly instead of reaching for shared globals.
#[derive(Debug, Default)]
pub struct Session {
    root: Option<DirHandle>,
    active_file: Option<FileHandle>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the opened root directory.
    pub fn root(&self) -> Option<&DirHandle> {
        self.root.as_ref()
    }

    /// Returns the file shown in the editor.
    pub fn active_file(&self) -> Option<&FileHandle> {
        self.active_file.as_ref()
    }

    /// Replaces the root.
    ///
    /// An active file outside the new root is cleared so the editor never
    /// shows a file the tree cannot reach. Returns true in that case.
    pub fn set_root(&mut self, root: DirHandle) -> bool {
        let cleared = match &self.active_file {
            Some(file) if !root.contains(file) => {
                self.active_file = None;
                true
            }
            _ => false,
        };
        tracing::info!("Project root: {}", root.path().display());
        self.root = Some(root);
        cleared
    }

    /// Replaces the active file; `None` clears the editor pane.
    pub fn set_active_file(&mut self, file: Option<FileHandle>) {
        self.active_file = file;
    }
}
