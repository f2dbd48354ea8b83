//! The editor pane's state machine.
//!
//! ```text
//!   Empty ──open──► Loading ──ok──► Clean ◄──edit/save──► Dirty
//!                      │
//!                      └──err──► LoadFailed
//! ```
//!
//! Loads and saves are split in two halves: `open`/`begin_save` hand out a
//! request for an async task, `finish_load`/`finish_save` take its result.
//! A result only applies if it answers the latest request for the file
//! still being edited.

use std::borrow::Cow;

use treepad_buffer::TextBuffer;

use crate::fs::{FileHandle, FsError, FsResult};
use crate::{CoreError, CoreResult, Generation};

/// Observable state of the editor pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Empty,
    Loading,
    Clean,
    Dirty,
    LoadFailed,
}

/// A file read the editor is waiting for.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub file: FileHandle,
    pub generation: Generation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { chars: usize },
    Failed(FsError),
    Stale,
}

/// A write the editor wants performed.
///
/// `content` is the buffer as it was when the save began; that is what
/// becomes the saved baseline once the write succeeds.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub file: FileHandle,
    pub content: String,
    pub generation: Generation,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written; `dirty` tells whether edits arrived while the write ran.
    Saved { dirty: bool },
    Failed(FsError),
    Stale,
}

/// Buffer plus load/save bookkeeping for the active file.
#[derive(Debug, Default)]
pub struct FileEditor {
    file: Option<FileHandle>,
    buffer: TextBuffer,
    current: Option<Generation>,
    loading: bool,
    load_error: Option<FsError>,
    save_error: Option<FsError>,
    save_sequence: u64,
    saving: Option<u64>,
}

impl FileEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> EditorPhase {
        if self.file.is_none() {
            EditorPhase::Empty
        } else if self.loading {
            EditorPhase::Loading
        } else if self.load_error.is_some() {
            EditorPhase::LoadFailed
        } else if self.buffer.is_dirty() {
            EditorPhase::Dirty
        } else {
            EditorPhase::Clean
        }
    }

    /// File being shown, loaded or not.
    pub fn file(&self) -> Option<&FileHandle> {
        self.file.as_ref()
    }

    pub fn text(&self) -> Cow<'_, str> {
        self.buffer.text()
    }

    pub fn is_dirty(&self) -> bool {
        self.phase() == EditorPhase::Dirty
    }

    /// Returns true while a save is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    pub fn load_error(&self) -> Option<&FsError> {
        self.load_error.as_ref()
    }

    pub fn save_error(&self) -> Option<&FsError> {
        self.save_error.as_ref()
    }

    pub fn dismiss_save_error(&mut self) {
        self.save_error = None;
    }

    /// Starts loading `file`, abandoning whatever was open.
    pub fn open(&mut self, file: FileHandle) -> LoadRequest {
        let generation = Generation::next();
        tracing::debug!("Loading {} ({})", file.path().display(), generation);

        self.file = Some(file.clone());
        self.buffer = TextBuffer::new();
        self.current = Some(generation);
        self.loading = true;
        self.load_error = None;
        self.save_error = None;
        self.saving = None;

        LoadRequest { file, generation }
    }

    /// Applies a finished read.
    pub fn finish_load(&mut self, request: &LoadRequest, result: FsResult<String>) -> LoadOutcome {
        if !self.loading || self.current != Some(request.generation) {
            tracing::debug!(
                "Dropping stale load of {} ({})",
                request.file.path().display(),
                request.generation
            );
            return LoadOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(text) => {
                self.buffer.reset(&text);
                tracing::info!("Opened {}", request.file.path().display());
                LoadOutcome::Loaded {
                    chars: self.buffer.len_chars(),
                }
            }
            Err(err) => {
                tracing::warn!("Failed to open {}: {}", request.file.path().display(), err);
                self.load_error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Replaces the whole buffer with `text`.
    pub fn edit(&mut self, text: &str) -> CoreResult<()> {
        self.require_loaded()?;
        self.buffer.set_text(text);
        Ok(())
    }

    /// Captures the buffer for writing.
    ///
    /// Only one save runs at a time; a second one is refused until the first
    /// has finished.
    pub fn begin_save(&mut self) -> CoreResult<SaveRequest> {
        let file = self.require_loaded()?.clone();
        let generation = self.current.ok_or(CoreError::NoActiveFile)?;
        if self.saving.is_some() {
            return Err(CoreError::SaveInProgress(file.name().to_string()));
        }

        self.save_sequence += 1;
        self.saving = Some(self.save_sequence);
        self.save_error = None;

        Ok(SaveRequest {
            file,
            content: self.buffer.text().into_owned(),
            generation,
            sequence: self.save_sequence,
        })
    }

    /// Applies a finished write.
    pub fn finish_save(&mut self, request: &SaveRequest, result: FsResult<()>) -> SaveOutcome {
        if self.current != Some(request.generation) || self.saving != Some(request.sequence) {
            tracing::debug!("Dropping stale save of {}", request.file.path().display());
            return SaveOutcome::Stale;
        }
        self.saving = None;

        match result {
            Ok(()) => {
                self.buffer.mark_saved(&request.content);
                tracing::info!("Saved {}", request.file.path().display());
                SaveOutcome::Saved {
                    dirty: self.buffer.is_dirty(),
                }
            }
            Err(err) => {
                tracing::error!("Failed to save {}: {}", request.file.path().display(), err);
                self.save_error = Some(err.clone());
                SaveOutcome::Failed(err)
            }
        }
    }

    /// Clears the pane. Outstanding loads and saves become stale.
    pub fn close(&mut self) {
        self.file = None;
        self.buffer = TextBuffer::new();
        self.current = None;
        self.loading = false;
        self.load_error = None;
        self.save_error = None;
        self.saving = None;
    }

    fn require_loaded(&self) -> CoreResult<&FileHandle> {
        let file = self.file.as_ref().ok_or(CoreError::NoActiveFile)?;
        if self.loading || self.load_error.is_some() {
            return Err(CoreError::NotLoaded(file.name().to_string()));
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(path: &str, text: &str) -> FileEditor {
        let mut editor = FileEditor::new();
        let request = editor.open(FileHandle::new(path));
        editor.finish_load(&request, Ok(text.to_string()));
        editor
    }

    #[test]
    fn test_starts_empty() {
        let mut editor = FileEditor::new();
        assert_eq!(editor.phase(), EditorPhase::Empty);
        assert!(matches!(editor.edit("x"), Err(CoreError::NoActiveFile)));
        assert!(matches!(editor.begin_save(), Err(CoreError::NoActiveFile)));
    }

    #[test]
    fn test_edit_then_save_round() {
        let mut editor = loaded("/p/readme.md", "hello");
        assert_eq!(editor.phase(), EditorPhase::Clean);

        editor.edit("hello world").unwrap();
        assert_eq!(editor.phase(), EditorPhase::Dirty);

        let request = editor.begin_save().unwrap();
        assert_eq!(request.content, "hello world");
        assert!(editor.is_saving());

        assert_eq!(
            editor.finish_save(&request, Ok(())),
            SaveOutcome::Saved { dirty: false }
        );
        assert_eq!(editor.phase(), EditorPhase::Clean);
        assert!(!editor.is_saving());
    }

    #[test]
    fn test_editing_back_to_saved_text_is_clean() {
        let mut editor = loaded("/p/a.txt", "abc");
        editor.edit("abcd").unwrap();
        assert!(editor.is_dirty());
        editor.edit("abc").unwrap();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_switching_files_discards_first_load() {
        let mut editor = FileEditor::new();
        let a = editor.open(FileHandle::new("/p/a.txt"));
        let b = editor.open(FileHandle::new("/p/b.txt"));

        assert_eq!(editor.finish_load(&b, Ok("B".into())), LoadOutcome::Loaded { chars: 1 });
        assert_eq!(editor.finish_load(&a, Ok("A".into())), LoadOutcome::Stale);
        assert_eq!(editor.text(), "B");
        assert_eq!(editor.file().map(|f| f.name()), Some("b.txt"));
    }

    #[test]
    fn test_late_first_load_before_second_completes() {
        let mut editor = FileEditor::new();
        let a = editor.open(FileHandle::new("/p/a.txt"));
        let b = editor.open(FileHandle::new("/p/b.txt"));

        assert_eq!(editor.finish_load(&a, Ok("A".into())), LoadOutcome::Stale);
        assert_eq!(editor.phase(), EditorPhase::Loading);
        editor.finish_load(&b, Ok("B".into()));
        assert_eq!(editor.text(), "B");
    }

    #[test]
    fn test_edits_rejected_while_loading() {
        let mut editor = FileEditor::new();
        editor.open(FileHandle::new("/p/a.txt"));
        assert!(matches!(editor.edit("x"), Err(CoreError::NotLoaded(_))));
    }

    #[test]
    fn test_load_failure() {
        let mut editor = FileEditor::new();
        let request = editor.open(FileHandle::new("/p/gone.txt"));
        let err = FsError::NotFound("/p/gone.txt".into());
        assert_eq!(
            editor.finish_load(&request, Err(err.clone())),
            LoadOutcome::Failed(err.clone())
        );
        assert_eq!(editor.phase(), EditorPhase::LoadFailed);
        assert_eq!(editor.load_error(), Some(&err));
        assert!(editor.begin_save().is_err());
    }

    #[test]
    fn test_save_failure_stays_dirty() {
        let mut editor = loaded("/p/a.txt", "one");
        editor.edit("two").unwrap();
        let request = editor.begin_save().unwrap();

        let err = FsError::PermissionDenied("/p/a.txt".into());
        assert_eq!(
            editor.finish_save(&request, Err(err.clone())),
            SaveOutcome::Failed(err.clone())
        );
        assert!(editor.is_dirty());
        assert_eq!(editor.save_error(), Some(&err));

        editor.dismiss_save_error();
        assert!(editor.save_error().is_none());
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_edits_during_save_stay_dirty() {
        let mut editor = loaded("/p/a.txt", "one");
        editor.edit("two").unwrap();
        let request = editor.begin_save().unwrap();
        editor.edit("three").unwrap();

        assert_eq!(
            editor.finish_save(&request, Ok(())),
            SaveOutcome::Saved { dirty: true }
        );
        editor.edit("two").unwrap();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_second_save_waits_for_the_first() {
        let mut editor = loaded("/p/a.txt", "one");
        editor.edit("two").unwrap();
        let first = editor.begin_save().unwrap();
        editor.edit("three").unwrap();

        assert!(matches!(
            editor.begin_save(),
            Err(CoreError::SaveInProgress(name)) if name == "a.txt"
        ));

        assert_eq!(
            editor.finish_save(&first, Ok(())),
            SaveOutcome::Saved { dirty: true }
        );
        assert_eq!(editor.finish_save(&first, Ok(())), SaveOutcome::Stale);

        let second = editor.begin_save().unwrap();
        assert_eq!(second.content, "three");
        editor.finish_save(&second, Ok(()));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_failed_save_can_be_started_again() {
        let mut editor = loaded("/p/a.txt", "one");
        editor.edit("two").unwrap();
        let request = editor.begin_save().unwrap();
        editor.finish_save(&request, Err(FsError::PermissionDenied("/p/a.txt".into())));

        assert!(!editor.is_saving());
        assert!(editor.begin_save().is_ok());
    }

    #[test]
    fn test_save_for_switched_file_is_stale() {
        let mut editor = loaded("/p/a.txt", "one");
        editor.edit("two").unwrap();
        let request = editor.begin_save().unwrap();

        let b = editor.open(FileHandle::new("/p/b.txt"));
        editor.finish_load(&b, Ok("bee".into()));
        assert_eq!(editor.finish_save(&request, Ok(())), SaveOutcome::Stale);
        assert_eq!(editor.phase(), EditorPhase::Clean);
    }

    #[test]
    fn test_close_drops_pending_load() {
        let mut editor = FileEditor::new();
        let request = editor.open(FileHandle::new("/p/a.txt"));
        editor.close();
        assert_eq!(editor.finish_load(&request, Ok("A".into())), LoadOutcome::Stale);
        assert_eq!(editor.phase(), EditorPhase::Empty);
    }
}
