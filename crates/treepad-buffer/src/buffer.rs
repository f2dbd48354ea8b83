//! Text buffer with a saved-content baseline.
//!
//! Both the live text and the snapshot are ropes, so marking a buffer saved
//! is a cheap clone and the dirty check is a chunk-wise comparison rather
//! than two full string materialisations.

use ropey::Rope;
use std::borrow::Cow;

/// The editable text of one file plus the last content persisted for it.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// Live text, mutated by edits
    rope: Rope,

    /// Content as of the last load or successful save
    saved: Rope,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use treepad_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            saved: Rope::new(),
        }
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns the last saved content.
    pub fn saved_text(&self) -> Cow<'_, str> {
        self.saved.slice(..).into()
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of characters in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    // ==================== Mutations ====================

    /// Replaces the whole text.
    ///
    /// The editor widget hands over its full content after every edit, so
    /// this is the hot path for keystrokes.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    // ==================== Saved State ====================

    /// Resets both the text and the snapshot, as after reading from disk.
    pub fn reset(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.saved = self.rope.clone();
    }

    /// Records `persisted` as the content now on disk.
    ///
    /// Takes the text that was actually written rather than the live text:
    /// edits made while a write was in flight must stay dirty.
    pub fn mark_saved(&mut self, persisted: &str) {
        self.saved = Rope::from_str(persisted);
    }

    /// Returns true if the text differs from the last saved content.
    pub fn is_dirty(&self) -> bool {
        self.rope != self.saved
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        let rope = Rope::from_str(s);
        Self {
            saved: rope.clone(),
            rope,
        }
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
