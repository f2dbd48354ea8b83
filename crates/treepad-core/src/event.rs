//! Event system for editor notifications.
//!
//! A `tokio::sync::broadcast` channel: emitting never blocks, subscribers
//! receive clones, and a receiver that falls behind is told how many events
//! it missed instead of holding up the sender.

use std::path::PathBuf;
use tokio::sync::broadcast;

use crate::tree::NodePath;

/// Events that can occur in the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A project root was selected
    RootSelected(PathBuf),
    /// The active file changed; `None` means the pane was cleared
    ActiveFileChanged(Option<PathBuf>),
    /// The active file's content arrived
    FileLoaded(PathBuf),
    /// The active file was written
    FileSaved(PathBuf),
    /// Writing the active file failed
    SaveFailed { path: PathBuf, message: String },
    /// A directory node received a listing
    DirectoryListed { path: NodePath, entries: usize },
    /// Listing a directory node failed
    ListingFailed { path: NodePath, message: String },
    /// A result arrived after a newer request superseded it
    StaleResultDiscarded,
}

/// Event bus for broadcasting editor events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

/// Pulls events off a receiver, skipping over lag.
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event; `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
