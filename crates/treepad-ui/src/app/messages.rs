use iced::keyboard;
use iced::widget::text_editor;

use treepad_core::tasks::{ListingDone, LoadDone, SaveDone};
use treepad_core::{Command, DirHandle, EditorEvent, FileHandle, FsResult, NodePath};

#[derive(Debug, Clone)]
pub enum Message {
    // Project root
    OpenFolder,
    FolderPicked(FsResult<DirHandle>),
    RootGranted(FsResult<DirHandle>),

    // Tree
    ToggleNode(NodePath),
    RetryNode(NodePath),
    DismissNodeError(NodePath),
    FileClicked(FileHandle),

    // Editor
    EditorAction(text_editor::Action),
    Save,
    CloseFile,
    DismissSaveError,

    // Errors
    DismissErrors,
    GrantAccess,
    AccessGranted(FsResult<DirHandle>),

    // Keyboard
    KeyPressed(keyboard::Key, keyboard::Modifiers),
    Command(Command),

    // Async results
    Listed(ListingDone),
    Loaded(LoadDone),
    Saved(SaveDone),

    // Editor notifications
    Event(EditorEvent),
}
