//! # Treepad UI
//!
//! Desktop front end built on iced.
//!
//! ## Architecture
//!
//! The UI follows the Elm architecture:
//! - **Model**: [`App`], which owns the core [`treepad_core::Editor`]
//! - **Message**: everything that can happen, including finished filesystem tasks
//! - **Update**: applies a message and returns the tasks it starts
//! - **View**: renders the tree, the editor pane and the status bar
//!
//! Filesystem work never runs inside `update`; it is described by a request
//! from the editor, run through `Task::perform` and answered by a message.

pub mod app;
pub mod theme;

pub use app::{run, App, Flags};
