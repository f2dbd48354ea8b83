//! # Treepad Buffer
//!
//! The in-memory text of the active file, paired with the last content
//! known to be persisted.
//!
//! A buffer is *dirty* exactly when its text differs from that snapshot.
//! Nothing else feeds the flag: typing back the saved text makes the buffer
//! clean again.

mod buffer;

pub use buffer::TextBuffer;
