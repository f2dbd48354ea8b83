//! Commands the keymap can trigger.
//!
//! Commands are plain values; the UI decides how each one turns into state
//! changes and filesystem tasks.

/// Built-in editor commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Write the active file
    Save,
    /// Pick a new project root
    OpenFolder,
    /// Clear the editor pane
    CloseFile,
    /// Hide tree, load and save errors
    DismissErrors,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Save,
        Command::OpenFolder,
        Command::CloseFile,
        Command::DismissErrors,
    ];

    /// Returns the name used in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Save => "file.save",
            Command::OpenFolder => "file.open_folder",
            Command::CloseFile => "file.close",
            Command::DismissErrors => "view.dismiss_errors",
        }
    }

    /// Parses a config command name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Returns the command's display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Command::Save => "Save",
            Command::OpenFolder => "Open Folder",
            Command::CloseFile => "Close File",
            Command::DismissErrors => "Dismiss Errors",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
