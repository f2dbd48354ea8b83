//! Keyboard mapping.
//!
//! Bindings are single key presses (modifiers + key) looked up in a map.
//! Defaults are installed first and user bindings from the config replace
//! them key by key.

use crate::command::Command;
use crate::config::Config;
use std::collections::HashMap;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool, // Cmd on macOS, Win on Windows
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Ctrl modifier.
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Meta (Cmd/Win) modifier.
    pub const META: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Returns true if no modifiers are pressed.
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.meta
    }

    /// Sets the modifier named `name`; false if the name is unknown.
    fn set(&mut self, name: &str) -> bool {
        match name {
            "ctrl" | "control" => self.ctrl = true,
            "alt" | "option" => self.alt = true,
            "shift" => self.shift = true,
            "meta" | "cmd" | "super" | "win" => self.meta = true,
            _ => return false,
        }
        true
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.meta {
            #[cfg(target_os = "macos")]
            parts.push("Cmd");
            #[cfg(not(target_os = "macos"))]
            parts.push("Win");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key, stored lowercase
    Char(char),
    Enter,
    Tab,
    Escape,
    Space,
    F(u8), // F1-F12
}

impl Key {
    /// Builds a character key, folding case.
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_lowercase())
    }

    /// Parses a key from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "enter" | "return" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            "escape" | "esc" => Some(Key::Escape),
            "space" => Some(Key::Space),
            _ if lower.starts_with('f') && lower.len() > 1 && lower.len() <= 3 => {
                lower[1..].parse().ok().map(Key::F)
            }
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::char(c)),
                    _ => None,
                }
            }
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_uppercase()),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
            Key::Escape => write!(f, "Escape"),
            Key::Space => write!(f, "Space"),
            Key::F(n) => write!(f, "F{}", n),
        }
    }
}

/// A key press event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// Creates a new key press.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parses a key binding string like "ctrl+s".
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = Key::parse(parts.pop()?)?;

        let mut modifiers = Modifiers::NONE;
        for part in parts {
            if !modifiers.set(&part.to_lowercase()) {
                return None;
            }
        }

        Some(Self { key, modifiers })
    }
}

impl std::fmt::Display for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// Key press to command lookup.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyPress, Command>,
}

impl Keymap {
    /// Creates a keymap with the default bindings.
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: HashMap::new(),
        };
        keymap.add_default_bindings();
        keymap
    }

    /// Creates a keymap from configuration.
    ///
    /// Unparseable keys or unknown command names are skipped with a warning.
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Self::new();

        for (key_str, cmd_str) in &config.keyboard.bindings {
            let Some(key) = KeyPress::parse(key_str) else {
                tracing::warn!("Ignoring binding with invalid key: {}", key_str);
                continue;
            };
            let Some(command) = Command::parse(cmd_str) else {
                tracing::warn!("Ignoring binding to unknown command: {}", cmd_str);
                continue;
            };
            keymap.bind(key, command);
        }

        keymap
    }

    fn add_default_bindings(&mut self) {
        let defaults = [
            (Key::char('s'), Modifiers::CTRL, Command::Save),
            (Key::char('s'), Modifiers::META, Command::Save),
            (Key::char('o'), Modifiers::CTRL, Command::OpenFolder),
            (Key::char('o'), Modifiers::META, Command::OpenFolder),
            (Key::char('w'), Modifiers::CTRL, Command::CloseFile),
            (Key::char('w'), Modifiers::META, Command::CloseFile),
            (Key::Escape, Modifiers::NONE, Command::DismissErrors),
        ];

        for (key, modifiers, command) in defaults {
            self.bind(KeyPress::new(key, modifiers), command);
        }
    }

    /// Binds `key` to `command`, replacing any previous binding.
    pub fn bind(&mut self, key: KeyPress, command: Command) {
        self.bindings.insert(key, command);
    }

    /// Returns the command bound to `key`.
    pub fn lookup(&self, key: &KeyPress) -> Option<Command> {
        self.bindings.get(key).copied()
    }

    /// Returns the keys bound to `command`, for display.
    pub fn keys_for(&self, command: Command) -> Vec<&KeyPress> {
        let mut keys: Vec<_> = self
            .bindings
            .iter()
            .filter(|(_, c)| **c == command)
            .map(|(k, _)| k)
            .collect();
        keys.sort_by_key(|k| k.to_string());
        keys
    }

    /// One-line shortcut hint, e.g. "Ctrl+O: Open Folder | Ctrl+S: Save".
    ///
    /// Commands without a binding are left out.
    pub fn hint(&self, commands: &[Command]) -> String {
        commands
            .iter()
            .filter_map(|command| {
                self.keys_for(*command)
                    .first()
                    .map(|key| format!("{}: {}", key, command))
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}
