//! Translation from iced key events to keymap key presses.

use iced::keyboard::{self, key::Named};
use treepad_core::{Key, KeyPress, Modifiers};

/// Converts an iced key event; keys the keymap cannot bind give `None`.
pub fn to_key_press(key: &keyboard::Key, modifiers: keyboard::Modifiers) -> Option<KeyPress> {
    let key = match key {
        keyboard::Key::Character(c) => Key::parse(c.as_str())?,
        keyboard::Key::Named(named) => match named {
            Named::Enter => Key::Enter,
            Named::Tab => Key::Tab,
            Named::Escape => Key::Escape,
            Named::Space => Key::Space,
            Named::F1 => Key::F(1),
            Named::F2 => Key::F(2),
            Named::F3 => Key::F(3),
            Named::F4 => Key::F(4),
            Named::F5 => Key::F(5),
            Named::F6 => Key::F(6),
            Named::F7 => Key::F(7),
            Named::F8 => Key::F(8),
            Named::F9 => Key::F(9),
            Named::F10 => Key::F(10),
            Named::F11 => Key::F(11),
            Named::F12 => Key::F(12),
            _ => return None,
        },
        keyboard::Key::Unidentified => return None,
    };

    Some(KeyPress::new(
        key,
        Modifiers {
            ctrl: modifiers.control(),
            alt: modifiers.alt(),
            shift: modifiers.shift(),
            meta: modifiers.logo(),
        },
    ))
}
