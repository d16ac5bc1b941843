//! Input Encoding Module
//!
//! Translates keyboard input into the text written to the shell. The
//! session's line discipline expects `\n` for Enter and `\b` for erase, so
//! both are normalized here regardless of what the frontend delivers.
//!
//! # Keyboard Encoding
//!
//! - Printable characters are sent as UTF-8
//! - Ctrl+letter produces the matching C0 control
//! - Alt prefixes the encoded key with ESC
//! - Cursor and navigation keys produce CSI sequences, with a modifier
//!   parameter when Shift, Alt or Ctrl is held

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };

    pub const ALT: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: true,
    };

    /// Get the modifier parameter for CSI sequences (1 + bitmask)
    /// Shift=1, Alt=2, Ctrl=4
    pub fn as_csi_param(&self) -> u8 {
        let mut param = 1;
        if self.shift {
            param += 1;
        }
        if self.alt {
            param += 2;
        }
        if self.ctrl {
            param += 4;
        }
        param
    }

    /// Check if any modifier is pressed
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

/// A key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character
    Char(char),

    // Cursor keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,

    // Editing
    Backspace,
    Tab,
    Enter,
    Escape,
}

/// Encode a key press into the text written to the shell
pub fn encode_key(key: Key, modifiers: Modifiers) -> String {
    match key {
        Key::Char(c) => encode_char(c, modifiers),

        Key::Up => encode_cursor_key('A', modifiers),
        Key::Down => encode_cursor_key('B', modifiers),
        Key::Right => encode_cursor_key('C', modifiers),
        Key::Left => encode_cursor_key('D', modifiers),

        Key::Home => encode_special_key(1, modifiers),
        Key::Insert => encode_special_key(2, modifiers),
        Key::Delete => encode_special_key(3, modifiers),
        Key::End => encode_special_key(4, modifiers),
        Key::PageUp => encode_special_key(5, modifiers),
        Key::PageDown => encode_special_key(6, modifiers),

        Key::Backspace => alt_prefixed("\x08", modifiers),
        Key::Tab => {
            if modifiers.shift {
                "\x1b[Z".to_string() // Shift+Tab = CSI Z (backtab)
            } else {
                alt_prefixed("\t", modifiers)
            }
        },
        Key::Enter => alt_prefixed("\n", modifiers),
        Key::Escape => "\x1b".to_string(),
    }
}

/// Encode a character with modifiers
pub fn encode_char(c: char, modifiers: Modifiers) -> String {
    if modifiers.ctrl && c.is_ascii_alphabetic() {
        // Ctrl+letter produces control character
        let ctrl_char = ((c.to_ascii_uppercase() as u8) - b'@') as char;
        alt_prefixed(&ctrl_char.to_string(), modifiers)
    } else {
        alt_prefixed(&encode_text(&c.to_string()), modifiers)
    }
}

/// Normalize typed or pasted text for the shell
///
/// `\r\n` and `\r` become `\n`, DEL becomes `\b`.
pub fn encode_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                result.push('\n');
            },
            '\x7f' => result.push('\x08'),
            _ => result.push(c),
        }
    }
    result
}

fn alt_prefixed(text: &str, modifiers: Modifiers) -> String {
    if modifiers.alt {
        format!("\x1b{}", text)
    } else {
        text.to_string()
    }
}

/// Encode a cursor key (arrow keys)
fn encode_cursor_key(code: char, modifiers: Modifiers) -> String {
    if modifiers.any() {
        // With modifiers: CSI 1 ; modifier code
        format!("\x1b[1;{}{}", modifiers.as_csi_param(), code)
    } else {
        format!("\x1b[{}", code)
    }
}

/// Encode a special key (Home, End, PgUp, PgDn, Insert, Delete)
fn encode_special_key(number: u8, modifiers: Modifiers) -> String {
    if modifiers.any() {
        format!("\x1b[{};{}~", number, modifiers.as_csi_param())
    } else {
        format!("\x1b[{}~", number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_keys() {
        let mods = Modifiers::NONE;
        assert_eq!(encode_key(Key::Up, mods), "\x1b[A");
        assert_eq!(encode_key(Key::Down, mods), "\x1b[B");
        assert_eq!(encode_key(Key::Right, mods), "\x1b[C");
        assert_eq!(encode_key(Key::Left, mods), "\x1b[D");
    }

    #[test]
    fn test_cursor_keys_with_modifiers() {
        let mods = Modifiers {
            shift: true,
            ctrl: false,
            alt: false,
        };
        assert_eq!(encode_key(Key::Up, mods), "\x1b[1;2A");
        assert_eq!(encode_key(Key::Up, Modifiers::CTRL), "\x1b[1;5A");

        let mods = Modifiers {
            shift: true,
            ctrl: true,
            alt: false,
        };
        assert_eq!(encode_key(Key::Up, mods), "\x1b[1;6A");
    }

    #[test]
    fn test_navigation_keys() {
        let mods = Modifiers::NONE;
        assert_eq!(encode_key(Key::Home, mods), "\x1b[1~");
        assert_eq!(encode_key(Key::End, mods), "\x1b[4~");
        assert_eq!(encode_key(Key::PageUp, mods), "\x1b[5~");
        assert_eq!(encode_key(Key::PageDown, mods), "\x1b[6~");
        assert_eq!(encode_key(Key::Delete, mods), "\x1b[3~");
        assert_eq!(encode_key(Key::Delete, Modifiers::CTRL), "\x1b[3;5~");
    }

    #[test]
    fn test_editing_keys() {
        let mods = Modifiers::NONE;
        assert_eq!(encode_key(Key::Backspace, mods), "\x08");
        assert_eq!(encode_key(Key::Tab, mods), "\t");
        assert_eq!(encode_key(Key::Enter, mods), "\n");
        assert_eq!(encode_key(Key::Escape, mods), "\x1b");
        assert_eq!(encode_key(Key::Enter, Modifiers::ALT), "\x1b\n");

        let shift = Modifiers {
            shift: true,
            ctrl: false,
            alt: false,
        };
        assert_eq!(encode_key(Key::Tab, shift), "\x1b[Z");
    }

    #[test]
    fn test_encode_char() {
        assert_eq!(encode_key(Key::Char('a'), Modifiers::NONE), "a");
        assert_eq!(encode_key(Key::Char('界'), Modifiers::NONE), "界");

        assert_eq!(encode_char('c', Modifiers::CTRL), "\x03"); // Ctrl+C
        assert_eq!(encode_char('D', Modifiers::CTRL), "\x04"); // Ctrl+D
        assert_eq!(encode_char('x', Modifiers::ALT), "\x1bx");

        let ctrl_alt = Modifiers {
            shift: false,
            ctrl: true,
            alt: true,
        };
        assert_eq!(encode_char('a', ctrl_alt), "\x1b\x01");
    }

    #[test]
    fn test_encode_char_normalizes() {
        assert_eq!(encode_char('\r', Modifiers::NONE), "\n");
        assert_eq!(encode_char('\x7f', Modifiers::NONE), "\x08");
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("ls -l\r"), "ls -l\n");
        assert_eq!(encode_text("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(encode_text("ab\x7fc"), "ab\x08c");
        assert_eq!(encode_text("plain"), "plain");
    }
}
