//! Provides a low-level terminal interface

use std::io;

use mortal::Key as DeviceKey;

use crate::sys;

/// Sequence emitted to hide the text cursor
pub const HIDE_CURSOR: &str = "\x1b[?25l";

/// Sequence emitted to show the text cursor
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Returns the control sequence that sets cursor visibility.
pub fn cursor_sequence(visible: bool) -> &'static str {
    if visible { SHOW_CURSOR } else { HIDE_CURSOR }
}

/// A single key read from the terminal in raw mode
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Key {
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Down arrow key
    Down,
    /// End key
    End,
    /// Enter or Return key
    Enter,
    /// Escape key
    Escape,
    /// Home key
    Home,
    /// Left arrow key
    Left,
    /// Right arrow key
    Right,
    /// Tab key
    Tab,
    /// Up arrow key
    Up,
    /// Character key
    Char(char),
    /// Control key combined with a lowercase character
    Ctrl(char),
    /// Any other key, e.g. a function key
    Other,
}

impl Key {
    /// Decodes a single input character.
    ///
    /// Control characters with a dedicated key (`'\r'`, `'\t'`, escape,
    /// rubout) are returned as that key; others become `Key::Ctrl`.
    pub fn from_char(ch: char) -> Key {
        match ch {
            '\x7f' => Key::Backspace,
            '\x00' ..= '\x1f' => Key::ctrl(((ch as u8) | 0x60) as char),
            _ => Key::Char(ch)
        }
    }

    /// Returns the key for Ctrl combined with `ch`.
    pub fn ctrl(ch: char) -> Key {
        match ch.to_ascii_lowercase() {
            'h' => Key::Backspace,
            'i' => Key::Tab,
            'j' | 'm' => Key::Enter,
            '[' | '{' => Key::Escape,
            ch => Key::Ctrl(ch)
        }
    }

    /// Returns the character a raw terminal would deliver for this key.
    ///
    /// Keys without a single-character form, such as arrow keys,
    /// return `None`.
    pub fn to_char(&self) -> Option<char> {
        match *self {
            Key::Char(ch) => Some(ch),
            Key::Enter => Some('\r'),
            Key::Tab => Some('\t'),
            Key::Escape => Some('\x1b'),
            Key::Backspace => Some('\x7f'),
            Key::Ctrl(ch) if ch.is_ascii() => Some(((ch as u8) & 0x1f) as char),
            _ => None
        }
    }
}

impl From<DeviceKey> for Key {
    fn from(key: DeviceKey) -> Key {
        match key {
            DeviceKey::Backspace => Key::Backspace,
            DeviceKey::Delete => Key::Delete,
            DeviceKey::Down => Key::Down,
            DeviceKey::End => Key::End,
            DeviceKey::Enter => Key::Enter,
            DeviceKey::Escape => Key::Escape,
            DeviceKey::Home => Key::Home,
            DeviceKey::Left => Key::Left,
            DeviceKey::Right => Key::Right,
            DeviceKey::Tab => Key::Tab,
            DeviceKey::Up => Key::Up,
            DeviceKey::Char(ch) => Key::from_char(ch),
            DeviceKey::Ctrl(ch) => Key::ctrl(ch),
            _ => Key::Other
        }
    }
}

/// Represents the size of a terminal window
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Size {
    /// Number of lines in the terminal
    pub lines: usize,
    /// Number of columns in the terminal
    pub columns: usize,
}

/// Type alias for the platform-dependent default `Terminal` interface
pub type DefaultTerminal = sys::Terminal;

/// Defines a low-level interface to the terminal
pub trait Terminal: Sized {
    /// Returned by `prepare`.
    /// When dropped, the prior terminal state will be restored.
    type PrepareGuard;

    /// Initialize the terminal interface
    ///
    /// This succeeds when input or output are redirected;
    /// such a terminal reports `is_interactive() == false`.
    fn new() -> io::Result<Self>;

    /// Returns whether input and output are both connected to a terminal
    /// device, so that lines can be edited in place.
    fn is_interactive(&self) -> bool;

    /// Switches the terminal to raw mode: unbuffered, without echo and
    /// delivering signal characters as input.
    ///
    /// Only input needs to be a terminal; this succeeds when output alone
    /// is redirected.
    ///
    /// When the returned value is dropped, the terminal will be restored to its
    /// state prior to calling `prepare`.
    fn prepare(&self) -> io::Result<Self::PrepareGuard>;

    /// Blocks until a key is read from a prepared terminal.
    ///
    /// Returns `Ok(None)` when input has ended.
    fn read_key(&self) -> io::Result<Option<Key>>;

    /// Reads a line of input in cooked mode, without trailing newline.
    ///
    /// Returns `Ok(None)` when input has ended.
    fn read_line(&self) -> io::Result<Option<String>>;

    /// Returns the size of the terminal window
    fn size(&self) -> io::Result<Size>;

    /// Shows or hides the text cursor.
    fn set_cursor_visible(&self, visible: bool) -> io::Result<()>;

    /// Moves the cursor left `n` cells; `n` may be zero.
    fn move_left(&self, n: usize) -> io::Result<()>;

    /// Moves the cursor to the first column of the current line
    fn move_to_first_col(&self) -> io::Result<()>;

    /// Clears characters from the cursor to the end of the current line.
    fn clear_to_line_end(&self) -> io::Result<()>;

    /// Rings the terminal bell
    fn ring_bell(&self) -> io::Result<()>;

    /// Writes output to the terminal and immediately flushes it to the device.
    ///
    /// For each newline `'\n'` written to the terminal, the cursor should
    /// be moved to the first column of the following line.
    fn write(&self, s: &str) -> io::Result<()>;
}

#[cfg(test)]
mod test {
    use super::{cursor_sequence, Key};

    #[test]
    fn test_key_from_char() {
        assert_eq!(Key::from_char('a'), Key::Char('a'));
        assert_eq!(Key::from_char('\r'), Key::Enter);
        assert_eq!(Key::from_char('\n'), Key::Enter);
        assert_eq!(Key::from_char('\t'), Key::Tab);
        assert_eq!(Key::from_char('\x1b'), Key::Escape);
        assert_eq!(Key::from_char('\x7f'), Key::Backspace);
        assert_eq!(Key::from_char('\x08'), Key::Backspace);
        assert_eq!(Key::from_char('\x03'), Key::Ctrl('c'));
        assert_eq!(Key::from_char('\x04'), Key::Ctrl('d'));
        assert_eq!(Key::from_char('é'), Key::Char('é'));
    }

    #[test]
    fn test_key_to_char() {
        assert_eq!(Key::Char('Q').to_char(), Some('Q'));
        assert_eq!(Key::Enter.to_char(), Some('\r'));
        assert_eq!(Key::Ctrl('c').to_char(), Some('\x03'));
        assert_eq!(Key::Backspace.to_char(), Some('\x7f'));
        assert_eq!(Key::Left.to_char(), None);
        assert_eq!(Key::Other.to_char(), None);

        for ch in (0u8..0x80).map(char::from) {
            let key = Key::from_char(ch);
            if ch == '\n' || ch == '\x08' {
                continue;
            }
            assert_eq!(key.to_char(), Some(ch), "{:?}", key);
        }
    }

    #[test]
    fn test_ctrl_aliases() {
        assert_eq!(Key::ctrl('M'), Key::Enter);
        assert_eq!(Key::ctrl('i'), Key::Tab);
        assert_eq!(Key::ctrl('H'), Key::Backspace);
        assert_eq!(Key::ctrl('W'), Key::Ctrl('w'));
    }

    #[test]
    fn test_cursor_sequence() {
        assert_eq!(cursor_sequence(false), "\x1b[?25l");
        assert_eq!(cursor_sequence(true), "\x1b[?25h");
    }
}
