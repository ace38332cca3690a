//! Implements an in-memory `Terminal` interface
//!
//! The main purpose of the in-memory terminal is for scripted testing of
//! prompts and menus: input is queued with `push_input` and the resulting
//! screen contents are inspected with `rows` or `screen`.

use std::cell::RefCell;
use std::cmp::min;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use crate::terminal::{Key, Size, Terminal};

/// Default size of a `MemoryTerminal` buffer
pub const DEFAULT_SIZE: Size = Size{
    columns: 80,
    lines: 24,
};

/// Implements an in-memory `Terminal` interface
///
/// The contents of a `MemoryTerminal` are shared. That is, cloning
/// a `MemoryTerminal` value will share the contained terminal buffer.
#[derive(Clone, Debug)]
pub struct MemoryTerminal {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Debug)]
struct Inner {
    memory: Vec<char>,
    input: VecDeque<char>,
    col: usize,
    line: usize,
    size: Size,
    interactive: bool,
    output_terminal: bool,
    raw_mode: bool,
    cursor_visible: bool,
    cursor_toggles: usize,
    bells: usize,
    fail_read: bool,
}

/// Restores the raw mode flag of a `MemoryTerminal` when dropped
#[must_use]
pub struct MemoryGuard {
    inner: Rc<RefCell<Inner>>,
    prev_raw: bool,
}

impl Drop for MemoryGuard {
    fn drop(&mut self) {
        self.inner.borrow_mut().raw_mode = self.prev_raw;
    }
}

impl MemoryTerminal {
    /// Returns a new `MemoryTerminal` with the given buffer size
    ///
    /// # Panics
    ///
    /// If either of the `lines` or `columns` fields are `0`.
    pub fn with_size(size: Size) -> MemoryTerminal {
        MemoryTerminal{
            inner: Rc::new(RefCell::new(Inner::new(size))),
        }
    }

    /// Returns whether any input remains to be read.
    pub fn has_input(&self) -> bool {
        !self.inner.borrow().input.is_empty()
    }

    /// Pushes a character sequence to the back of the input queue.
    ///
    /// Arrow keys and other special keys are given as the escape sequences
    /// a VT100 terminal sends, e.g. `"\x1b[A"` for the up arrow.
    pub fn push_input(&self, s: &str) {
        self.inner.borrow_mut().input.extend(s.chars());
    }

    /// Sets whether the terminal behaves as an interactive device.
    ///
    /// A non-interactive terminal refuses to enter raw mode, the way a
    /// redirected standard input does.
    pub fn set_interactive(&self, interactive: bool) {
        self.inner.borrow_mut().interactive = interactive;
    }

    /// Sets whether output behaves as redirected away from the terminal.
    ///
    /// Raw mode remains available, but lines are no longer edited in place.
    pub fn redirect_output(&self, redirected: bool) {
        self.inner.borrow_mut().output_terminal = !redirected;
    }

    /// Causes the next key read to fail with an I/O error.
    pub fn fail_next_read(&self) {
        self.inner.borrow_mut().fail_read = true;
    }

    /// Returns whether the terminal is currently in raw mode.
    pub fn is_raw(&self) -> bool {
        self.inner.borrow().raw_mode
    }

    /// Returns whether the cursor is currently visible.
    pub fn cursor_visible(&self) -> bool {
        self.inner.borrow().cursor_visible
    }

    /// Returns the number of cursor visibility changes requested so far,
    /// including those that did not change visibility.
    pub fn cursor_toggles(&self) -> usize {
        self.inner.borrow().cursor_toggles
    }

    /// Returns the number of times the bell was rung.
    pub fn bells(&self) -> usize {
        self.inner.borrow().bells
    }

    /// Returns each screen row as a string, including trailing blanks.
    pub fn rows(&self) -> Vec<String> {
        let inner = self.inner.borrow();

        inner.memory.chunks(inner.size.columns)
            .map(|row| row.iter().collect())
            .collect()
    }

    /// Returns the screen rows with trailing blanks removed, omitting
    /// empty rows at the bottom.
    pub fn screen(&self) -> Vec<String> {
        let mut rows = self.rows();

        for row in &mut rows {
            let len = row.trim_end().len();
            row.truncate(len);
        }

        while rows.last().map_or(false, |r| r.is_empty()) {
            rows.pop();
        }

        rows
    }

    /// Writes some text into the buffer.
    ///
    /// If the text extends beyond the length of the current line without a
    /// newline character (`'\n'`), the extraneous text will be dropped.
    pub fn write(&self, s: &str) {
        self.inner.borrow_mut().write(s);
    }
}

impl Default for MemoryTerminal {
    fn default() -> MemoryTerminal {
        MemoryTerminal::with_size(DEFAULT_SIZE)
    }
}

impl Inner {
    fn new(size: Size) -> Inner {
        assert!(size.lines != 0 && size.columns != 0,
            "zero-area terminal buffer: {:?}", size);

        let n_chars = size.lines * size.columns;

        Inner{
            memory: vec![' '; n_chars],
            input: VecDeque::new(),
            col: 0,
            line: 0,
            size,
            interactive: true,
            output_terminal: true,
            raw_mode: false,
            cursor_visible: true,
            cursor_toggles: 0,
            bells: 0,
            fail_read: false,
        }
    }

    fn clear_to_line_end(&mut self) {
        let start = self.index();
        let end = (self.line + 1) * self.size.columns;

        for ch in &mut self.memory[start..end] {
            *ch = ' ';
        }
    }

    fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    fn read_key(&mut self) -> Option<Key> {
        let ch = self.input.pop_front()?;

        if ch != '\x1b' || self.input.front() != Some(&'[') {
            return Some(Key::from_char(ch));
        }

        self.input.pop_front();

        let key = match self.input.pop_front() {
            Some('A') => Key::Up,
            Some('B') => Key::Down,
            Some('C') => Key::Right,
            Some('D') => Key::Left,
            Some('H') => Key::Home,
            Some('F') => Key::End,
            Some('3') if self.input.front() == Some(&'~') => {
                self.input.pop_front();
                Key::Delete
            }
            _ => Key::Other
        };

        Some(key)
    }

    fn read_line(&mut self) -> Option<String> {
        if self.input.is_empty() {
            return None;
        }

        let mut line = String::new();

        while let Some(ch) = self.input.pop_front() {
            if ch == '\n' {
                break;
            }
            line.push(ch);
        }

        Some(line)
    }

    fn scroll_up(&mut self, n: usize) {
        let chars = min(self.memory.len(), self.size.columns * n);
        self.memory.drain(..chars);
        self.memory.extend(std::iter::repeat(' ').take(chars));
        self.line = self.line.saturating_sub(n);
    }

    fn write(&mut self, s: &str) {
        for ch in s.chars() {
            if ch == '\n' {
                self.advance_line();
            } else {
                self.write_char(ch);
            }
        }
    }

    fn advance_line(&mut self) {
        self.line += 1;
        self.col = 0;
        if self.line == self.size.lines {
            self.scroll_up(1);
        }
    }

    fn write_char(&mut self, ch: char) {
        if self.col < self.size.columns && self.line < self.size.lines {
            let idx = self.index();
            self.memory[idx] = ch;
            self.col += 1;
        }
    }

    fn index(&self) -> usize {
        self.line * self.size.columns + self.col
    }
}

impl Terminal for MemoryTerminal {
    type PrepareGuard = MemoryGuard;

    fn new() -> io::Result<MemoryTerminal> {
        Ok(MemoryTerminal::default())
    }

    fn is_interactive(&self) -> bool {
        let inner = self.inner.borrow();
        inner.interactive && inner.output_terminal
    }

    fn prepare(&self) -> io::Result<MemoryGuard> {
        let mut inner = self.inner.borrow_mut();

        if !inner.interactive {
            return Err(io::Error::new(io::ErrorKind::Other,
                "standard input is not a terminal"));
        }

        let prev_raw = inner.raw_mode;
        inner.raw_mode = true;

        Ok(MemoryGuard{
            inner: self.inner.clone(),
            prev_raw,
        })
    }

    fn read_key(&self) -> io::Result<Option<Key>> {
        let mut inner = self.inner.borrow_mut();

        if inner.fail_read {
            inner.fail_read = false;
            return Err(io::Error::new(io::ErrorKind::Other, "read failed"));
        }

        Ok(inner.read_key())
    }

    fn read_line(&self) -> io::Result<Option<String>> {
        Ok(self.inner.borrow_mut().read_line())
    }

    fn size(&self) -> io::Result<Size> {
        Ok(self.inner.borrow().size)
    }

    fn set_cursor_visible(&self, visible: bool) -> io::Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.cursor_visible = visible;
        inner.cursor_toggles += 1;
        Ok(())
    }

    fn move_left(&self, n: usize) -> io::Result<()> {
        self.inner.borrow_mut().move_left(n);
        Ok(())
    }

    fn move_to_first_col(&self) -> io::Result<()> {
        self.inner.borrow_mut().col = 0;
        Ok(())
    }

    fn clear_to_line_end(&self) -> io::Result<()> {
        self.inner.borrow_mut().clear_to_line_end();
        Ok(())
    }

    fn ring_bell(&self) -> io::Result<()> {
        self.inner.borrow_mut().bells += 1;
        Ok(())
    }

    fn write(&self, s: &str) -> io::Result<()> {
        self.write(s);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::MemoryTerminal;
    use crate::terminal::{Key, Size, Terminal};

    #[test]
    fn test_memory_term() {
        let mem = MemoryTerminal::with_size(Size{lines: 3, columns: 5});
        assert_eq!(mem.rows(), ["     "; 3]);

        mem.write("menu\n> ");
        assert_eq!(mem.rows(), ["menu ", ">    ", "     "]);

        // Text past the last column is dropped
        mem.write("abcdef");
        assert_eq!(mem.screen(), vec!["menu", "> abc"]);

        // Writing past the last line scrolls
        mem.write("\nx\ny");
        assert_eq!(mem.screen(), vec!["> abc", "x", "y"]);

        Terminal::move_to_first_col(&mem).unwrap();
        mem.write("zz");
        Terminal::move_left(&mem, 1).unwrap();
        mem.clear_to_line_end().unwrap();
        assert_eq!(mem.screen(), vec!["> abc", "x", "z"]);
    }

    #[test]
    fn test_read_keys() {
        let mem = MemoryTerminal::default();

        mem.push_input("a\x1b[A\x1b[3~\x1bq\x03\r");

        assert_matches!(mem.read_key(), Ok(Some(Key::Char('a'))));
        assert_matches!(mem.read_key(), Ok(Some(Key::Up)));
        assert_matches!(mem.read_key(), Ok(Some(Key::Delete)));
        assert_matches!(mem.read_key(), Ok(Some(Key::Escape)));
        assert_matches!(mem.read_key(), Ok(Some(Key::Char('q'))));
        assert_matches!(mem.read_key(), Ok(Some(Key::Ctrl('c'))));
        assert_matches!(mem.read_key(), Ok(Some(Key::Enter)));
        assert_matches!(mem.read_key(), Ok(None));
    }

    #[test]
    fn test_read_lines() {
        let mem = MemoryTerminal::default();

        mem.push_input("one\n\nthree");

        assert_eq!(mem.read_line().unwrap(), Some("one".to_owned()));
        assert_eq!(mem.read_line().unwrap(), Some(String::new()));
        assert_eq!(mem.read_line().unwrap(), Some("three".to_owned()));
        assert_eq!(mem.read_line().unwrap(), None);
    }

    #[test]
    fn test_prepare_guard() {
        let mem = MemoryTerminal::default();

        {
            let _guard = mem.prepare().unwrap();
            assert!(mem.is_raw());
            {
                let _inner = mem.prepare().unwrap();
                assert!(mem.is_raw());
            }
            assert!(mem.is_raw());
        }
        assert!(!mem.is_raw());

        mem.set_interactive(false);
        assert!(mem.prepare().is_err());
        assert!(!mem.is_raw());
    }
}
