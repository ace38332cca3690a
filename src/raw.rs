//! Single-keystroke input and cursor visibility

use log::{trace, warn};

use crate::error::{Error, Result};
use crate::terminal::{DefaultTerminal, Terminal};

/// Reads a single key press without echo or line buffering.
///
/// The terminal is switched to raw mode for the duration of the call and
/// restored before returning, including when reading fails.
///
/// Keys are returned as the character a raw terminal delivers: Enter is
/// `'\r'`, Tab `'\t'`, Escape `'\x1b'`, Backspace `'\x7f'` and Ctrl
/// combinations their ASCII control code. Keys without such a character,
/// e.g. arrow keys, are skipped. `None` is returned when input has ended.
///
/// # Errors
///
/// `Error::Device` if the terminal cannot be switched to raw mode, e.g.
/// because standard input is redirected. Redirected output alone does not
/// prevent reading keys.
pub fn read_key<Term: Terminal>(term: &Term) -> Result<Option<char>> {
    let _guard = term.prepare().map_err(Error::device)?;

    loop {
        match term.read_key()? {
            Some(key) => match key.to_char() {
                Some(ch) => return Ok(Some(ch)),
                None => trace!("skipping key {:?}", key)
            },
            None => return Ok(None)
        }
    }
}

/// Shows or hides the text cursor.
///
/// Repeated calls with the same value emit the same control sequence again
/// and have no further effect.
pub fn set_cursor_visible<Term: Terminal>(term: &Term, visible: bool) -> Result<()> {
    term.set_cursor_visible(visible).map_err(Error::device)
}

/// Reads a single key press from the default terminal.
///
/// See [`read_key`](fn.read_key.html).
pub fn getkey() -> Result<Option<char>> {
    read_key(&DefaultTerminal::new()?)
}

/// Shows or hides the cursor of the default terminal.
pub fn show_cursor(visible: bool) -> Result<()> {
    set_cursor_visible(&DefaultTerminal::new()?, visible)
}

/// Keeps the cursor hidden until dropped
#[must_use]
pub struct HiddenCursor<'a, Term: Terminal> {
    term: &'a Term,
}

impl<'a, Term: Terminal> HiddenCursor<'a, Term> {
    /// Hides the cursor of `term`.
    pub fn new(term: &'a Term) -> Result<HiddenCursor<'a, Term>> {
        set_cursor_visible(term, false)?;
        Ok(HiddenCursor{term})
    }
}

impl<'a, Term: Terminal> Drop for HiddenCursor<'a, Term> {
    fn drop(&mut self) {
        if let Err(e) = self.term.set_cursor_visible(true) {
            warn!("failed to show cursor: {}", e);
        }
    }
}
