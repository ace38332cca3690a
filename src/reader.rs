//! Provides the interactive line editor used by prompts and menus

use std::io;
use std::mem::replace;

use log::{debug, trace};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::complete::{collect_completions, word_break_start,
    Completer, DummyCompleter, WORD_BREAK_CHARS};
use crate::config::{BellStyle, Config};
use crate::error::{Error, Result};
use crate::terminal::{Key, Terminal};
use crate::util::{format_columns, longest_common_prefix};

/// Indicates the start of a series of invisible characters in the prompt
pub const START_INVISIBLE: char = '\x01';

/// Indicates the end of a series of invisible characters in the prompt
pub const END_INVISIBLE: char = '\x02';

/// The result of `Reader::read_line`
#[derive(Debug, Eq, PartialEq)]
pub enum ReadResult {
    /// User issued end-of-file
    Eof,
    /// User input received
    Input(String),
    /// User pressed Ctrl-C
    Interrupt,
}

/// Interactively reads user input
///
/// When the terminal is interactive, lines are edited in raw mode:
///
/// | Key                   | Action                                 |
/// |-----------------------|----------------------------------------|
/// | Left, Ctrl-B          | Move back one character                |
/// | Right, Ctrl-F         | Move forward one character             |
/// | Home, Ctrl-A          | Move to start of line                  |
/// | End, Ctrl-E           | Move to end of line                    |
/// | Backspace, Ctrl-H     | Delete previous character              |
/// | Delete                | Delete character under cursor          |
/// | Ctrl-D                | Delete under cursor; end input if empty|
/// | Ctrl-K                | Delete to end of line                  |
/// | Ctrl-U                | Delete to start of line                |
/// | Ctrl-W                | Delete previous word                   |
/// | Up, Ctrl-P            | Previous history entry                 |
/// | Down, Ctrl-N          | Next history entry                     |
/// | Tab                   | Complete word before cursor            |
/// | Ctrl-C                | Interrupt                              |
///
/// Otherwise, the prompt is printed and a plain line is read.
pub struct Reader<Term: Terminal> {
    term: Term,
    config: Config,
    completer: Box<dyn Completer>,
    completion_append: Option<char>,
    history: Vec<String>,
}

/// Line being edited by a single `read_line` call
struct Line {
    prompt: String,
    /// Display width of `prompt`, excluding invisible sequences
    prompt_width: usize,
    buffer: String,
    /// Byte position of the cursor in `buffer`
    cursor: usize,
    /// Byte position in `buffer` of the first character displayed
    scroll: usize,
    /// Entry shown from history; `None` while editing a new line
    history_index: Option<usize>,
    /// New line saved while browsing history
    backup: String,
    /// Whether the previous key was Tab
    last_tab: bool,
}

impl<Term: Terminal> Reader<Term> {
    /// Creates a `Reader` using the given terminal, with no completion
    /// and default configuration.
    pub fn new(term: Term) -> Reader<Term> {
        Reader{
            term,
            config: Config::default(),
            completer: Box::new(DummyCompleter),
            completion_append: Some(' '),
            history: Vec::new(),
        }
    }

    /// Returns the terminal interface.
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Returns the editor configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the editor configuration.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Replaces the current completer, returning the previous instance.
    pub fn set_completer(&mut self, completer: Box<dyn Completer>) -> Box<dyn Completer> {
        replace(&mut self.completer, completer)
    }

    /// Returns the character appended after a word completed to a single
    /// match. The default is a space.
    pub fn completion_append_character(&self) -> Option<char> {
        self.completion_append
    }

    /// Sets the character appended after a word completed to a single
    /// match, or `None` to append nothing.
    pub fn set_completion_append_character(&mut self, ch: Option<char>) {
        self.completion_append = ch;
    }

    /// Returns the lines entered during this session, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Adds a line to history, unless it is empty or identical to the most
    /// recent entry.
    pub fn add_history(&mut self, line: String) {
        if !line.is_empty() && self.history.last() != Some(&line) {
            self.history.push(line);
        }
    }

    /// Reads a line from the terminal, displaying `prompt`.
    ///
    /// The returned input does not contain a trailing newline. Accepted
    /// non-empty lines are added to history.
    ///
    /// If `prompt` contains terminal escape sequences (e.g. color codes),
    /// they should be enclosed by `START_INVISIBLE` and `END_INVISIBLE`.
    pub fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        let prompt_width = visible_width(prompt);
        let prompt = strip_invisible(prompt);

        if !self.term.is_interactive() {
            self.term.write(&prompt)?;

            return Ok(match self.term.read_line()? {
                Some(line) => ReadResult::Input(line),
                None => ReadResult::Eof
            });
        }

        let res = {
            let _guard = self.term.prepare().map_err(Error::device)?;
            self.edit_line(prompt, prompt_width)?
        };

        if let ReadResult::Input(ref line) = res {
            self.add_history(line.clone());
        }

        Ok(res)
    }

    fn edit_line(&self, prompt: String, prompt_width: usize) -> io::Result<ReadResult> {
        let mut line = Line::new(prompt, prompt_width);

        line.redraw(&self.term)?;

        loop {
            let key = match self.term.read_key()? {
                Some(key) => key,
                None => {
                    self.term.write("\n")?;
                    return Ok(ReadResult::Eof);
                }
            };

            trace!("editing key {:?}", key);

            if let Some(res) = self.handle_key(&mut line, key)? {
                return Ok(res);
            }

            line.last_tab = key == Key::Tab;
        }
    }

    fn handle_key(&self, line: &mut Line, key: Key) -> io::Result<Option<ReadResult>> {
        let term = &self.term;

        match key {
            Key::Enter => {
                term.write("\n")?;
                return Ok(Some(ReadResult::Input(line.buffer.clone())));
            }
            Key::Ctrl('c') => {
                term.write("^C\n")?;
                return Ok(Some(ReadResult::Interrupt));
            }
            Key::Ctrl('d') if line.buffer.is_empty() => {
                term.write("\n")?;
                return Ok(Some(ReadResult::Eof));
            }
            Key::Tab => self.complete_word(line)?,
            Key::Char(ch) if !ch.is_control() => {
                line.buffer.insert(line.cursor, ch);
                line.cursor += ch.len_utf8();
                line.redraw(term)?;
            }
            Key::Backspace => match line.prev_char() {
                Some(pos) => {
                    line.buffer.drain(pos..line.cursor);
                    line.cursor = pos;
                    line.redraw(term)?;
                }
                None => self.bell()?
            },
            Key::Delete | Key::Ctrl('d') => match line.next_char() {
                Some(pos) => {
                    line.buffer.drain(line.cursor..pos);
                    line.redraw(term)?;
                }
                None => self.bell()?
            },
            Key::Left | Key::Ctrl('b') => match line.prev_char() {
                Some(pos) => line.move_to(term, pos)?,
                None => self.bell()?
            },
            Key::Right | Key::Ctrl('f') => match line.next_char() {
                Some(pos) => line.move_to(term, pos)?,
                None => self.bell()?
            },
            Key::Home | Key::Ctrl('a') => line.move_to(term, 0)?,
            Key::End | Key::Ctrl('e') => {
                let end = line.buffer.len();
                line.move_to(term, end)?;
            }
            Key::Ctrl('k') => {
                line.buffer.truncate(line.cursor);
                line.redraw(term)?;
            }
            Key::Ctrl('u') => {
                line.buffer.drain(..line.cursor);
                line.cursor = 0;
                line.redraw(term)?;
            }
            Key::Ctrl('w') => {
                let start = word_start(&line.buffer[..line.cursor]);
                line.buffer.drain(start..line.cursor);
                line.cursor = start;
                line.redraw(term)?;
            }
            Key::Up | Key::Ctrl('p') => self.prev_history(line)?,
            Key::Down | Key::Ctrl('n') => self.next_history(line)?,
            _ => self.bell()?
        }

        Ok(None)
    }

    fn prev_history(&self, line: &mut Line) -> io::Result<()> {
        let idx = match line.history_index {
            None if !self.history.is_empty() => {
                line.backup = line.buffer.clone();
                self.history.len() - 1
            }
            Some(idx) if idx > 0 => idx - 1,
            _ => return self.bell()
        };

        line.history_index = Some(idx);
        line.set_buffer(&self.term, &self.history[idx])
    }

    fn next_history(&self, line: &mut Line) -> io::Result<()> {
        match line.history_index {
            Some(idx) if idx + 1 < self.history.len() => {
                line.history_index = Some(idx + 1);
                line.set_buffer(&self.term, &self.history[idx + 1])
            }
            Some(_) => {
                line.history_index = None;
                let backup = replace(&mut line.backup, String::new());
                line.set_buffer(&self.term, &backup)
            }
            None => self.bell()
        }
    }

    fn complete_word(&self, line: &mut Line) -> io::Result<()> {
        let end = line.cursor;
        let start = word_break_start(&line.buffer[..end], WORD_BREAK_CHARS);
        let word = line.buffer[start..end].to_owned();

        let completions = collect_completions(&*self.completer, &word);

        debug!("{} completions for {:?}", completions.len(), word);

        match completions.len() {
            0 => self.bell(),
            1 => {
                let mut compl = completions[0].clone();
                compl.extend(self.completion_append);
                line.replace_range(&self.term, start, &compl)
            }
            _ => {
                let pfx = longest_common_prefix(completions.iter().map(|s| &s[..]))
                    .unwrap_or("");

                if pfx.len() > word.len() {
                    line.replace_range(&self.term, start, pfx)?;

                    if self.config.show_all_if_ambiguous {
                        self.show_completions(line, &completions)?;
                    }
                    Ok(())
                } else if line.last_tab || self.config.show_all_if_ambiguous {
                    self.show_completions(line, &completions)
                } else {
                    self.bell()
                }
            }
        }
    }

    fn show_completions(&self, line: &mut Line, completions: &[String]) -> io::Result<()> {
        let term = &self.term;
        let n = completions.len();

        term.write("\n")?;

        if n >= self.config.completion_query_items {
            term.write(&format!("Display all {} possibilities? (y or n)", n))?;

            let show = loop {
                match term.read_key()? {
                    Some(Key::Char('y')) | Some(Key::Char('Y')) | Some(Key::Char(' ')) => break true,
                    Some(Key::Char('n')) | Some(Key::Char('N')) | Some(Key::Backspace) |
                    Some(Key::Ctrl('c')) | None => break false,
                    Some(_) => continue
                }
            };

            term.write("\n")?;

            if !show {
                return line.redraw(term);
            }
        }

        let width = term.size()?.columns;

        for row in format_columns(completions, width,
                self.config.print_completions_horizontally) {
            term.write(&row)?;
            term.write("\n")?;
        }

        line.redraw(term)
    }

    fn bell(&self) -> io::Result<()> {
        match self.config.bell_style {
            BellStyle::None => Ok(()),
            BellStyle::Audible | BellStyle::Visible => self.term.ring_bell()
        }
    }
}

impl Line {
    fn new(prompt: String, prompt_width: usize) -> Line {
        Line{
            prompt,
            prompt_width,
            buffer: String::new(),
            cursor: 0,
            scroll: 0,
            history_index: None,
            backup: String::new(),
            last_tab: false,
        }
    }

    fn prev_char(&self) -> Option<usize> {
        self.buffer[..self.cursor].char_indices().next_back().map(|(idx, _)| idx)
    }

    fn next_char(&self) -> Option<usize> {
        self.buffer[self.cursor..].chars().next().map(|ch| self.cursor + ch.len_utf8())
    }

    fn move_to<Term: Terminal>(&mut self, term: &Term, pos: usize) -> io::Result<()> {
        self.cursor = pos;
        self.redraw(term)
    }

    fn set_buffer<Term: Terminal>(&mut self, term: &Term, s: &str) -> io::Result<()> {
        self.buffer.clear();
        self.buffer.push_str(s);
        self.cursor = self.buffer.len();
        self.redraw(term)
    }

    /// Replaces text between `start` and the cursor, leaving the cursor
    /// after the inserted text.
    fn replace_range<Term: Terminal>(&mut self, term: &Term, start: usize, s: &str)
            -> io::Result<()> {
        self.buffer.replace_range(start..self.cursor, s);
        self.cursor = start + s.len();
        self.redraw(term)
    }

    /// Redraws the prompt and buffer on the current row.
    ///
    /// The last column is never written, so the row does not wrap. When the
    /// line is wider, only the part around the cursor is displayed; the
    /// prompt is hidden if it leaves no room for input.
    fn redraw<Term: Terminal>(&mut self, term: &Term) -> io::Result<()> {
        let width = term.size()?.columns.saturating_sub(1).max(1);

        let (prompt, room) = if self.prompt_width < width {
            (&self.prompt[..], width - self.prompt_width)
        } else {
            ("", width)
        };

        if self.buffer.width() <= room {
            self.scroll = 0;
        } else if self.scroll > self.cursor || !self.buffer.is_char_boundary(self.scroll) {
            self.scroll = self.cursor;
        }

        while self.buffer[self.scroll..self.cursor].width() > room {
            let ch = match self.buffer[self.scroll..].chars().next() {
                Some(ch) => ch,
                None => break
            };
            self.scroll += ch.len_utf8();
        }

        let mut end = self.scroll;
        let mut shown = 0;

        for ch in self.buffer[self.scroll..].chars() {
            let w = ch.width().unwrap_or(0);
            if shown + w > room {
                break;
            }
            shown += w;
            end += ch.len_utf8();
        }

        term.move_to_first_col()?;
        term.write(prompt)?;
        term.write(&self.buffer[self.scroll..end])?;
        term.clear_to_line_end()?;
        term.move_left(self.buffer[self.cursor..end].width())
    }
}

/// Removes `START_INVISIBLE` and `END_INVISIBLE` markers from a prompt.
pub(crate) fn strip_invisible(prompt: &str) -> String {
    prompt.chars()
        .filter(|&ch| ch != START_INVISIBLE && ch != END_INVISIBLE)
        .collect()
}

/// Returns the display width of a prompt, not counting characters enclosed
/// by `START_INVISIBLE` and `END_INVISIBLE`.
fn visible_width(prompt: &str) -> usize {
    let mut invisible = false;
    let mut width = 0;

    for ch in prompt.chars() {
        match ch {
            START_INVISIBLE => invisible = true,
            END_INVISIBLE => invisible = false,
            ch if !invisible => width += ch.width().unwrap_or(0),
            _ => ()
        }
    }

    width
}

/// Returns the start of the whitespace-delimited word ending at the end of `s`.
fn word_start(s: &str) -> usize {
    let trimmed = s.trim_end();

    trimmed.char_indices()
        .rev()
        .take_while(|&(_, ch)| !ch.is_whitespace())
        .last()
        .map_or(trimmed.len(), |(idx, _)| idx)
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::{visible_width, word_start, ReadResult, Reader, START_INVISIBLE, END_INVISIBLE};
    use crate::complete::WordCompleter;
    use crate::config::{BellStyle, Config};
    use crate::error::Error;
    use crate::memory::MemoryTerminal;
    use crate::terminal::Size;

    fn reader(input: &str) -> (MemoryTerminal, Reader<MemoryTerminal>) {
        let term = MemoryTerminal::default();
        term.push_input(input);
        (term.clone(), Reader::new(term))
    }

    fn commands() -> Box<WordCompleter> {
        Box::new(WordCompleter::new(vec!["start", "stop", "list", "print"]))
    }

    fn input(s: &str) -> ReadResult {
        ReadResult::Input(s.to_owned())
    }

    #[test]
    fn test_read_plain() {
        let (term, mut r) = reader("hello\rworld\r");

        assert_eq!(r.read_line("> ").unwrap(), input("hello"));
        assert_eq!(r.read_line("> ").unwrap(), input("world"));
        assert_eq!(r.read_line("> ").unwrap(), ReadResult::Eof);

        assert_eq!(term.screen(), vec!["> hello", "> world", ">"]);
        assert!(!term.is_raw());
    }

    #[test]
    fn test_editing_keys() {
        let (_, mut r) = reader(concat!(
            "wrld\x1b[D\x1b[D\x1b[Do\r",
            "abc\x7f\x7fx\r",
            "one two\x17three\r",
            "abcdef\x01\x1b[3~\x05\x08\r",
            "keep\x01\x0b\r",
            "drop this\x15that\r",
            "ab\x02\x04\r"));

        assert_eq!(r.read_line("").unwrap(), input("world"));
        assert_eq!(r.read_line("").unwrap(), input("ax"));
        assert_eq!(r.read_line("").unwrap(), input("one three"));
        assert_eq!(r.read_line("").unwrap(), input("bcde"));
        assert_eq!(r.read_line("").unwrap(), input(""));
        assert_eq!(r.read_line("").unwrap(), input("that"));
        assert_eq!(r.read_line("").unwrap(), input("a"));
    }

    #[test]
    fn test_interrupt_and_eof() {
        let (term, mut r) = reader("abc\x03\x04");

        assert_eq!(r.read_line("> ").unwrap(), ReadResult::Interrupt);
        assert_eq!(r.read_line("> ").unwrap(), ReadResult::Eof);
        assert_eq!(term.screen(), vec!["> abc^C", ">"]);
        assert!(!term.is_raw());
    }

    #[test]
    fn test_history() {
        let (_, mut r) = reader(concat!(
            "first\r", "second\r", "second\r", "\r",
            "\x1b[A\x1b[A\r",
            "new\x1b[A\x1b[B\x1b[B\r"));

        assert_eq!(r.read_line("").unwrap(), input("first"));
        assert_eq!(r.read_line("").unwrap(), input("second"));
        assert_eq!(r.read_line("").unwrap(), input("second"));
        assert_eq!(r.read_line("").unwrap(), input(""));
        assert_eq!(r.history(), &["first", "second"]);

        assert_eq!(r.read_line("").unwrap(), input("first"));
        assert_eq!(r.read_line("").unwrap(), input("new"));
    }

    #[test]
    fn test_complete_unique() {
        let (term, mut r) = reader("pr\tfoo\r");
        r.set_completer(commands());

        assert_eq!(r.read_line("> ").unwrap(), input("print foo"));
        assert_eq!(term.screen(), vec!["> print foo"]);
    }

    #[test]
    fn test_complete_append_character() {
        let (term, mut r) = reader("pr\t\r");
        r.set_completer(commands());

        assert_eq!(r.completion_append_character(), Some(' '));
        r.set_completion_append_character(None);

        assert_eq!(r.read_line("> ").unwrap(), input("print"));
        assert_eq!(term.screen(), vec!["> print"]);
    }

    #[test]
    fn test_complete_common_prefix() {
        let (term, mut r) = reader("s\t\r");
        r.set_completer(commands());

        assert_eq!(r.read_line("> ").unwrap(), input("st"));
        assert_eq!(term.bells(), 0);
    }

    #[test]
    fn test_complete_list() {
        let (term, mut r) = reader("st\t\to\t\r");
        r.set_completer(commands());

        assert_eq!(r.read_line("> ").unwrap(), input("stop "));
        assert_eq!(term.bells(), 1);
        assert_eq!(term.screen(), vec!["> st", "start  stop", "> stop"]);
    }

    #[test]
    fn test_complete_show_all() {
        let (term, mut r) = reader("\t\r");
        r.set_completer(commands());

        let mut config = Config::default();
        config.show_all_if_ambiguous = true;
        r.set_config(config);

        assert_eq!(r.read_line("> ").unwrap(), input(""));
        assert_eq!(term.screen(), vec![">", "list   print  start  stop", ">"]);
    }

    #[test]
    fn test_complete_query() {
        let (term, mut r) = reader("\t\tn\t\ty\r");
        r.set_completer(commands());

        let mut config = Config::default();
        config.completion_query_items = 4;
        r.set_config(config);

        assert_eq!(r.read_line("> ").unwrap(), input(""));
        assert_eq!(term.screen(), vec![
            ">",
            "Display all 4 possibilities? (y or n)",
            ">",
            "Display all 4 possibilities? (y or n)",
            "list   print  start  stop",
            ">",
        ]);
    }

    #[test]
    fn test_complete_none() {
        let (term, mut r) = reader("x\t\r");
        r.set_completer(commands());

        assert_eq!(r.read_line("> ").unwrap(), input("x"));
        assert_eq!(term.bells(), 1);

        let mut config = Config::default();
        config.bell_style = BellStyle::None;
        r.set_config(config);

        term.push_input("x\t\r");
        assert_eq!(r.read_line("> ").unwrap(), input("x"));
        assert_eq!(term.bells(), 1);
    }

    #[test]
    fn test_complete_narrow_columns() {
        let term = MemoryTerminal::with_size(Size{lines: 10, columns: 14});
        term.push_input("\t\t\r");

        let mut r = Reader::new(term.clone());
        r.set_completer(commands());

        assert_eq!(r.read_line("").unwrap(), input(""));
        assert_eq!(term.screen(), vec!["", "list   start", "print  stop"]);
    }

    #[test]
    fn test_long_line_scrolls() {
        let term = MemoryTerminal::with_size(Size{lines: 5, columns: 10});
        term.push_input("abcdefghij\rabcdefghij\x01\r");

        let mut r = Reader::new(term.clone());

        assert_eq!(r.read_line("> ").unwrap(), input("abcdefghij"));
        assert_eq!(r.read_line("> ").unwrap(), input("abcdefghij"));

        // Each line stays on one row, showing the part around the cursor
        assert_eq!(term.screen(), vec!["> defghij", "> abcdefg"]);
    }

    #[test]
    fn test_invisible_prompt() {
        let (term, mut r) = reader("x\r");
        let prompt = format!("{}<{}> ", START_INVISIBLE, END_INVISIBLE);

        assert_eq!(r.read_line(&prompt).unwrap(), input("x"));
        assert_eq!(term.screen(), vec!["<> x"]);
    }

    #[test]
    fn test_visible_width() {
        let prompt = format!("{}\x1b[1;32m{}> {}\x1b[0m{}",
            START_INVISIBLE, END_INVISIBLE, START_INVISIBLE, END_INVISIBLE);

        assert_eq!(visible_width(&prompt), 2);
        assert_eq!(visible_width("日本> "), 6);
        assert_eq!(visible_width(""), 0);
    }

    #[test]
    fn test_non_interactive() {
        let (term, mut r) = reader("plain\tline\n");
        term.set_interactive(false);
        r.set_completer(commands());

        assert_eq!(r.read_line("> ").unwrap(), input("plain\tline"));
        assert_eq!(r.read_line("> ").unwrap(), ReadResult::Eof);
        assert!(r.history().is_empty());
    }

    #[test]
    fn test_output_redirected() {
        let (term, mut r) = reader("plain\n");
        term.redirect_output(true);

        assert_eq!(r.read_line("> ").unwrap(), input("plain"));
        assert!(!term.is_raw());
    }

    #[test]
    fn test_read_error_restores_mode() {
        let (term, mut r) = reader("");
        term.fail_next_read();

        assert_matches!(r.read_line("> "), Err(Error::Io(_)));
        assert!(!term.is_raw());
    }

    #[test]
    fn test_word_start() {
        assert_eq!(word_start(""), 0);
        assert_eq!(word_start("one"), 0);
        assert_eq!(word_start("one two"), 4);
        assert_eq!(word_start("one two  "), 4);
        assert_eq!(word_start("   "), 0);
    }
}
