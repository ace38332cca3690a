//! Menus of labeled actions chosen by key

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use log::debug;

use crate::complete::WordCompleter;
use crate::config::{Config, APPLICATION};
use crate::error::Result;
use crate::raw::{read_key, HiddenCursor};
use crate::reader::{strip_invisible, ReadResult, Reader};
use crate::terminal::{DefaultTerminal, Terminal};

/// Callable handle returned for a chosen option
pub struct Action<T> {
    f: Box<dyn Fn() -> T>,
}

impl<T> Action<T> {
    /// Wraps a function as an `Action`.
    pub fn new<F>(f: F) -> Action<T> where F: Fn() -> T + 'static {
        Action{f: Box::new(f)}
    }

    /// Invokes the action.
    pub fn call(&self) -> T {
        (self.f)()
    }
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Action { .. }")
    }
}

/// Option table of a `Menu`, ordered by key
///
/// Keys are lowercased when inserted. Inserting a key already present
/// replaces its label and action.
///
/// ```
/// use cliprompt::Options;
///
/// let options = Options::new()
///     .with("b", "Option B", || 'b')
///     .with("A", "Option A", || 'a');
///
/// assert_eq!(options.keys().collect::<Vec<_>>(), ["a", "b"]);
/// assert_eq!(options.to_string(), "a: Option A\nb: Option B\n");
/// ```
pub struct Options<T> {
    entries: BTreeMap<String, Entry<T>>,
}

struct Entry<T> {
    label: String,
    action: Action<T>,
}

impl<T> Options<T> {
    /// Creates an empty option table.
    pub fn new() -> Options<T> {
        Options{entries: BTreeMap::new()}
    }

    /// Adds an option, returning the table.
    pub fn with<F>(mut self, key: &str, label: &str, f: F) -> Options<T>
            where F: Fn() -> T + 'static {
        self.insert(key, label, f);
        self
    }

    /// Adds an option.
    pub fn insert<F>(&mut self, key: &str, label: &str, f: F)
            where F: Fn() -> T + 'static {
        self.entries.insert(key.to_lowercase(), Entry{
            label: label.to_owned(),
            action: Action::new(f),
        });
    }

    /// Returns the number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table has no options.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether `key` selects an option.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the keys in display order.
    pub fn keys(&self) -> Keys<T> {
        Keys{iter: self.entries.keys()}
    }

    /// Returns the label of the option selected by `key`.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| &e.label[..])
    }

    /// Returns the action of the option selected by `key`.
    pub fn action(&self, key: &str) -> Option<&Action<T>> {
        self.entries.get(key).map(|e| &e.action)
    }
}

impl<T> Default for Options<T> {
    fn default() -> Options<T> {
        Options::new()
    }
}

/// Formats the table as one `key: label` line per option.
impl<T> fmt::Display for Options<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (key, entry) in &self.entries {
            writeln!(f, "{}: {}", key, entry.label)?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Options<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, e)| (k, &e.label)))
            .finish()
    }
}

/// Iterator over the keys of an `Options` table
pub struct Keys<'a, T: 'a> {
    iter: btree_map::Keys<'a, String, Entry<T>>,
}

impl<'a, T> Iterator for Keys<'a, T> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.iter.next().map(|s| &s[..])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Displays a table of options and asks the user to pick one
///
/// # Example
///
/// ```no_run
/// use cliprompt::{Menu, Options};
///
/// let options = Options::new()
///     .with("a", "Add", || "add")
///     .with("r", "Remove", || "remove");
///
/// let mut menu = Menu::new(options).unwrap();
///
/// if let Some(action) = menu.choose("> ", false).unwrap() {
///     println!("chose {}", action.call());
/// }
/// ```
pub struct Menu<T, Term: Terminal = DefaultTerminal> {
    reader: Reader<Term>,
    options: Options<T>,
}

impl<T> Menu<T, DefaultTerminal> {
    /// Displays the options on the default terminal and returns the menu,
    /// configured by the user's init file.
    pub fn new(options: Options<T>) -> Result<Menu<T>> {
        let term = DefaultTerminal::new()?;
        let mut menu = Menu::with_term(term, options)?;

        menu.reader.set_config(Config::load(APPLICATION));
        Ok(menu)
    }
}

impl<T, Term: Terminal> Menu<T, Term> {
    /// Displays the options on the given terminal and returns the menu,
    /// using default configuration.
    ///
    /// Each option is written as a `key: label` line, in key order.
    pub fn with_term(term: Term, options: Options<T>) -> Result<Menu<T, Term>> {
        let mut reader = Reader::new(term);
        reader.set_completer(Box::new(WordCompleter::new(options.keys())));
        // A completed key must match exactly
        reader.set_completion_append_character(None);
        reader.term().write(&options.to_string())?;

        Ok(Menu{reader, options})
    }

    /// Returns the option table.
    pub fn options(&self) -> &Options<T> {
        &self.options
    }

    /// Returns the underlying line editor.
    pub fn reader(&self) -> &Reader<Term> {
        &self.reader
    }

    /// Returns the underlying line editor, e.g. to change its configuration.
    pub fn reader_mut(&mut self) -> &mut Reader<Term> {
        &mut self.reader
    }

    /// Asks for an option until a valid key or nothing is entered.
    ///
    /// If `keystroke` is `true`, a single key press is read with the cursor
    /// hidden; only the end of input chooses nothing, while Enter is an
    /// ordinary key. Otherwise, a line is read after displaying `prompt`,
    /// with Tab completing option keys; an empty line, Ctrl-C or end of
    /// input choose nothing.
    ///
    /// Input is lowercased and must then equal a key exactly; whitespace
    /// is not removed. An unknown key asks again, as many times as it takes.
    ///
    /// Returns the action of the chosen option, or `None` if nothing
    /// was chosen.
    pub fn choose(&mut self, prompt: &str, keystroke: bool) -> Result<Option<&Action<T>>> {
        let key = loop {
            let input = if keystroke {
                self.read_keystroke(prompt)?
            } else {
                self.read_entry(prompt)?
            };

            if input.is_empty() {
                debug!("no option chosen");
                return Ok(None);
            }

            if self.options.contains_key(&input) {
                break input;
            }

            debug!("no option {:?}", input);
        };

        debug!("option {:?} chosen", key);
        Ok(self.options.action(&key))
    }

    fn read_keystroke(&self, prompt: &str) -> Result<String> {
        let term = self.reader.term();
        let prompt = strip_invisible(prompt);

        if !prompt.is_empty() {
            term.write(&prompt)?;
        }

        let key = {
            let _cursor = HiddenCursor::new(term)?;
            read_key(term)?
        };

        Ok(match key {
            None => String::new(),
            Some(ch) => ch.to_lowercase().collect()
        })
    }

    fn read_entry(&mut self, prompt: &str) -> Result<String> {
        Ok(match self.reader.read_line(prompt)? {
            ReadResult::Input(line) => line.to_lowercase(),
            ReadResult::Eof | ReadResult::Interrupt => String::new()
        })
    }
}
