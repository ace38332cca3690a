//! Editor variables and init file loading
//!
//! Variables use the names and value syntax of GNU Readline's `inputrc`,
//! so an existing init file configures prompts and menus as well:
//!
//! ```text
//! # ~/.inputrc
//! set bell-style none
//! set show-all-if-ambiguous on
//! ```

use std::fmt;
use std::fs::read_to_string;
use std::path::Path;

use log::{debug, warn};

use crate::sys::path::{env_init_file, system_init_file, user_init_file};

/// Application name tested by `$if` in init files
pub const APPLICATION: &str = "cliprompt";

/// Default `completion-query-items`
pub const COMPLETION_QUERY_ITEMS: usize = 100;

/// Reaction to an unavailable completion
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BellStyle {
    /// Ring the terminal bell
    Audible,
    /// Do nothing
    None,
    /// Flash the screen; rung as `Audible`
    Visible,
}

impl fmt::Display for BellStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            BellStyle::Audible => "audible",
            BellStyle::None => "none",
            BellStyle::Visible => "visible",
        })
    }
}

/// Variables controlling the line editor
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// `bell-style`
    pub bell_style: BellStyle,
    /// `completion-query-items`: number of completions at and above which
    /// the user is asked before they are listed
    pub completion_query_items: usize,
    /// `show-all-if-ambiguous`: list ambiguous completions on the first
    /// Tab instead of the second
    pub show_all_if_ambiguous: bool,
    /// `print-completions-horizontally`: sort listed completions across
    /// rows instead of down columns
    pub print_completions_horizontally: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config{
            bell_style: BellStyle::Audible,
            completion_query_items: COMPLETION_QUERY_ITEMS,
            show_all_if_ambiguous: false,
            print_completions_horizontally: false,
        }
    }
}

impl Config {
    /// Loads the user's init file, falling back to defaults.
    ///
    /// If `INPUTRC` is set, only that file is read, even when it does not
    /// exist. Otherwise the user init file is read, or the system init file
    /// if the user has none.
    ///
    /// Inside `$if` blocks, only those testing for `application` apply.
    pub fn load(application: &str) -> Config {
        let mut config = Config::default();

        if let Some(path) = env_init_file() {
            config.read_file_if_exists(&path, application);
        } else if !user_init_file(application)
                .map_or(false, |p| config.read_file_if_exists(&p, application)) {
            if let Some(path) = system_init_file() {
                config.read_file_if_exists(&path, application);
            }
        }

        config
    }

    fn read_file_if_exists(&mut self, path: &Path, application: &str) -> bool {
        if path.exists() {
            self.read_file(path, application);
            true
        } else {
            false
        }
    }

    fn read_file(&mut self, path: &Path, application: &str) {
        match read_to_string(path) {
            Ok(text) => {
                debug!("reading init file {}", path.display());
                self.parse(&text, application);
            }
            Err(e) => warn!("failed to read init file {}: {}", path.display(), e),
        }
    }

    /// Applies the `set` directives contained in init file text.
    ///
    /// Key bindings are ignored, as are `$if` blocks testing anything
    /// other than `application`.
    pub fn parse(&mut self, text: &str, application: &str) {
        // One entry per open `$if`: whether its current branch applies
        let mut conds: Vec<bool> = Vec::new();

        for (n, line) in text.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (word, rest) = split_first_word(line);

            match word {
                "$if" => {
                    let outer = conds.last().cloned().unwrap_or(true);
                    conds.push(outer && rest == application);
                }
                "$else" => {
                    let outer = conds.len() < 2 || conds[conds.len() - 2];
                    if let Some(cond) = conds.last_mut() {
                        *cond = outer && !*cond;
                    }
                }
                "$endif" => {
                    conds.pop();
                }
                "set" if conds.last().cloned().unwrap_or(true) => {
                    let (name, value) = split_first_word(rest);

                    if !self.set(name, value) {
                        warn!("line {}: invalid setting `{}`", n + 1, line);
                    }
                }
                _ => ()
            }
        }
    }

    /// Sets the value of the named variable.
    ///
    /// Returns `false` if `name` does not refer to a variable or `value`
    /// is not a valid value for the variable.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        match name {
            "bell-style" => match parse_bell_style(value) {
                Some(style) => self.bell_style = style,
                None => return false
            },
            "completion-query-items" => match value.parse() {
                Ok(n) => self.completion_query_items = n,
                Err(_) => return false
            },
            "show-all-if-ambiguous" => match parse_bool(value) {
                Some(b) => self.show_all_if_ambiguous = b,
                None => return false
            },
            "print-completions-horizontally" => match parse_bool(value) {
                Some(b) => self.print_completions_horizontally = b,
                None => return false
            },
            _ => return false
        }

        true
    }

    /// Returns the value of the named variable, or `None` if no such
    /// variable exists.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match name {
            "bell-style" => self.bell_style.to_string(),
            "completion-query-items" => self.completion_query_items.to_string(),
            "show-all-if-ambiguous" => on_off(self.show_all_if_ambiguous).to_owned(),
            "print-completions-horizontally" =>
                on_off(self.print_completions_horizontally).to_owned(),
            _ => return None
        };

        Some(value)
    }
}

fn split_first_word(s: &str) -> (&str, &str) {
    let s = s.trim();

    match s.find(|ch: char| ch.is_whitespace()) {
        Some(pos) => (&s[..pos], s[pos..].trim_start()),
        None => (s, "")
    }
}

fn parse_bell_style(s: &str) -> Option<BellStyle> {
    match &s.to_ascii_lowercase()[..] {
        "audible" | "on" => Some(BellStyle::Audible),
        "none" | "off" => Some(BellStyle::None),
        "visible" => Some(BellStyle::Visible),
        _ => None
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match &s.to_ascii_lowercase()[..] {
        "on" | "1" => Some(true),
        "off" | "0" => Some(false),
        _ => None
    }
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

#[cfg(test)]
mod test {
    use super::{BellStyle, Config, COMPLETION_QUERY_ITEMS};

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.bell_style, BellStyle::Audible);
        assert_eq!(config.completion_query_items, COMPLETION_QUERY_ITEMS);
        assert!(!config.show_all_if_ambiguous);
        assert!(!config.print_completions_horizontally);
    }

    #[test]
    fn test_set_get() {
        let mut config = Config::default();

        assert!(config.set("bell-style", "none"));
        assert_eq!(config.get("bell-style").as_ref().map(|s| &s[..]), Some("none"));

        assert!(config.set("completion-query-items", "5"));
        assert_eq!(config.completion_query_items, 5);

        assert!(config.set("show-all-if-ambiguous", "On"));
        assert_eq!(config.get("show-all-if-ambiguous").as_ref().map(|s| &s[..]), Some("on"));

        assert!(!config.set("completion-query-items", "many"));
        assert!(!config.set("no-such-variable", "on"));
        assert_eq!(config.get("no-such-variable"), None);
    }

    #[test]
    fn test_parse() {
        let mut config = Config::default();

        config.parse("
            # comment
            set bell-style none
            \"\\C-x\": complete

            $if demo
                set show-all-if-ambiguous on
            $else
                set completion-query-items 3
            $endif

            $if other
                set print-completions-horizontally on
                $if demo
                    set completion-query-items 7
                $endif
            $endif

            set completion-query-items nonsense
            ", "demo");

        assert_eq!(config.bell_style, BellStyle::None);
        assert!(config.show_all_if_ambiguous);
        assert_eq!(config.completion_query_items, COMPLETION_QUERY_ITEMS);
        assert!(!config.print_completions_horizontally);
    }

    #[test]
    fn test_parse_else() {
        let mut config = Config::default();

        config.parse("
            $if other
            set bell-style none
            $else
            set bell-style visible
            $endif
            ", "demo");

        assert_eq!(config.bell_style, BellStyle::Visible);
    }
}
