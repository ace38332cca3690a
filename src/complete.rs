//! Provides utilities for implementing word completion

use std::cell::RefCell;

/// Default set of word break characters
pub const WORD_BREAK_CHARS: &str = " \t\n\"\\'`@$><=;|&{(";

/// Performs completion for the line editor when triggered by the Tab key
///
/// The editor calls `complete` with the word before the cursor and an
/// index of `0`, then `1`, `2` and so on until `None` is returned.
/// Every call with index `0` starts a new completion attempt.
pub trait Completer {
    /// Returns the `index`-th possible completion of `prefix`,
    /// or `None` when there are no more.
    fn complete(&self, prefix: &str, index: usize) -> Option<String>;
}

impl<F> Completer for F where F: Fn(&str, usize) -> Option<String> {
    fn complete(&self, prefix: &str, index: usize) -> Option<String> {
        self(prefix, index)
    }
}

/// `Completer` type that performs no completion
pub struct DummyCompleter;

impl Completer for DummyCompleter {
    fn complete(&self, _prefix: &str, _index: usize) -> Option<String> { None }
}

/// Completes words from a fixed set of candidates
///
/// Candidates are sorted and de-duplicated on construction. Completions
/// for a prefix are the candidates beginning with it, in sorted order;
/// matching is case-sensitive.
#[derive(Debug)]
pub struct WordCompleter {
    candidates: Vec<String>,
    session: RefCell<Session>,
}

/// Matches for the prefix of the current completion attempt
#[derive(Debug, Default)]
struct Session {
    prefix: Option<String>,
    matches: Vec<usize>,
}

impl WordCompleter {
    /// Creates a `WordCompleter` over the given candidates.
    pub fn new<I, S>(candidates: I) -> WordCompleter
            where I: IntoIterator<Item=S>, S: Into<String> {
        let mut candidates = candidates.into_iter()
            .map(Into::into)
            .collect::<Vec<String>>();

        candidates.sort();
        candidates.dedup();

        WordCompleter{
            candidates,
            session: RefCell::new(Session::default()),
        }
    }

    /// Returns the sorted candidate set.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Returns the `index`-th candidate beginning with `prefix`.
    ///
    /// An empty prefix matches every candidate. Once `None` is returned
    /// for an index, it is returned for every greater index as well.
    pub fn complete(&self, prefix: &str, index: usize) -> Option<&str> {
        let mut session = self.session.borrow_mut();

        if index == 0 || session.prefix.as_ref().map(|p| &p[..]) != Some(prefix) {
            session.prefix = Some(prefix.to_owned());
            session.matches = self.match_indices(prefix).collect();
        }

        session.matches.get(index).map(|&i| &self.candidates[i][..])
    }

    /// Returns all candidates beginning with `prefix`, in sorted order.
    pub fn matches<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item=&'a str> + 'a {
        self.match_indices(prefix).map(move |i| &self.candidates[i][..])
    }

    fn match_indices<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item=usize> + 'a {
        self.candidates.iter()
            .enumerate()
            .filter(move |(_, c)| c.starts_with(prefix))
            .map(|(i, _)| i)
    }
}

impl Completer for WordCompleter {
    fn complete(&self, prefix: &str, index: usize) -> Option<String> {
        WordCompleter::complete(self, prefix, index).map(str::to_owned)
    }
}

/// Returns the start position of the word that ends at the end of the string.
pub fn word_break_start(s: &str, word_break: &str) -> usize {
    let mut start = s.len();

    for (idx, ch) in s.char_indices().rev() {
        if word_break.contains(ch) {
            break;
        }
        start = idx;
    }

    start
}

/// Collects every completion the `Completer` offers for `prefix`.
pub fn collect_completions<C>(completer: &C, prefix: &str) -> Vec<String>
        where C: Completer + ?Sized {
    (0..).map(|i| completer.complete(prefix, i))
        .take_while(Option::is_some)
        .flatten()
        .collect()
}
