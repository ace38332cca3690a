//! Completing prompt yielding entered lines until an exit line

use std::iter::FusedIterator;
use std::process;

use log::debug;

use crate::complete::WordCompleter;
use crate::config::{Config, APPLICATION};
use crate::error::Result;
use crate::reader::{ReadResult, Reader};
use crate::terminal::{DefaultTerminal, Terminal};

/// Default line ending a prompt session
pub const DEFAULT_EXIT: &str = "quit";

/// Default prompt text
pub const DEFAULT_PROMPT: &str = "> ";

/// Reads lines with Tab completion over a fixed set of words
///
/// # Example
///
/// ```no_run
/// use cliprompt::Prompt;
///
/// let prompt = Prompt::new(vec!["start", "stop", "list"], "stop", "> ").unwrap();
///
/// for line in prompt.lines() {
///     println!("received {:?}", line.unwrap());
/// }
/// ```
pub struct Prompt<Term: Terminal = DefaultTerminal> {
    reader: Reader<Term>,
    exit: String,
    prompt: String,
}

impl Prompt<DefaultTerminal> {
    /// Creates a prompt on the default terminal, configured by the user's
    /// init file.
    ///
    /// `candidates` are the words offered by Tab completion. Entering
    /// `exit` ends the session; `prompt` is displayed before each line.
    pub fn new<I, S>(candidates: I, exit: &str, prompt: &str) -> Result<Prompt>
            where I: IntoIterator<Item=S>, S: Into<String> {
        let term = DefaultTerminal::new()?;
        let mut p = Prompt::with_term(term, candidates, exit, prompt);

        p.reader.set_config(Config::load(APPLICATION));
        Ok(p)
    }
}

impl<Term: Terminal> Prompt<Term> {
    /// Creates a prompt using a particular terminal implementation and
    /// default configuration.
    pub fn with_term<I, S>(term: Term, candidates: I, exit: &str, prompt: &str)
            -> Prompt<Term> where I: IntoIterator<Item=S>, S: Into<String> {
        let mut reader = Reader::new(term);
        reader.set_completer(Box::new(WordCompleter::new(candidates)));

        Prompt{
            reader,
            exit: exit.to_owned(),
            prompt: prompt.to_owned(),
        }
    }

    /// Returns the line ending the session.
    pub fn exit(&self) -> &str {
        &self.exit
    }

    /// Returns the prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the underlying line editor.
    pub fn reader(&self) -> &Reader<Term> {
        &self.reader
    }

    /// Returns the underlying line editor, e.g. to change its configuration.
    pub fn reader_mut(&mut self) -> &mut Reader<Term> {
        &mut self.reader
    }

    /// Starts the session, returning an iterator over entered lines.
    ///
    /// Each call to `next` displays the prompt and blocks until a line is
    /// entered. The iterator ends when the exit line is entered; the exit
    /// line itself is not yielded.
    ///
    /// # Process exit
    ///
    /// If the user presses Ctrl-C or input ends while a line is read,
    /// the terminal is restored and **the process exits** with status `0`.
    /// Abandoning the prompt is a normal way to end the program, not an
    /// error the caller can handle.
    pub fn lines(self) -> Lines<Term> {
        Lines{
            prompt: self,
            done: false,
        }
    }
}

/// Iterator over lines entered at a `Prompt`
///
/// Created by [`Prompt::lines`](struct.Prompt.html#method.lines).
/// An `Err` is yielded at most once, after which the iterator ends.
pub struct Lines<Term: Terminal = DefaultTerminal> {
    prompt: Prompt<Term>,
    done: bool,
}

/// Outcome of reading one line
#[derive(Debug, Eq, PartialEq)]
enum Step {
    Line(String),
    Exit,
    Abandoned,
}

impl<Term: Terminal> Lines<Term> {
    /// Returns the prompt driving this session.
    pub fn prompt(&self) -> &Prompt<Term> {
        &self.prompt
    }

    fn step(&mut self) -> Result<Step> {
        let p = &mut self.prompt;

        Ok(match p.reader.read_line(&p.prompt)? {
            ReadResult::Input(ref line) if *line == p.exit => Step::Exit,
            ReadResult::Input(line) => Step::Line(line),
            ReadResult::Eof | ReadResult::Interrupt => Step::Abandoned,
        })
    }
}

impl<Term: Terminal> Iterator for Lines<Term> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Result<String>> {
        if self.done {
            return None;
        }

        match self.step() {
            Ok(Step::Line(line)) => Some(Ok(line)),
            Ok(Step::Exit) => {
                self.done = true;
                None
            }
            Ok(Step::Abandoned) => abandon(),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<Term: Terminal> FusedIterator for Lines<Term> {}

fn abandon() -> ! {
    debug!("prompt abandoned; exiting");
    process::exit(0)
}

#[cfg(test)]
mod test {
    use std::env;
    use std::process::Command;

    use assert_matches::assert_matches;

    use super::{Prompt, Step, DEFAULT_EXIT, DEFAULT_PROMPT};
    use crate::error::Error;
    use crate::memory::MemoryTerminal;

    fn prompt(input: &str) -> (MemoryTerminal, Prompt<MemoryTerminal>) {
        let term = MemoryTerminal::default();
        term.push_input(input);

        let p = Prompt::with_term(term.clone(),
            vec!["start", "stop", "list", "print"], DEFAULT_EXIT, DEFAULT_PROMPT);

        (term, p)
    }

    #[test]
    fn test_lines_until_exit() {
        let (term, p) = prompt("hello\rworld\rquit\rafter\r");

        let lines = p.lines().collect::<Result<Vec<_>, _>>().unwrap();

        assert_eq!(lines, ["hello", "world"]);
        assert_eq!(term.screen(), vec!["> hello", "> world", "> quit"]);
        // Nothing is read past the exit line
        assert!(term.has_input());
    }

    #[test]
    fn test_lines_fused() {
        let (_, p) = prompt("quit\rmore\r");
        let mut lines = p.lines();

        assert!(lines.next().is_none());
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_exit_matches_whole_line() {
        let (_, p) = prompt("quit now\r quit\rQUIT\r\rquit\r");

        let lines = p.lines().collect::<Result<Vec<_>, _>>().unwrap();

        assert_eq!(lines, ["quit now", " quit", "QUIT", ""]);
    }

    #[test]
    fn test_lines_complete() {
        let (_, p) = prompt("sta\tnow\rl\t\r\x1b[A\x15quit\r");

        let lines = p.lines().collect::<Result<Vec<_>, _>>().unwrap();

        assert_eq!(lines, ["start now", "list "]);
    }

    #[test]
    fn test_step_abandoned() {
        let (_, p) = prompt("one\r\x03");
        let mut lines = p.lines();

        assert_eq!(lines.step().unwrap(), Step::Line("one".to_owned()));
        assert_eq!(lines.step().unwrap(), Step::Abandoned);
        assert_eq!(lines.step().unwrap(), Step::Abandoned);
    }

    #[test]
    fn test_step_non_interactive() {
        let (term, p) = prompt("piped\nquit\n");
        term.set_interactive(false);
        let mut lines = p.lines();

        assert_eq!(lines.step().unwrap(), Step::Line("piped".to_owned()));
        assert_eq!(lines.step().unwrap(), Step::Exit);
        assert_eq!(lines.step().unwrap(), Step::Abandoned);
    }

    #[test]
    fn test_error_ends_lines() {
        let (term, p) = prompt("");
        term.fail_next_read();
        let mut lines = p.lines();

        assert_matches!(lines.next(), Some(Err(Error::Io(_))));
        assert!(lines.next().is_none());
        assert!(!term.is_raw());
    }

    const EXIT_CHILD_VAR: &str = "CLIPROMPT_EXIT_CHILD";

    // Runs only inside the process spawned by `test_abandon_exits_process`
    #[test]
    fn test_abandon_child() {
        if env::var_os(EXIT_CHILD_VAR).is_none() {
            return;
        }

        let (_, p) = prompt("one\r");

        for line in p.lines() {
            println!("{:?}", line);
        }

        println!("loop ended");
        panic!("prompt did not exit");
    }

    #[test]
    fn test_abandon_exits_process() {
        let exe = env::current_exe().unwrap();

        let output = Command::new(exe)
            .args(&["prompt::test::test_abandon_child", "--exact",
                "--nocapture", "--test-threads=1"])
            .env(EXIT_CHILD_VAR, "1")
            .output()
            .unwrap();

        let stdout = String::from_utf8_lossy(&output.stdout);

        assert_eq!(output.status.code(), Some(0), "child output: {}", stdout);
        assert!(stdout.contains("Ok(\"one\")"));
        assert!(!stdout.contains("Err"));
        assert!(!stdout.contains("loop ended"));
    }

    #[test]
    fn test_accessors() {
        let (_, p) = prompt("");

        assert_eq!(p.exit(), "quit");
        assert_eq!(p.prompt(), "> ");
        assert!(p.reader().history().is_empty());

        let lines = p.lines();
        assert_eq!(lines.prompt().exit(), "quit");
    }
}
