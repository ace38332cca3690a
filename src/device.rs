//! Raw-mode key input shared by the platform terminals

use std::cell::RefCell;
use std::char::REPLACEMENT_CHARACTER;
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal};
use std::rc::Rc;
use std::str::from_utf8;
use std::time::Duration;

use log::{debug, trace, warn};
use mortal::{Event, PrepareConfig, PrepareState};
#[cfg(unix)]
use mortal::unix::TerminalExt;

use crate::terminal::{Key, Size};

/// Size assumed when output is not a terminal
pub const DEFAULT_SIZE: Size = Size{
    lines: 24,
    columns: 80,
};

/// Keyboard side of a platform terminal
///
/// The device is opened when standard input is a terminal; otherwise
/// raw-mode operations fail. Line editing additionally requires standard
/// output to be a terminal; without it, lines are read from standard input
/// as they arrive.
pub struct Device {
    term: Option<Rc<mortal::Terminal>>,
    output_is_terminal: bool,
    /// Keys decoded from raw bytes, returned before new events are read
    pending: RefCell<VecDeque<Key>>,
    /// Leading bytes of a character whose remaining bytes are not yet read
    partial: RefCell<Vec<u8>>,
}

/// Restores the terminal mode saved by `Device::prepare` when dropped
#[must_use]
pub struct DeviceGuard {
    term: Rc<mortal::Terminal>,
    state: Option<PrepareState>,
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            match self.term.restore(state) {
                Ok(()) => debug!("left raw mode"),
                Err(e) => warn!("failed to restore terminal: {}", e),
            }
        }
    }
}

impl Device {
    pub fn open() -> io::Result<Device> {
        let term = if io::stdin().is_terminal() {
            Some(Rc::new(mortal::Terminal::new()?))
        } else {
            debug!("standard input is not a terminal");
            None
        };

        let output_is_terminal = io::stdout().is_terminal();

        if !output_is_terminal {
            debug!("standard output is not a terminal");
        }

        Ok(Device{
            term,
            output_is_terminal,
            pending: RefCell::new(VecDeque::new()),
            partial: RefCell::new(Vec::new()),
        })
    }

    /// Returns whether lines can be edited in place.
    pub fn is_interactive(&self) -> bool {
        self.term.is_some() && self.output_is_terminal
    }

    pub fn prepare(&self) -> io::Result<DeviceGuard> {
        let term = self.term()?;

        let mut config = PrepareConfig::default();
        // Ctrl-C, Ctrl-Z and friends arrive as keys
        config.block_signals = true;
        config.enable_control_flow = false;

        let state = term.prepare(config)?;
        debug!("entered raw mode");

        Ok(DeviceGuard{
            term: term.clone(),
            state: Some(state),
        })
    }

    pub fn read_key(&self) -> io::Result<Option<Key>> {
        let term = self.term()?;

        loop {
            if let Some(key) = self.pending.borrow_mut().pop_front() {
                return Ok(Some(key));
            }

            if !self.partial.borrow().is_empty() {
                if !self.read_bytes(term, None)? {
                    return Ok(None);
                }
                continue;
            }

            match term.read_event(None)? {
                Some(Event::Key(key)) => {
                    trace!("read key {:?}", key);
                    return Ok(Some(key.into()));
                }
                // Resize, mouse and raw events carry no key
                Some(_) => continue,
                // End of input, a handled signal or a partial character
                None => if !self.read_bytes(term, Some(Duration::from_millis(0)))? {
                    return Ok(None);
                }
            }
        }
    }

    /// Reads raw bytes, including any left undecoded in the terminal buffer,
    /// and queues the keys they complete.
    ///
    /// Returns `false` when input has ended.
    #[cfg(unix)]
    fn read_bytes(&self, term: &mortal::Terminal, timeout: Option<Duration>)
            -> io::Result<bool> {
        let mut buf = [0; 64];

        match term.lock_read().expect("Terminal::lock_read").read_raw(&mut buf, timeout)? {
            Some(Event::Raw(0)) => {
                debug!("end of input");
                Ok(false)
            }
            Some(Event::Raw(n)) => {
                let mut partial = self.partial.borrow_mut();
                partial.extend_from_slice(&buf[..n]);

                let chars = take_chars(&mut partial);
                trace!("decoded {:?} from raw input", chars);

                self.pending.borrow_mut().extend(chars.into_iter().map(Key::from_char));
                Ok(true)
            }
            // Interrupted by a signal without input
            _ => Ok(true)
        }
    }

    /// The console reports no event only when input has ended.
    #[cfg(windows)]
    fn read_bytes(&self, _term: &mortal::Terminal, _timeout: Option<Duration>)
            -> io::Result<bool> {
        Ok(false)
    }

    pub fn read_line(&self) -> io::Result<Option<String>> {
        let stdin = io::stdin();
        let mut line = String::new();

        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    pub fn size(&self) -> io::Result<Size> {
        match self.term {
            Some(ref term) if self.output_is_terminal => {
                let size = term.size()?;
                Ok(Size{lines: size.lines, columns: size.columns})
            }
            _ => Ok(DEFAULT_SIZE)
        }
    }

    fn term(&self) -> io::Result<&Rc<mortal::Terminal>> {
        self.term.as_ref().ok_or_else(|| io::Error::new(
            io::ErrorKind::Other, "standard input is not a terminal"))
    }
}

/// Removes and returns the complete characters at the start of `buf`.
///
/// A trailing incomplete character is left in `buf`. Invalid bytes are
/// decoded as `U+FFFD`.
#[cfg_attr(windows, allow(dead_code))]
pub fn take_chars(buf: &mut Vec<u8>) -> Vec<char> {
    let mut chars = Vec::new();

    loop {
        match from_utf8(&buf[..]) {
            Ok(s) => {
                chars.extend(s.chars());
                buf.clear();
                break;
            }
            Err(e) => {
                let valid = e.valid_up_to();
                chars.extend(String::from_utf8_lossy(&buf[..valid]).chars());

                match e.error_len() {
                    Some(n) => {
                        chars.push(REPLACEMENT_CHARACTER);
                        buf.drain(..valid + n);
                    }
                    None => {
                        buf.drain(..valid);
                        break;
                    }
                }
            }
        }
    }

    chars
}
