//! Terminal input helpers: single key presses, cursor visibility,
//! completing line prompts and option menus
//!
//! # Prompt example
//!
//! ```no_run
//! use cliprompt::Prompt;
//!
//! let prompt = Prompt::new(vec!["start", "stop", "list", "print"], "stop", "> ").unwrap();
//!
//! // Tab completes the words above; entering "stop" ends the loop.
//! for line in prompt.lines() {
//!     println!("got input {:?}", line.unwrap());
//! }
//!
//! println!("Goodbye.");
//! ```
//!
//! # Menu example
//!
//! ```no_run
//! use cliprompt::{getkey, Menu, Options};
//!
//! let options = Options::new()
//!     .with("a", "Option A", || 'a')
//!     .with("b", "Option B", || 'b');
//!
//! let mut menu = Menu::new(options).unwrap();
//!
//! if let Some(action) = menu.choose("", true).unwrap() {
//!     println!("chose {}", action.call());
//! }
//!
//! println!("Press any key");
//! let _ = getkey().unwrap();
//! ```

#![deny(missing_docs)]

pub use crate::complete::{Completer, WordCompleter};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::menu::{Action, Menu, Options};
pub use crate::prompt::{Lines, Prompt};
pub use crate::raw::{getkey, read_key, set_cursor_visible, show_cursor, HiddenCursor};
pub use crate::reader::{ReadResult, Reader};
pub use crate::terminal::{DefaultTerminal, Key, Terminal};

pub mod complete;
pub mod config;
pub mod error;
pub mod memory;
pub mod menu;
pub mod prompt;
pub mod raw;
pub mod reader;
pub mod terminal;
pub mod util;

mod device;

#[cfg(unix)]
#[path = "unix/mod.rs"]
mod sys;

#[cfg(windows)]
#[path = "windows/mod.rs"]
mod sys;
