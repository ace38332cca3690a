//! Error type returned by prompt, menu and raw input operations

use std::io;

use thiserror::Error;

/// Errors raised while interacting with the terminal
///
/// Invalid or empty menu input is never an error; see [`Menu::choose`].
///
/// [`Menu::choose`]: ../menu/struct.Menu.html#method.choose
#[derive(Debug, Error)]
pub enum Error {
    /// The terminal mode could not be queried or changed, e.g. because
    /// input is redirected from a file or the device denied access.
    #[error("terminal device unavailable: {0}")]
    Device(#[source] io::Error),
    /// Reading input or writing output failed
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Result type of the high-level operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn device(e: io::Error) -> Error {
        Error::Device(e)
    }

    /// Returns whether the error originated from terminal mode control.
    pub fn is_device(&self) -> bool {
        match *self {
            Error::Device(_) => true,
            Error::Io(_) => false,
        }
    }
}
