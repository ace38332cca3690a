//! Windows platform support

pub use self::console::Console as Terminal;

pub mod path;

mod console;
