use std::io::{self, stdout, Write};

use crate::device::{Device, DeviceGuard};
use crate::terminal::{self, cursor_sequence, Key, Size};

const BELL: &str = "\x07";
const CLEAR_TO_LINE_END: &str = "\x1b[K";

pub struct UnixTerminal {
    device: Device,
}

impl terminal::Terminal for UnixTerminal {
    type PrepareGuard = DeviceGuard;

    fn new() -> io::Result<UnixTerminal> {
        Ok(UnixTerminal{
            device: Device::open()?,
        })
    }

    fn is_interactive(&self) -> bool {
        self.device.is_interactive()
    }

    fn prepare(&self) -> io::Result<DeviceGuard> {
        self.device.prepare()
    }

    fn read_key(&self) -> io::Result<Option<Key>> {
        self.device.read_key()
    }

    fn read_line(&self) -> io::Result<Option<String>> {
        self.device.read_line()
    }

    fn size(&self) -> io::Result<Size> {
        self.device.size()
    }

    fn set_cursor_visible(&self, visible: bool) -> io::Result<()> {
        write_cursor(&mut stdout().lock(), visible)
    }

    fn move_left(&self, n: usize) -> io::Result<()> {
        if n == 0 {
            Ok(())
        } else {
            put(&format!("\x1b[{}D", n))
        }
    }

    fn move_to_first_col(&self) -> io::Result<()> {
        put("\r")
    }

    fn clear_to_line_end(&self) -> io::Result<()> {
        put(CLEAR_TO_LINE_END)
    }

    fn ring_bell(&self) -> io::Result<()> {
        put(BELL)
    }

    fn write(&self, s: &str) -> io::Result<()> {
        // Raw mode may disable output processing, which would otherwise
        // translate a newline into carriage return and line feed.
        if s.contains('\n') {
            put(&s.replace('\n', "\r\n"))
        } else {
            put(s)
        }
    }
}

fn put(s: &str) -> io::Result<()> {
    let stdout = stdout();
    let mut lock = stdout.lock();

    lock.write_all(s.as_bytes())?;
    lock.flush()
}

fn write_cursor<W: Write>(out: &mut W, visible: bool) -> io::Result<()> {
    out.write_all(cursor_sequence(visible).as_bytes())?;
    out.flush()
}
