//! Windows console `Terminal` interface

use std::io::{self, stdout, Write};
use std::mem::zeroed;

use winapi::shared::minwindef::{BOOL, DWORD, FALSE, TRUE};
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::processenv::GetStdHandle;
use winapi::um::winbase::STD_OUTPUT_HANDLE;
use winapi::um::wincon::{
    FillConsoleOutputAttribute, FillConsoleOutputCharacterA,
    GetConsoleCursorInfo, GetConsoleScreenBufferInfo,
    SetConsoleCursorInfo, SetConsoleCursorPosition,
    CONSOLE_CURSOR_INFO, CONSOLE_SCREEN_BUFFER_INFO, COORD,
};
use winapi::um::winnt::{CHAR, HANDLE, SHORT};

use crate::device::{Device, DeviceGuard};
use crate::terminal::{Key, Size, Terminal};

pub struct Console {
    device: Device,
    out_handle: HANDLE,
}

impl Console {
    fn clear_area(&self, start: COORD, n: DWORD, attr: u16) -> io::Result<()> {
        let mut n_chars = 0;

        result_bool(unsafe { FillConsoleOutputAttribute(
            self.out_handle,
            attr,
            n,
            start,
            &mut n_chars) })?;

        result_bool(unsafe { FillConsoleOutputCharacterA(
            self.out_handle,
            b' ' as CHAR,
            n,
            start,
            &mut n_chars) })?;

        Ok(())
    }

    fn get_info(&self) -> io::Result<CONSOLE_SCREEN_BUFFER_INFO> {
        let mut info = unsafe { zeroed() };

        result_bool(unsafe { GetConsoleScreenBufferInfo(
            self.out_handle, &mut info) })?;

        Ok(info)
    }

    fn move_abs(&self, pos: COORD) -> io::Result<()> {
        result_bool(unsafe { SetConsoleCursorPosition(
            self.out_handle, pos) })
    }
}

impl Terminal for Console {
    type PrepareGuard = DeviceGuard;

    fn new() -> io::Result<Console> {
        let out_handle = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) };

        if out_handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }

        Ok(Console{
            device: Device::open()?,
            out_handle,
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
        let info = self.get_info()?;
        let window = info.srWindow;

        Ok(Size{
            lines: (window.Bottom - window.Top + 1) as usize,
            columns: (window.Right - window.Left + 1) as usize,
        })
    }

    fn set_cursor_visible(&self, visible: bool) -> io::Result<()> {
        let mut info: CONSOLE_CURSOR_INFO = unsafe { zeroed() };

        // Output is not a console; there is no cursor to change.
        if unsafe { GetConsoleCursorInfo(self.out_handle, &mut info) } == FALSE {
            return Ok(());
        }

        info.bVisible = if visible { TRUE } else { FALSE };

        result_bool(unsafe { SetConsoleCursorInfo(self.out_handle, &info) })
    }

    fn move_left(&self, n: usize) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }

        let cursor = self.get_info()?.dwCursorPosition;
        let x = (cursor.X as isize - n as isize).max(0);

        self.move_abs(COORD{X: x as SHORT, Y: cursor.Y})
    }

    fn move_to_first_col(&self) -> io::Result<()> {
        let info = self.get_info()?;

        self.move_abs(COORD{X: 0, Y: info.dwCursorPosition.Y})
    }

    fn clear_to_line_end(&self) -> io::Result<()> {
        let info = self.get_info()?;

        let start = info.dwCursorPosition;
        let n = (info.dwSize.X - start.X) as DWORD;

        self.clear_area(start, n, info.wAttributes)
    }

    fn ring_bell(&self) -> io::Result<()> {
        self.write("\x07")
    }

    fn write(&self, s: &str) -> io::Result<()> {
        let stdout = stdout();
        let mut lock = stdout.lock();

        lock.write_all(s.as_bytes())?;
        lock.flush()
    }
}

fn result_bool(b: BOOL) -> io::Result<()> {
    if b == FALSE {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
