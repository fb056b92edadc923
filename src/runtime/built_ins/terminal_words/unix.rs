use libc::{ECHO, ICANON, STDIN_FILENO, TCSANOW, VMIN, VTIME, isatty, tcgetattr, tcsetattr, termios};
use std::{
    io::{Error, Result},
    mem::zeroed,
};

/// Read one key press.  When standard input is a terminal it's switched out of canonical mode and
/// echo for the duration of the read, otherwise the next byte of the input is returned.
pub fn read_key() -> Result<Option<u32>> {
    if unsafe { isatty(STDIN_FILENO) } == 0 {
        return super::read_stdin_byte().map(|byte| byte.map(u32::from));
    }

    let mut original: termios = unsafe { zeroed() };

    if unsafe { tcgetattr(STDIN_FILENO, &mut original) } == -1 {
        return Err(Error::last_os_error());
    }

    let mut raw = original;

    raw.c_lflag &= !(ECHO | ICANON);
    raw.c_cc[VMIN] = 1;
    raw.c_cc[VTIME] = 0;

    if unsafe { tcsetattr(STDIN_FILENO, TCSANOW, &raw) } == -1 {
        return Err(Error::last_os_error());
    }

    let result = super::read_stdin_byte();

    // Always put the terminal back, even if the read failed.
    if unsafe { tcsetattr(STDIN_FILENO, TCSANOW, &original) } == -1 {
        return Err(Error::last_os_error());
    }

    result.map(|byte| byte.map(u32::from))
}
