use std::{
    io::{Error, Result},
    mem::zeroed,
};
use winapi::{
    shared::minwindef::DWORD,
    um::{
        consoleapi::{GetConsoleMode, ReadConsoleInputA},
        handleapi::INVALID_HANDLE_VALUE,
        processenv::GetStdHandle,
        winbase::STD_INPUT_HANDLE,
        wincontypes::INPUT_RECORD,
    },
};

const KEY_EVENT: u16 = 1;

/// Read one key press from the console.  If standard input isn't a console, for example when it's
/// redirected from a file, the next byte of the input is returned instead.
pub fn read_key() -> Result<Option<u32>> {
    unsafe {
        let std_in_handle = GetStdHandle(STD_INPUT_HANDLE);

        if std_in_handle == INVALID_HANDLE_VALUE {
            return Err(Error::last_os_error());
        }

        let mut mode: DWORD = 0;

        if GetConsoleMode(std_in_handle, &mut mode) == 0 {
            return super::read_stdin_byte().map(|byte| byte.map(u32::from));
        }

        let mut buffer: INPUT_RECORD = zeroed();
        let mut read: DWORD = 0;

        loop {
            if ReadConsoleInputA(std_in_handle, &mut buffer, 1, &mut read) == 0 {
                return Err(Error::last_os_error());
            }

            if buffer.EventType == KEY_EVENT {
                let key_event = buffer.Event.KeyEvent();
                let character = *key_event.uChar.AsciiChar() as u8;

                // Key releases and keys without a character, such as shift, are skipped.
                if key_event.bKeyDown != 0 && character != 0 {
                    return Ok(Some(u32::from(character)));
                }
            }
        }
    }
}
