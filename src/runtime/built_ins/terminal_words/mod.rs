
use std::io::{ stdin,
               ErrorKind::Interrupted,
               Read,
               Result };
use crate::{ add_native_word,
             runtime::{ data_structures::value::Value,
                        error::{ self,
                                 script_error },
                        interpreter::Interpreter } };



#[cfg(windows)]
/// Windows specific versions of the terminal words.
mod windows;

#[cfg(windows)]
use windows::read_key;



#[cfg(unix)]
/// Unix specific versions of the terminal words.
mod unix;

#[cfg(unix)]
use unix::read_key;



/// Read one byte from standard input, None once the input is exhausted.
fn read_stdin_byte() -> Result<Option<u8>>
{
    let mut buffer = [ 0; 1 ];
    let stdin = stdin();
    let mut handle = stdin.lock();

    loop
    {
        match handle.read(&mut buffer)
        {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buffer[0])),

            Err(ref error) if error.kind() == Interrupted => continue,
            Err(error) => return Err(error)
        }
    }
}



/// Read a single character from the terminal without echoing it.  Will block until one is
/// available.  At the end of the input -1 is pushed instead.
///
/// Signature: ` -- code`
fn word_key(interpreter: &mut dyn Interpreter) -> error::Result<()>
{
    interpreter.output().flush()?;

    let code = match read_key()
        {
            Ok(Some(code)) => code as f64,
            Ok(None)       => -1.0,
            Err(error)     => return script_error(interpreter,
                                                  format!("Failed to read from the terminal: {}",
                                                          error))
        };

    interpreter.push(Value::Number(code));

    Ok(())
}



/// Register the terminal words.
pub fn register_terminal_words(interpreter: &mut dyn Interpreter)
{
    add_native_word!(interpreter, "key", word_key,
        "Read a single character from the terminal, blocking until one is available.",
        " -- code");
}
