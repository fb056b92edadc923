use crate::{
    add_native_word,
    runtime::{
        data_structures::value::Value,
        error::{self, DEFAULT_EXIT_FAILURE, ScriptError, script_error},
        interpreter::Interpreter,
    },
};

/// Print a newline.
///
/// Signature: ` -- `
fn word_nl(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    writeln!(interpreter.output())?;
    Ok(())
}

/// Print the character with the given code point.
///
/// Signature: `code -- `
fn word_emit(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let code = interpreter.pop_as_number()?;

    let character = match char::from_u32(code as u32) {
        Some(character) if code >= 0.0 => character,
        _ => return script_error(interpreter, format!("{} is not a valid character code.", code)),
    };

    write!(interpreter.output(), "{}", character)?;
    Ok(())
}

/// Stop the script.  The exit code is the number on top of the stack, reduced to its low 8 bits,
/// or the default failure code if there isn't one.
///
/// Signature: `[code] -- `
fn word_exit(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let code = match interpreter.stack().peek() {
        Some(Value::Number(code)) => *code as i64 as u8,
        _ => DEFAULT_EXIT_FAILURE,
    };

    interpreter.output().flush()?;

    Err(ScriptError::exit(code))
}

/// Register the words that print and the word that ends the script.
pub fn register_io_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(interpreter, "nl", word_nl, "Print a newline.", " -- ");

    add_native_word!(
        interpreter,
        "emit",
        word_emit,
        "Print the character with the given code point.",
        "code -- "
    );

    add_native_word!(
        interpreter,
        "exit",
        word_exit,
        "Stop the script, using the number on top of the stack as the exit code.",
        "[code] -- "
    );
}
