use crate::{
    add_native_word,
    runtime::{
        data_structures::value::ToValue,
        error::{self, script_error_str},
        interpreter::Interpreter,
    },
};

/// Duplicate the top value on the data stack.
///
/// Signature: `value -- value value`
fn word_dup(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = match interpreter.stack().peek() {
        Some(value) => value.clone(),
        None => return script_error_str(interpreter, "Stack underflow, nothing to duplicate."),
    };

    interpreter.push(value);

    Ok(())
}

/// Drop the top value on the data stack.
///
/// Signature: `value -- `
fn word_drop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let _ = interpreter.pop()?;

    Ok(())
}

/// Get the depth of the data stack before calling this word.
///
/// Signature: ` -- depth`
fn word_stack_len(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.push(interpreter.stack().len().to_value());
    Ok(())
}

/// Reverse the order of the top n values on the stack.
///
/// Signature: `x1 .. xn n -- xn .. x1`
fn word_rotate(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let count = interpreter.pop_as_usize()?;
    let values = interpreter.pop_n(count)?;

    for value in values.into_iter().rev() {
        interpreter.push(value);
    }

    Ok(())
}

/// Register the stack manipulation words.
pub fn register_stack_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "dup",
        word_dup,
        "Duplicate the top value on the data stack.",
        "value -- value value"
    );

    add_native_word!(
        interpreter,
        "drop",
        word_drop,
        "Discard the top value on the data stack.",
        "value -- "
    );

    add_native_word!(
        interpreter,
        "stack-len",
        word_stack_len,
        "Get the depth of the data stack before calling this word.",
        " -- depth"
    );

    add_native_word!(
        interpreter,
        "rotate",
        word_rotate,
        "Reverse the order of the top n values on the stack.",
        "x1 .. xn n -- xn .. x1"
    );
}
