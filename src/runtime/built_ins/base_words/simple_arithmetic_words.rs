use crate::{
    add_native_word,
    runtime::{data_structures::value::Value, error, interpreter::Interpreter},
};

/// Floating point remainder, the result takes the sign of the dividend.
///
/// Signature: `a b -- remainder`
fn word_mod(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let b = interpreter.pop_as_number()?;
    let a = interpreter.pop_as_number()?;

    interpreter.push(Value::Number(a % b));

    Ok(())
}

/// Arithmetic that isn't covered by the language's operators.
pub fn register_simple_arithmetic_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "mod",
        word_mod,
        "Get the remainder of dividing a by b.",
        "a b -- remainder"
    );
}
