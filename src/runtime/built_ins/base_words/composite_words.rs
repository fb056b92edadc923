use crate::{
    add_native_word,
    runtime::{
        data_structures::value::{Composite, ToValue, Value},
        error::{self, script_error},
        interpreter::Interpreter,
    },
};

/// Gather the top n values into a new composite.  The value that was on top becomes the first
/// element.
///
/// Signature: `e1 .. en n -- composite`
fn word_composite(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let count = interpreter.pop_as_usize()?;
    let values = interpreter.pop_n(count)?;
    let mut composite = Composite::with_capacity(count);

    for value in values.iter().rev() {
        match value.to_element() {
            Some(element) => composite.push(element),
            None => {
                return script_error(
                    interpreter,
                    format!("A composite can only hold numbers and text, found {}.", value.type_name()),
                );
            }
        }
    }

    interpreter.push(Value::Composite(composite));

    Ok(())
}

/// Get the number of elements in a composite.
///
/// Signature: `composite -- count`
fn word_composite_len(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let composite = interpreter.pop_as_composite()?;

    interpreter.push(composite.len().to_value());

    Ok(())
}

/// Read an element of a composite by its zero based index.
///
/// Signature: `composite index -- element`
fn word_composite_read(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let index = interpreter.pop_as_usize()?;
    let composite = interpreter.pop_as_composite()?;

    match composite.get(index) {
        Some(element) => {
            interpreter.push(element.to_value());
            Ok(())
        }

        None => script_error(
            interpreter,
            format!("Index {} is out of range for a composite of {} elements.", index, composite.len()),
        ),
    }
}

/// Register the words that build and read composites.
pub fn register_composite_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "composite",
        word_composite,
        "Gather the top n values into a composite, top of the stack first.",
        "e1 .. en n -- composite"
    );

    add_native_word!(
        interpreter,
        "composite-len",
        word_composite_len,
        "Get the number of elements in a composite.",
        "composite -- count"
    );

    add_native_word!(
        interpreter,
        "composite@",
        word_composite_read,
        "Read an element of a composite by index.",
        "composite index -- element"
    );
}
