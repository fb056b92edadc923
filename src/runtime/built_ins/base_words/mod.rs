/// Words that manipulate the data stack.
mod stack_words;

/// Arithmetic beyond the built-in operators.
mod simple_arithmetic_words;

/// Words that work with composites.
mod composite_words;

use crate::runtime::{
    built_ins::base_words::{
        composite_words::register_composite_words,
        simple_arithmetic_words::register_simple_arithmetic_words,
        stack_words::register_stack_words,
    },
    interpreter::Interpreter,
};

/// Called to register all of the core words of the language.
pub fn register_base_words(interpreter: &mut dyn Interpreter) {
    register_stack_words(interpreter);
    register_simple_arithmetic_words(interpreter);
    register_composite_words(interpreter);
}
