use crate::runtime::interpreter::Interpreter;

/// The core words of the language.
pub mod base_words;

/// Words that perform I/O operations.
pub mod io_words;

/// Words that work with the terminal.
pub mod terminal_words;

/// Register every built-in word with the interpreter.
pub fn register_builtin_words(interpreter: &mut dyn Interpreter) {
    base_words::register_base_words(interpreter);
    io_words::register_io_words(interpreter);
    terminal_words::register_terminal_words(interpreter);
}
