/// Module contains the Value enumeration and it's implementation.  The value is the unit of data
/// held by the stack, by variables, and by literal tokens.
pub mod value;

/// The data stack the interpreter and all of the words operate on.
pub mod value_stack;

/// Hold the ContextualData trait, used for managing scopes in the interpreter.
pub mod contextual_data;

/// The variable and constant bindings, their arena, and the global and local tables that name
/// them.
pub mod variables;

/// The dictionary module provides the word dictionary used by the interpreter.
pub mod dictionary;
