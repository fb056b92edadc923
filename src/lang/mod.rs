/// Module for managing the original source code.
#[macro_use]
pub mod source_buffer;

/// Module for managing the turning of the source code into a list of tokens for further processing.
pub mod tokenizing;

/// Module for splitting the token list into top level code and word definitions, checking that
/// every word's control flow is properly nested along the way.
pub mod compilation;
