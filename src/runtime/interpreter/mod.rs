use crate::{
    lang::{compilation::{CompiledProgram, WordBody}, source_buffer::SourceLocation},
    runtime::{
        data_structures::{
            contextual_data::ContextualData,
            dictionary::{Dictionary, WordInfo},
            value::{Composite, Value},
            value_stack::ValueStack,
            variables::{Binding, VariableHandle, Variables},
        },
        error,
    },
};
use std::{
    fmt::{self, Display, Formatter},
    io::Write,
    rc::Rc,
};

pub mod forth_interpreter;

/// A call stack item is a record of the executing word's name and the location within the original
/// source code from which it was called.  These items are read-only and the fields are accessed by
/// member functions.
#[derive(Clone)]
pub struct CallItem {
    location: SourceLocation,
    word: String,
}

impl CallItem {
    /// Create a new call stack item.
    pub fn new(word: String, location: SourceLocation) -> CallItem {
        CallItem { location, word }
    }

    /// Where in the source code was the execution of this word found?
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    // The name of the word being executed.
    pub fn word(&self) -> &String {
        &self.word
    }
}

/// Make sure that this word can be nicely displayed to the user in event of an error.
impl Display for CallItem {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.word)
    }
}

/// Type to represent a call stack.  This is a stack of call items currently being executed by the
/// interpreter.  This is used to help track errors and provide a script's stack trace to the user.
pub type CallStack = Vec<CallItem>;

/// Trait for managing the interpreter's data stack.  Intended to be called by native words as well
/// as the evaluator itself.
pub trait InterpreterStack {
    /// Use to examine the full data stack when required.
    fn stack(&self) -> &ValueStack;

    /// Push a value onto the stack.  This is the primary way of sending values to words.
    fn push(&mut self, value: Value);

    /// Pop a value from the stack.  If the stack is empty a stack underflow error is returned.
    fn pop(&mut self) -> error::Result<Value>;

    /// Pop the top `count` values at once, returned deepest first.  Fails without popping anything
    /// if there aren't enough values.
    fn pop_n(&mut self, count: usize) -> error::Result<Vec<Value>>;

    /// Pop the top value and make sure it's a number.
    fn pop_as_number(&mut self) -> error::Result<f64>;

    /// Pop the top number and convert it to a count.  Negative numbers are an error.
    fn pop_as_usize(&mut self) -> error::Result<usize>;

    /// Pop the top value and make sure it's a composite.
    fn pop_as_composite(&mut self) -> error::Result<Composite>;

    /// Peek at the top of the stack, truthy if it is a non-zero number.  An empty stack is false.
    fn is_truthy(&self) -> bool;
}

/// Definition of a word handler function.  This is the function that is called when a native word
/// is to be executed.  Can be a lambda, a callable object or a Rust function.
pub type WordHandler = dyn Fn(&mut dyn Interpreter) -> error::Result<()>;

/// Simplify registering a native word with the interpreter.
///
/// Required parameters are, the interpreter instance to register with.  The name of the word to
/// register.  The word function handler to execute for the word.  A simple description of the word.
/// As well as the word's stack signature.
#[macro_export]
macro_rules! add_native_word {
    (
        $interpreter:expr ,
        $name:expr ,
        $function:expr ,
        $description:expr ,
        $signature:expr
    ) => {{
        use std::rc::Rc;

        // Register the word while recording where in the source code the word was registered
        // from.
        $interpreter.add_word(
            file!().to_string(), // Original source location that this
            line!() as usize,    //  word was registered from.
            column!() as usize,
            $name.to_string(),        // Name.
            Rc::new($function),       // Function handler.
            $description.to_string(), // Word description.
            $signature.to_string(),   // Word signature.
        );
    }};
}

/// Trait for managing and executing words known to the interpreter.
pub trait WordManagement {
    /// If currently set, this represents the current executing location in the original source.
    fn current_location(&self) -> &Option<SourceLocation>;

    /// Add a new native word to the interpreter's dictionary.  Registering a name twice is a bug in
    /// the registering code and panics.
    #[allow(clippy::too_many_arguments)]
    fn add_word(
        &mut self,
        file: String,
        line: usize,
        column: usize,
        name: String,
        handler: Rc<WordHandler>,
        description: String,
        signature: String,
    );

    /// Add the words compiled from a script.  A name that is already taken is a syntax error.
    fn add_script_words(&mut self, words: Vec<WordBody>) -> error::Result<()>;

    /// Execute a word.  The location represents where the word was executed from.
    fn execute_word(&mut self, location: &SourceLocation, word: &WordInfo) -> error::Result<()>;

    /// Find and execute a word by name.  If the word is not found a runtime error is returned.
    fn execute_word_named(&mut self, location: &SourceLocation, word: &str) -> error::Result<()>;

    /// The current script execution call stack.
    fn call_stack(&self) -> &CallStack;

    /// Push a new name and location onto the call stack.  Fails if the calls nest too deeply.
    fn call_stack_push(&mut self, name: String, location: SourceLocation) -> error::Result<()>;

    /// Pop the last name and location from the call stack.
    fn call_stack_pop(&mut self) -> error::Result<()>;
}

/// Trait for working with the variable and constant bindings.
pub trait VariableManagement {
    /// All of the interpreter's variable scopes.
    fn variables(&self) -> &Variables;

    /// Get a binding by handle.  A handle whose scope has already been released is a runtime error.
    fn binding(&self, handle: VariableHandle) -> error::Result<&Binding>;

    /// Overwrite the value of a binding, ignoring whether it's a constant.  Used for seeding and by
    /// native code.
    fn set_binding_value(&mut self, handle: VariableHandle, value: Value) -> error::Result<()>;

    /// Replace the `argc` and `argv` globals with the given process arguments.
    fn set_arguments(&mut self, arguments: &[String]);
}

/// Trait for running source code through the whole pipeline.
pub trait CodeManagement {
    /// Read, tokenize, compile, and evaluate a source file.
    fn process_source_file(&mut self, path: &str) -> error::Result<()>;

    /// Tokenize, compile, and evaluate source held in memory.  The path is used to represent the
    /// source in error messages, for example "\<test\>".
    fn process_source(&mut self, path: &str, source: &str) -> error::Result<()>;

    /// Register the program's words and run its top level code.  The output is flushed whether or
    /// not the program succeeds.
    fn evaluate(&mut self, program: CompiledProgram) -> error::Result<()>;
}

/// Core interpreter trait.
///
/// Brings together scope marking and releasing, the data stack, word execution, variable access,
/// and the full source pipeline.
pub trait Interpreter:
    ContextualData + InterpreterStack + WordManagement + VariableManagement + CodeManagement
{
    /// The current word dictionary of words known to the interpreter.
    fn dictionary(&self) -> &Dictionary;

    /// Where the printing words send their text.
    fn output(&mut self) -> &mut dyn Write;
}
