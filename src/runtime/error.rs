
use std::{ error::Error,
           fmt::{ self, Debug, Display, Formatter },
           process::{ ExitCode, Termination } };
use crate::{ runtime::interpreter::CallStack,
             lang::source_buffer::SourceLocation };

use super::interpreter::Interpreter;



pub type Result<T> = std::result::Result<T, ScriptError>;



/// The exit code used by the exit word when the stack doesn't hold a usable code.
pub const DEFAULT_EXIT_FAILURE: u8 = 255;



/// The class of error that stopped the script.  Each class maps to its own process exit code.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind
{
    /// The program was invoked incorrectly, or the source file could not be read.
    Startup,

    /// Raised by the tokenizer or the word compiler, before any code runs.
    Syntax,

    /// Raised while evaluating the script.
    Runtime,

    /// Not really an error, the script asked to stop with the given exit code.
    Exit(u8)
}


impl ErrorKind
{
    /// The process exit code reported for this kind of error.
    pub fn exit_code(&self) -> u8
    {
        match self
        {
            ErrorKind::Startup    => 1,
            ErrorKind::Syntax     => 2,
            ErrorKind::Runtime    => 3,
            ErrorKind::Exit(code) => *code
        }
    }
}


impl Display for ErrorKind
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match self
        {
            ErrorKind::Startup => write!(f, "Fatal error"),
            ErrorKind::Syntax  => write!(f, "Syntax error"),
            ErrorKind::Runtime => write!(f, "Runtime error"),
            ErrorKind::Exit(_) => write!(f, "Exit")
        }
    }
}



/// Any error that occurs during the loading, compiling, or execution of a script.
#[derive(Clone)]
pub struct ScriptError
{
    /// What kind of error this is.
    kind: ErrorKind,

    /// The location in the source code the error occurred, if available.
    location: Option<SourceLocation>,

    /// The description of the error.
    error: String,

    /// The script's call stack at the time of the error, if available.
    call_stack: Option<CallStack>
}


impl Error for ScriptError
{
}


/// When returned from main, convert the error result to an operating system exit code.
impl Termination for ScriptError
{
    fn report(self) -> ExitCode
    {
        if !matches!(self.kind, ErrorKind::Exit(_))
        {
            eprintln!("{}", self);
        }

        ExitCode::from(self.kind.exit_code())
    }
}


/// Pretty print the ScriptError for the user.
impl Display for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match &self.location
        {
            Some(location) => write!(f, "{}: {}: {}", self.kind, location, self.error)?,
            None => write!(f, "{}: {}", self.kind, self.error)?
        }

        if let Some(call_stack) = &self.call_stack
            && !call_stack.is_empty()
        {
            write!(f, "\n\nCall stack\n")?;

            // Deep recursion would otherwise bury the interesting frames.
            let frames = call_stack.chunk_by(|a, b| a.word() == b.word() && a.location() == b.location());

            for run in frames.rev()
            {
                writeln!(f, "  {}", run[0])?;

                if run.len() > 1
                {
                    writeln!(f, "  ... repeated {} more times", run.len() - 1)?;
                }
            }
        }

        Ok(())
    }
}


impl Debug for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{}", self)
    }
}


impl ScriptError
{
    /// Create a new ScriptError.
    pub fn new(kind: ErrorKind,
               location: Option<SourceLocation>,
               error: String,
               call_stack: Option<CallStack>) -> ScriptError
    {
        ScriptError
            {
                kind,
                location,
                error,
                call_stack
            }
    }

    /// Create a new ScriptError and wrap it in a Result::Err.
    pub fn new_as_result<T>(kind: ErrorKind,
                            location: Option<SourceLocation>,
                            error: String,
                            call_stack: Option<CallStack>) -> Result<T>
    {
        Err(ScriptError::new(kind, location, error, call_stack))
    }

    /// The request to stop the script with the given exit code.
    pub fn exit(code: u8) -> ScriptError
    {
        ScriptError::new(ErrorKind::Exit(code), None, format!("exit with code {}", code), None)
    }

    /// What kind of error occurred.
    pub fn kind(&self) -> ErrorKind
    {
        self.kind
    }

    /// If available, the location in the source code the error occurred.
    pub fn location(&self) -> &Option<SourceLocation>
    {
        &self.location
    }

    /// The description of the error.
    pub fn error(&self) -> &String
    {
        &self.error
    }

    /// If available, the script's call stack at the time of the error.
    pub fn call_stack(&self) -> &Option<CallStack>
    {
        &self.call_stack
    }
}


/// I/O failures while running a script are runtime errors.
impl From<std::io::Error> for ScriptError
{
    fn from(error: std::io::Error) -> ScriptError
    {
        ScriptError::new(ErrorKind::Runtime, None, format!("I/O error: {}", error), None)
    }
}



/// Create a syntax error at the given location.
pub fn syntax_error<T>(location: &SourceLocation, message: String) -> Result<T>
{
    ScriptError::new_as_result(ErrorKind::Syntax, Some(location.clone()), message, None)
}


/// Create a startup error, these never have a location in a script.
pub fn startup_error<T>(message: String) -> Result<T>
{
    ScriptError::new_as_result(ErrorKind::Startup, None, message, None)
}


/// A convenience function for creating a runtime error and wrapping in in a Result::Err using the
/// interpreter's current location and call stack.
pub fn script_error<T>(interpreter: &dyn Interpreter, message: String) -> Result<T>
{
    let location = interpreter.current_location().clone();
    let call_stack = interpreter.call_stack().clone();

    ScriptError::new_as_result(ErrorKind::Runtime, location, message, Some(call_stack))
}


pub fn script_error_str<T>(interpreter: &dyn Interpreter, message: &str) -> Result<T>
{
    script_error(interpreter, message.to_string())
}
