use minforth::{
    lang::{
        compilation::{CompiledProgram, compile},
        tokenizing::tokenize_from_file,
    },
    runtime::{
        built_ins::register_builtin_words,
        error::{self, ErrorKind, ScriptError, startup_error},
        interpreter::{
            CodeManagement, Interpreter, VariableManagement, forth_interpreter::ForthInterpreter,
        },
    },
};
use std::{
    env::{args, var},
    process::{ExitCode, Termination},
    thread,
};

/// Native stack for the interpreter thread.  Deeply nested scripts recurse through the evaluator,
/// so the default main thread stack is too small to reach the nesting limits.
const INTERPRETER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Print the compiled program to stderr, enabled by setting MINFORTH_DUMP.
fn dump_program(program: &CompiledProgram, interpreter: &dyn Interpreter) {
    eprintln!("{}", interpreter.dictionary());

    for word in &program.words {
        eprintln!("Word {} at {}:", word.name, word.location);

        for (index, token) in word.tokens.iter().enumerate() {
            match word.link(index) {
                Some(link) => eprintln!("    {:4}  {:?}  -> {}", index, token, link),
                None => eprintln!("    {:4}  {:?}", index, token),
            }
        }
    }

    eprintln!("Top level:");

    for token in &program.top_level {
        eprintln!("    {:?}", token);
    }
}

fn run() -> error::Result<()> {
    let arguments: Vec<String> = args().collect();

    let path = match arguments.get(1) {
        Some(path) => path.clone(),
        None => return startup_error("Usage: minforth <path> [arguments...]".to_string()),
    };

    // The global argc and argv describe the whole command line, program name included.
    let mut interpreter = ForthInterpreter::new();

    interpreter.set_arguments(&arguments);
    register_builtin_words(&mut interpreter);

    let tokens = tokenize_from_file(&path)?;
    let program = compile(tokens, interpreter.dictionary())?;

    if var("MINFORTH_DUMP").is_ok() {
        dump_program(&program, &interpreter);
    }

    interpreter.evaluate(program)
}

/// Run the script on its own thread so that it gets a known amount of native stack.
fn run_on_interpreter_thread() -> error::Result<()> {
    let handle = thread::Builder::new()
        .name("interpreter".to_string())
        .stack_size(INTERPRETER_STACK_SIZE)
        .spawn(run)?;

    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(ScriptError::new(
            ErrorKind::Runtime,
            None,
            "The interpreter thread panicked.".to_string(),
            None,
        )),
    }
}

fn main() -> ExitCode {
    match run_on_interpreter_thread() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => error.report(),
    }
}
