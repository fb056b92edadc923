use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

// Helper to get absolute path from manifest dir
fn manifest_path(rel: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join(rel)
}

// Run the interpreter binary with a script and any extra arguments.
fn run_script(script: &str, arguments: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_minforth"))
        .arg(manifest_path(script))
        .args(arguments)
        .env_remove("MINFORTH_DUMP")
        .output()
        .expect("Failed to run interpreter")
}

// Run the interpreter binary with a script, feeding the given bytes to its standard input.
fn run_script_with_input(script: &str, input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_minforth"))
        .arg(manifest_path(script))
        .env_remove("MINFORTH_DUMP")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run interpreter");

    // Dropping the handle closes the pipe so the script sees end of input.
    let mut stdin = child.stdin.take().expect("Failed to open stdin");
    stdin.write_all(input).expect("Failed to write stdin");
    drop(stdin);

    child.wait_with_output().expect("Failed to wait for interpreter")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_00_square() {
    let output = run_script("tests/scripts/00_square.mf", &[]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "16");
}

#[test]
fn test_01_loops() {
    let output = run_script("tests/scripts/01_loops.mf", &[]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "01234\n321\n");
}

#[test]
fn test_02_arguments() {
    let script = "tests/scripts/02_arguments.mf";
    let output = run_script(script, &["first", "second"]);
    let lines: Vec<String> = stdout_of(&output).lines().map(str::to_string).collect();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], manifest_path(script).to_string_lossy());
    assert_eq!(&lines[2..], ["first", "second"]);
}

#[test]
fn test_03_syntax_error_exit_code() {
    let output = run_script("tests/scripts/03_syntax_error.mf", &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_of(&output), "");
    assert!(stderr.contains("Syntax error"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_04_runtime_error_exit_code() {
    let output = run_script("tests/scripts/04_runtime_error.mf", &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stdout_of(&output), "1");
    assert!(stderr.contains("Runtime error"), "Unexpected stderr: {}", stderr);
    assert!(stderr.contains("underflow"), "Missing call stack in stderr: {}", stderr);
}

#[test]
fn test_05_exit_word() {
    let output = run_script("tests/scripts/05_exit.mf", &[]);

    assert_eq!(output.status.code(), Some(42));
    assert_eq!(stdout_of(&output), "leaving");
    assert!(output.stderr.is_empty());
}

#[test]
fn test_06_key_reads_bytes_then_end_of_input() {
    let output = run_script_with_input("tests/scripts/06_key.mf", b"A");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "65-1");
}

#[test]
fn test_06_key_with_no_input() {
    let output = run_script_with_input("tests/scripts/06_key.mf", b"");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "-1-1");
}

#[test]
fn test_07_deep_recursion_is_a_runtime_error() {
    let output = run_script("tests/scripts/07_deep_recursion.mf", &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr.contains("Nesting overflow"), "Unexpected stderr: {}", stderr);
    assert!(stderr.contains("more times"), "Call stack not collapsed: {}", stderr);
}

#[test]
fn test_missing_script_is_a_startup_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_minforth"))
        .output()
        .expect("Failed to run interpreter");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_unreadable_script_is_a_startup_error() {
    let output = run_script("tests/scripts/does_not_exist.mf", &[]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_dump_goes_to_stderr() {
    let output = Command::new(env!("CARGO_BIN_EXE_minforth"))
        .arg(manifest_path("tests/scripts/00_square.mf"))
        .env("MINFORTH_DUMP", "1")
        .output()
        .expect("Failed to run interpreter");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(stdout_of(&output), "16");
    assert!(stderr.contains("Word square"), "Missing dump in stderr: {}", stderr);
    assert!(stderr.contains("Top level:"), "Missing dump in stderr: {}", stderr);
    assert!(
        stderr.contains("Duplicate the top value on the data stack."),
        "Missing word descriptions in stderr: {}",
        stderr
    );
}
