// Parameterized language tests using test-case.  Each case runs a snippet against a prepared stack
// and checks the numbers left behind.

use minforth::runtime::built_ins::register_builtin_words;
use minforth::runtime::data_structures::value::Value;
use minforth::runtime::error::{ErrorKind, Result};
use minforth::runtime::interpreter::forth_interpreter::ForthInterpreter;
use minforth::runtime::interpreter::{CodeManagement, InterpreterStack};
use test_case::test_case;

fn eval_and_stack(source: &str, init_stack: &[f64]) -> Result<Vec<f64>> {
    let mut interp = ForthInterpreter::with_output(Box::new(std::io::sink()));

    register_builtin_words(&mut interp);

    for &v in init_stack {
        interp.push(Value::from(v));
    }

    interp.process_source("<test>", source)?;

    let stack = interp
        .stack()
        .iter()
        .map(|v| v.number().expect("only numbers expected on the stack"))
        .collect::<Vec<_>>();

    Ok(stack)
}

#[test_case("0", &[], &[0.0]; "zero")]
#[test_case("42", &[], &[42.0]; "number")]
#[test_case("12.5", &[], &[12.5]; "fraction")]
#[test_case("-3", &[], &[-3.0]; "negative numeral")]
#[test_case("4 3 -", &[], &[1.0]; "minus operator")]
#[test_case("+", &[2.0, 2.0], &[4.0]; "simple add")]
#[test_case("-", &[5.0, 2.0], &[3.0]; "simple sub")]
#[test_case("*", &[3.0, 4.0], &[12.0]; "simple mul")]
#[test_case("/", &[12.0, 3.0], &[4.0]; "simple div")]
#[test_case("/", &[1.0, 4.0], &[0.25]; "fractional div")]
#[test_case("mod", &[13.0, 5.0], &[3.0]; "simple mod")]
#[test_case("mod", &[-7.0, 2.0], &[-1.0]; "mod keeps the dividend sign")]
#[test_case("<", &[1.0, 2.0], &[-1.0]; "less is true")]
#[test_case("<", &[2.0, 1.0], &[0.0]; "less is false")]
#[test_case("<", &[1.0, 1.0], &[0.0]; "less for equal")]
#[test_case(">", &[2.0, 1.0], &[-1.0]; "greater is true")]
#[test_case(">", &[1.0, 2.0], &[0.0]; "greater is false")]
#[test_case("<=", &[1.0, 1.0], &[-1.0]; "less or equal")]
#[test_case(">=", &[1.0, 2.0], &[0.0]; "greater or equal is false")]
#[test_case("dup =", &[7.0], &[-1.0]; "a equals a")]
#[test_case("dup !=", &[7.0], &[0.0]; "a not equal a")]
#[test_case("dup =", &[-0.5], &[-1.0]; "a equals a for fractions")]
#[test_case("and", &[-1.0, 0.0], &[0.0]; "and of booleans")]
#[test_case("and", &[12.0, 10.0], &[8.0]; "bitwise and")]
#[test_case("or", &[-1.0, 0.0], &[-1.0]; "or of booleans")]
#[test_case("or", &[12.0, 3.0], &[15.0]; "bitwise or")]
#[test_case("invert", &[0.0], &[-1.0]; "invert false")]
#[test_case("invert", &[-1.0], &[0.0]; "invert true")]
#[test_case("dup", &[1.0], &[1.0, 1.0]; "dup")]
#[test_case("drop", &[1.0, 2.0], &[1.0]; "drop")]
#[test_case("stack-len", &[1.0, 2.0], &[1.0, 2.0, 2.0]; "stack length")]
#[test_case("stack-len", &[], &[0.0]; "empty stack length")]
#[test_case("3 rotate", &[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]; "rotate three")]
#[test_case("2 rotate", &[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]; "rotate two")]
#[test_case("0 rotate", &[1.0, 2.0], &[1.0, 2.0]; "rotate none")]
#[test_case("3 composite composite-len", &[1.0, 2.0, 3.0], &[3.0]; "composite length")]
#[test_case("3 composite 0 composite@", &[1.0, 2.0, 3.0], &[3.0]; "composite holds top first")]
#[test_case("3 composite 2 composite@", &[1.0, 2.0, 3.0], &[1.0]; "composite last element")]
#[test_case("argc @", &[], &[0.0]; "argc without arguments")]
#[test_case("argv @ composite-len", &[], &[0.0]; "argv without arguments")]
#[test_case("5 variable x x @", &[], &[5.0]; "variable read")]
#[test_case("5 variable x x 9 ! x @", &[], &[9.0]; "variable store")]
#[test_case("5 variable x x 2 +! x @", &[], &[7.0]; "variable add")]
#[test_case("5 variable x x 2 -! x @", &[], &[3.0]; "variable subtract")]
#[test_case("5 variable x x 2 *! x @", &[], &[10.0]; "variable multiply")]
#[test_case("5 variable x x 2 /! x @", &[], &[2.5]; "variable divide")]
#[test_case("5 constant c c @", &[], &[5.0]; "constant read")]
#[test_case("1 variable x 2 variable x x @", &[], &[2.0]; "redeclare replaces")]
fn test_eval(source: &str, init_stack: &[f64], expected: &[f64]) {
    assert_eq!(eval_and_stack(source, init_stack).unwrap(), expected);
}

#[test_case("+", &[]; "add with empty stack")]
#[test_case("+", &[1.0]; "add with one value")]
#[test_case("<", &[1.0]; "compare with one value")]
#[test_case("invert", &[]; "invert with empty stack")]
#[test_case("dup", &[]; "dup with empty stack")]
#[test_case("drop", &[]; "drop with empty stack")]
#[test_case("mod", &[1.0]; "mod with one value")]
#[test_case(".", &[]; "print with empty stack")]
#[test_case("@", &[]; "fetch with empty stack")]
#[test_case("@", &[1.0]; "fetch a number")]
#[test_case("!", &[1.0]; "store with one value")]
#[test_case("!", &[1.0, 2.0]; "store into a number")]
#[test_case("?", &[3.0]; "show a number")]
#[test_case("variable x", &[]; "declare without a value")]
#[test_case("5 rotate", &[1.0, 2.0]; "rotate too many")]
#[test_case("3 composite 3 composite@", &[1.0, 2.0, 3.0]; "composite index out of range")]
#[test_case("composite-len", &[1.0]; "composite length of a number")]
#[test_case("\"a\" 1 +", &[]; "add text")]
#[test_case("frobnicate", &[]; "unknown word")]
#[test_case("5 variable x x \"a\" +!", &[]; "add text to variable")]
fn test_runtime_errors(source: &str, init_stack: &[f64]) {
    let error = eval_and_stack(source, init_stack).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Runtime);
}
