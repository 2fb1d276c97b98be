// Parameterized interpreter compatibility tests, covering arithmetic, comparison, logic, stack
// shuffling, and control flow words across many small stack-effect cases via `test_case`.

use post4core::runtime::built_ins::base_words::register_base_words;
use post4core::runtime::built_ins::io_words::register_io_words;
use post4core::runtime::built_ins::terminal_words::register_terminal_words;
use post4core::runtime::built_ins::user_words::register_user_words;
use post4core::runtime::data_structures::value::Value;
use post4core::runtime::error::Result;
use post4core::runtime::interpreter::sorth_interpreter::SorthInterpreter;
use post4core::runtime::interpreter::{CodeManagement, Interpreter, InterpreterStack};
use test_case::test_case;

fn eval_and_stack(word: &str, init_stack: &[i64]) -> Result<Vec<i64>> {
    let mut interp = SorthInterpreter::new();

    register_base_words(&mut interp);
    register_io_words(&mut interp);
    register_terminal_words(&mut interp);
    register_user_words(&mut interp);

    for &v in init_stack {
        interp.push(Value::from(v));
    }

    interp.process_source("<test>", word)?;

    let stack = interp.stack().iter().map(|v| v.get_int_val()).collect::<Vec<_>>();
    Ok(stack)
}

#[test_case("0", &[], &[0]; "zero")]
#[test_case("42", &[], &[42]; "number")]
#[test_case("true", &[], &[-1]; "true word")]
#[test_case("false", &[], &[0]; "false word")]
#[test_case("+", &[2, 2], &[4]; "simple add")]
#[test_case("-", &[5, 2], &[3]; "simple sub")]
#[test_case("*", &[3, 4], &[12]; "simple mul")]
#[test_case("/", &[12, 3], &[4]; "simple div")]
#[test_case("mod", &[13, 5], &[3]; "simple mod")]
#[test_case("/mod", &[13, 5], &[3, 2]; "simple div mod")]
#[test_case("*/", &[912345678, 34, 100], &[310197530]; "mul div")]
#[test_case("*/mod", &[912345678, 34, 100], &[52, 310197530]; "mul div rem")]
#[test_case("2*", &[7], &[14]; "times two")]
#[test_case("2/", &[8], &[4]; "divide by two")]
#[test_case("1+", &[41], &[42]; "add one")]
#[test_case("1-", &[43], &[42]; "sub one")]
#[test_case("abs", &[-42], &[42]; "abs of a negative number")]
#[test_case("abs", &[9], &[9]; "abs of positive number")]
#[test_case("abs", &[-9], &[9]; "abs of negative number")]
#[test_case("negate", &[9], &[-9]; "negate positive number")]
#[test_case("negate", &[-9], &[9]; "negate negative number")]
#[test_case("negate", &[42], &[-42]; "negate")]
#[test_case("=", &[5, 5], &[-1]; "equal")]
// `<>` is a native word here, not composed from `= invert`, so it returns the standard -1/0
// Forth flag directly rather than a Bool.
#[test_case("<>", &[5, 6], &[-1]; "not equal")]
#[test_case("<>", &[5, 5], &[0]; "not equal for equal values")]
#[test_case("<", &[3, 4], &[-1]; "less")]
#[test_case("<", &[1, 2], &[-1]; "less is true")]
#[test_case("<", &[2, 1], &[0]; "less is false")]
#[test_case("<", &[1, 1], &[0]; "less for equal")]
#[test_case(">", &[4, 3], &[-1]; "greater")]
#[test_case(">", &[2, 1], &[-1]; "greater is true")]
#[test_case(">", &[1, 2], &[0]; "greater is false")]
#[test_case(">", &[1, 1], &[0]; "greater for equal")]
#[test_case("0=", &[0], &[-1]; "zero equal")]
#[test_case("0=", &[5], &[0]; "is zero for non-zero")]
#[test_case("invert", &[0], &[-1]; "invert")]
#[test_case("invert", &[-1], &[0]; "invert true")]
#[test_case("invert", &[1], &[-2]; "invert number")]
#[test_case("and", &[6, 3], &[2]; "and")]
#[test_case("and", &[0, 0], &[0]; "and for false false")]
#[test_case("and", &[0, -1], &[0]; "and for false true")]
#[test_case("and", &[-1, 0], &[0]; "and for true false")]
#[test_case("and", &[-1, -1], &[-1]; "and for true true")]
#[test_case("or", &[6, 3], &[7]; "or")]
#[test_case("or", &[0, 0], &[0]; "or for false false")]
#[test_case("or", &[0, -1], &[-1]; "or for false true")]
#[test_case("or", &[-1, 0], &[-1]; "or for true false")]
#[test_case("or", &[-1, -1], &[-1]; "or for true true")]
#[test_case("xor", &[6, 3], &[5]; "xor")]
#[test_case("xor", &[0, 0], &[0]; "xor for false false")]
#[test_case("xor", &[0, -1], &[-1]; "xor for false true")]
#[test_case("xor", &[-1, 0], &[-1]; "xor for true false")]
#[test_case("xor", &[-1, -1], &[0]; "xor for true true")]
#[test_case("swap", &[1, 2], &[2, 1]; "swap")]
#[test_case("swap", &[1, 2, 3, 4], &[1, 2, 4, 3]; "swap with multiple elements on stack")]
#[test_case("dup", &[42], &[42, 42]; "dup")]
#[test_case("dup", &[1, 2], &[1, 2, 2]; "dup with two elements")]
#[test_case("drop", &[1, 2], &[1]; "drop")]
#[test_case("drop", &[1, 2, 3, 4], &[1, 2, 3]; "drop with four elements")]
#[test_case("rot", &[1, 2, 3], &[2, 3, 1]; "rot")]
#[test_case("rot", &[1, 2, 3, 4], &[1, 3, 4, 2]; "rot with four elements")]
#[test_case("over", &[1, 2], &[1, 2, 1]; "over")]
#[test_case("1 pick", &[1, 2, 3], &[1, 2, 3, 2]; "pick")]
#[test_case("3 roll", &[1, 2, 3, 4], &[2, 3, 4, 1]; "roll")]
#[test_case("depth", &[1, 2, 3], &[1, 2, 3, 3]; "depth")]
#[test_case("depth", &[], &[0]; "depth of empty stack")]
#[test_case("depth", &[5, 10, 18, 2], &[5, 10, 18, 2, 4]; "depth of non-empty stack")]
#[test_case("clearstack", &[1, 2, 3], &[]; "clearstack")]
#[test_case("clearstack", &[], &[]; "clearstack on empty stack")]
#[test_case(": f 42 ; f", &[], &[42]; "trivial function")]
// IF/ELSE/THEN, BEGIN/UNTIL, and BEGIN/WHILE/REPEAT are compile-only: every word between them
// has to land inside a definition's compiled body rather than run immediately the moment it's
// read, so each case below defines a throwaway word and then calls it.
#[test_case(": t-if-then if 42 then ; 1 t-if-then", &[], &[42]; "if then")]
#[test_case(": t-if-else-then if 1 else 2 then ; 0 t-if-else-then", &[], &[2]; "if else then")]
#[test_case(": f if 10 else 20 then ; f", &[-1], &[10]; "function with if-else-then true branch")]
#[test_case(": f if 10 else 20 then ; f", &[0], &[20]; "function with if-else-then false branch")]
#[test_case(": t-bu begin 1 + dup 10 > until ; t-bu", &[0], &[11]; "begin until loop")]
#[test_case(": t-bw begin 1 + dup 10 < while repeat ; t-bw", &[0], &[10]; "begin while loop")]
// `DO`/`LOOP` move limit and index onto the return stack, so `I` reads the running index straight
// off of it each time through the body; it accumulates one value per iteration on the data stack.
#[test_case(": t-do-i do i loop ; t-do-i", &[5, 0], &[0, 1, 2, 3, 4]; "do i loop")]
// `J` reaches past the innermost loop's own index/limit pair to read the next one out; each
// inner iteration pushes the outer index followed by the inner index.
#[test_case(
    ": t-do-nested do 2 0 do j i loop loop ; t-do-nested",
    &[3, 0],
    &[0, 0, 0, 1, 1, 0, 1, 1, 2, 0, 2, 1];
    "nested do loop"
)]
fn forth_compat_cases(word: &str, init_stack: &[i64], expected: &[i64]) {
    let result = eval_and_stack(word, init_stack).unwrap();
    assert_eq!(result, expected);
}

// Error cases: stack underflow, division by zero, and errors raised from inside a conditional
// or loop body all propagate out of `process_source` as an `Err` rather than panicking.
#[test_case("*/", &[1, 2]; "mul div with too few elements")]
#[test_case("*/mod", &[1, 2]; "mul div mod with too few elements")]
#[test_case("/", &[1, 0]; "div division by zero")]
#[test_case("mod", &[1, 0]; "mod division by zero")]
#[test_case("/mod", &[1, 0]; "div mod division by zero")]
#[test_case("*/", &[1, 2, 0]; "mul div division by zero")]
#[test_case("*/mod", &[1, 2, 0]; "mul div mod division by zero")]
#[test_case("+", &[]; "add on empty stack")]
#[test_case("+", &[1]; "add with one value")]
#[test_case("swap", &[]; "swap on empty stack")]
#[test_case("swap", &[1]; "swap with one value")]
#[test_case("drop", &[]; "drop on empty stack")]
#[test_case("dup", &[]; "dup on empty stack")]
#[test_case("rot", &[]; "rot on empty stack")]
#[test_case("rot", &[1]; "rot with one value")]
#[test_case("rot", &[1, 2]; "rot with two values")]
#[test_case("over", &[]; "over on empty stack")]
#[test_case("over", &[1]; "over with one value")]
#[test_case("pick", &[]; "pick on empty stack")]
#[test_case("pick", &[1]; "pick with one value")]
#[test_case("pick", &[1, 2]; "pick with too few elements below the index")]
#[test_case("roll", &[]; "roll on empty stack")]
#[test_case("roll", &[1]; "roll with one value")]
#[test_case("roll", &[1, 2]; "roll with too few elements below the index")]
fn forth_compat_cases_should_error(word: &str, init_stack: &[i64]) {
    assert!(eval_and_stack(word, init_stack).is_err());
}

#[test_case(": t-err1 if 1 0 / then ; -1 t-err1"; "if then propagates errors from the true branch")]
#[test_case(": t-err2 if 1 0 / else 0 then ; -1 t-err2"; "if else then propagates errors from the true branch")]
#[test_case(": t-err3 if 0 else 1 0 / then ; 0 t-err3"; "if else then propagates errors from the false branch")]
#[test_case(": f 1 0 / . 2 2 + ; f"; "a function body stops at the first error")]
#[test_case(": t-err5 begin 1 0 / again ; t-err5"; "a loop body stops at the first error")]
fn forth_compat_cases_error_propagation(word: &str) {
    assert!(eval_and_stack(word, &[]).is_err());
}
