// Drives whole source files through the interpreter the way `INCLUDED`/`--startup` would, as
// opposed to the other two test files which feed short snippets through `process_source`.

use std::path::{Path, PathBuf};

use post4core::runtime::built_ins::{
    base_words::register_base_words, io_words::register_io_words,
    terminal_words::register_terminal_words, user_words::register_user_words,
};
use post4core::runtime::data_structures::value::Value;
use post4core::runtime::interpreter::sorth_interpreter::SorthInterpreter;
use post4core::runtime::interpreter::{CodeManagement, Interpreter, InterpreterStack};

fn manifest_path(rel: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join(rel)
}

fn run_fixture(rel_path: &str) -> Vec<i64> {
    let mut interpreter = SorthInterpreter::new();

    register_base_words(&mut interpreter);
    register_io_words(&mut interpreter);
    register_terminal_words(&mut interpreter);
    register_user_words(&mut interpreter);

    let path = manifest_path(rel_path);
    interpreter
        .process_source_file(path.to_str().unwrap())
        .unwrap_or_else(|error| panic!("{} failed: {}", rel_path, error));

    interpreter.stack().iter().map(Value::get_int_val).collect()
}

#[test]
fn test_words_file() {
    let stack = run_fixture("tests/00_test_words.f");
    assert_eq!(stack, vec![100, 125, 377, 7, 7, 222]);
}

#[test]
fn test_loops_file() {
    let stack = run_fixture("tests/01_test_loops.f");
    assert_eq!(stack, vec![6, 0, 10, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}
