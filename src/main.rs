use post4core::add_native_word;
use post4core::lang;
use post4core::runtime;

use lang::compilation::repl;
use runtime::{
    built_ins::{
        base_words::register_base_words, io_words::register_io_words,
        terminal_words::register_terminal_words, user_words::register_user_words,
    },
    data_structures::{contextual_data::ContextualData, value::Value},
    error::{self, ScriptError},
    interpreter::{
        CodeManagement, Interpreter, WordManagement, sorth_interpreter::SorthInterpreter,
    },
};
use std::env::{args, current_exe, var};
use std::io::{stdin, BufReader};

/// Get a directory path for the standard library.  This is either in the directory of the
/// executable or in a directory specified by the environment variable RSORTH_LIB_PATH.
fn std_lib_directory() -> error::Result<String> {
    // Check for the environment variable first.
    if let Ok(lib_path) = var("RSORTH_LIB_PATH") {
        Ok(lib_path)
    } else {
        // The environment variable was not set.  Use the directory of the executable.
        match current_exe() {
            Ok(exe_path) => {
                if let Some(directory) = exe_path.parent() {
                    match directory.to_str() {
                        Some(dir_str) => Ok(dir_str.to_string()),
                        None => ScriptError::new_as_result(
                            None,
                            "Executable directory path includes invalid characters.".to_string(),
                            None,
                        ),
                    }
                } else {
                    ScriptError::new_as_result(
                        None,
                        "Could not get the directory of the running executable.".to_string(),
                        None,
                    )
                }
            }

            Err(err) => ScriptError::new_as_result(
                None,
                format!("Could not get the current executable path: {}", err),
                None,
            ),
        }
    }
}

/// The command line options this interpreter understands, plus whatever's left over, (a script
/// path and its own arguments,) once they've been stripped off.
struct CliOptions {
    data_stack_size: Option<usize>,
    return_stack_size: Option<usize>,
    float_stack_size: Option<usize>,
    data_space_size: Option<usize>,
    block_file: Option<String>,
    startup: Option<String>,
    remaining: Vec<String>,
}

/// Parse the command line, pulling out the options this interpreter recognizes and leaving
/// everything else, (the script to run and its arguments,) in `remaining`.
fn parse_cli_options(args: &[String]) -> error::Result<CliOptions> {
    let mut options = CliOptions {
        data_stack_size: None,
        return_stack_size: None,
        float_stack_size: None,
        data_space_size: None,
        block_file: None,
        startup: None,
        remaining: Vec::new(),
    };

    let mut iter = args.iter().skip(1).cloned();

    fn next_value(flag: &str, iter: &mut impl Iterator<Item = String>) -> error::Result<String> {
        iter.next().ok_or_else(|| {
            ScriptError::new(None, format!("Missing value for {} option.", flag), None)
        })
    }

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data-stack-size" => {
                let value = next_value("--data-stack-size", &mut iter)?;
                options.data_stack_size = value.parse().ok();
            }

            "--return-stack-size" => {
                let value = next_value("--return-stack-size", &mut iter)?;
                options.return_stack_size = value.parse().ok();
            }

            "--float-stack-size" => {
                let value = next_value("--float-stack-size", &mut iter)?;
                options.float_stack_size = value.parse().ok();
            }

            "--data-space-size" => {
                let value = next_value("--data-space-size", &mut iter)?;
                options.data_space_size = value.parse().ok();
            }

            "--block-file" => {
                options.block_file = Some(next_value("--block-file", &mut iter)?);
            }

            "--startup" => {
                options.startup = Some(next_value("--startup", &mut iter)?);
            }

            _ => options.remaining.push(arg),
        }
    }

    Ok(options)
}

/// Add every directory named in the colon-separated `POST4_PATH` environment variable to the
/// interpreter's search path, silently skipping entries that don't exist rather than failing
/// startup over a stale path.
fn add_post4_path(interpreter: &mut dyn Interpreter) {
    if let Ok(post4_path) = var("POST4_PATH") {
        for directory in post4_path.split(':') {
            if !directory.is_empty() {
                let _ = interpreter.add_search_path(directory);
            }
        }
    }
}

fn main() -> error::Result<()> {
    // Install the SIGINT/Ctrl-C handler so a running script or the repl can be interrupted back to
    // a THROW rather than killing the process outright.
    runtime::signals::install();

    // Create the core instance of the interpreter.  Then add the standard library's location to the
    // search path.
    let mut interpreter = SorthInterpreter::new();

    interpreter.add_search_path(&std_lib_directory()?)?;
    add_post4_path(&mut interpreter);

    // Register the core standard library words.  These are all the words that are implemented in
    // Rust.
    register_base_words(&mut interpreter);
    register_io_words(&mut interpreter);
    register_terminal_words(&mut interpreter);
    register_user_words(&mut interpreter);

    let args: Vec<String> = args().collect();
    let options = parse_cli_options(&args)?;

    if let Some(limit) = options.data_stack_size {
        interpreter.set_stack_limit(limit);
    }

    if let Some(limit) = options.return_stack_size {
        interpreter.set_return_stack_limit(limit);
    }

    // There is no separate float stack; floats share the data stack with every other Value.  The
    // flag is still accepted so scripts that pass it on the command line don't fail to start, it
    // just has nothing of its own to size.
    let _ = options.float_stack_size;

    if let Some(size_in_kb) = options.data_space_size {
        // Set a real upper bound on the data-space: ALLOT, CREATE, and the rest of the bump
        // allocator's callers now fail with DataSpaceAllocateFailure once `here` would cross it.
        interpreter.data_space_mut().set_limit(size_in_kb * 1024);
    }

    if let Some(path) = &options.block_file {
        interpreter.set_block_file_path(path.clone());
    }

    // Mark the context as a "known good" state.  This is used to allow the user to reset the
    // interpreter to a solid state.
    interpreter.mark_context();

    if let Some(startup_path) = &options.startup {
        let startup_source = interpreter.find_file(startup_path)?;
        interpreter.process_source_file(&startup_source)?;
    }

    // Gather the arguments passed to the script.  If there are arguments then the script to run is
    // the first argument and the rest are passed to the script as a list.
    let script_args_list: Vec<&String> = options.remaining.iter().skip(1).collect();
    let script_args_value = Value::from(script_args_list);

    let handler = move |interpreter: &mut dyn Interpreter| {
        interpreter.push(script_args_value.clone())?;
        Ok(())
    };

    add_native_word!(
        &mut interpreter,
        "sorth.args",
        handler,
        "List of command line arguments passed to the script.",
        " -- argument_list"
    );

    if let Some(script_path) = options.remaining.first() {
        // Find and process the user's script file.
        let user_source = interpreter.find_file(script_path)?;
        interpreter.process_source_file(&user_source)?;
    } else {
        // Else we drop into the native interactive repl, reading from standard input until EOF.
        let stdin_handle = stdin();
        let mut reader = BufReader::new(stdin_handle.lock());

        repl(&mut interpreter, &mut reader, "<repl>")?;
    }

    // Looks like everything went well.
    Ok(())
}
