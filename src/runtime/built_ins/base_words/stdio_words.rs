use std::io::Write;

use crate::{
    add_native_word,
    runtime::{
        data_structures::value::Value,
        error::{self, script_error_with_code_str, ThrowCode},
        interpreter::Interpreter,
    },
};

/// Render a cell in the given radix, Forth style: a leading `-` for negative values, then the
/// magnitude in the requested base using upper-case digits above 9.  `format!`'s own radix
/// formatters only cover 2/8/16, so this is spelled out by hand to also cover arbitrary bases
/// between 2 and 36, matching `p4Base36`'s digit alphabet from the numeric literal parser.
fn format_int_radix(value: i64, radix: u32) -> String {
    if radix == 10 {
        return value.to_string();
    }

    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();

    if magnitude == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    let radix = radix as u64;

    while magnitude > 0 {
        let digit = (magnitude % radix) as u32;
        let character = std::char::from_digit(digit, radix as u32).unwrap_or('?');

        digits.push(character.to_ascii_uppercase());
        magnitude /= radix;
    }

    if negative {
        digits.push('-');
    }

    digits.iter().rev().collect()
}

/// `.` pops the top of the data stack and prints it, followed by a trailing space.  Integers
/// (and the booleans/none that behave like them) print in the interpreter's current BASE;
/// floating point values always print in decimal, raising *bad-base* if BASE isn't 10, per
/// spec §7's `bad-base` throw.  Anything else prints via its normal `Display` rendering.
///
/// Signature: `value -- `
fn word_dot(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;
    let radix = interpreter.radix();

    match value {
        Value::Int(number) => print!("{} ", format_int_radix(number, radix)),
        Value::Bool(flag) => print!("{} ", format_int_radix(if flag { -1 } else { 0 }, radix)),
        Value::None => print!("{} ", format_int_radix(0, radix)),

        Value::Float(number) => {
            if radix != 10 {
                return script_error_with_code_str(
                    interpreter,
                    ThrowCode::InvalidBaseForFloatConversion,
                    "Can only print floating point values in base 10.",
                );
            }

            print!("{} ", number);
        }

        other => print!("{} ", other),
    }

    let _ = std::io::stdout().flush();
    Ok(())
}

/// `EMIT` pops a character code from the data stack and writes it to standard output, with no
/// trailing space or newline.
///
/// Signature: `char -- `
fn word_emit(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let code = interpreter.pop_as_int()?;

    match char::from_u32(code as u32) {
        Some(character) => print!("{}", character),
        None => print!("?"),
    }

    let _ = std::io::stdout().flush();
    Ok(())
}

/// `CR` writes a newline to standard output.
///
/// Signature: ` -- `
fn word_cr(_interpreter: &mut dyn Interpreter) -> error::Result<()> {
    println!();
    Ok(())
}

/// `SPACE` writes a single space to standard output.
///
/// Signature: ` -- `
fn word_space(_interpreter: &mut dyn Interpreter) -> error::Result<()> {
    print!(" ");
    let _ = std::io::stdout().flush();
    Ok(())
}

/// `SPACES` pops a count and writes that many spaces to standard output.
///
/// Signature: `count -- `
fn word_spaces(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let count = interpreter.pop_as_int()?;

    for _ in 0..count.max(0) {
        print!(" ");
    }

    let _ = std::io::stdout().flush();
    Ok(())
}

/// `TYPE` pops a string and writes its text to standard output with no added whitespace.  Since
/// strings live on the data stack as `Value::String` rather than as a separate addr/len pair,
/// this takes the whole string, not a counted-string pointer.
///
/// Signature: `string -- `
fn word_type(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let text = interpreter.pop_as_string()?;

    print!("{}", text);
    let _ = std::io::stdout().flush();
    Ok(())
}

/// Register the standard output words: `.`, `EMIT`, `CR`, `SPACE`, `SPACES`, and `TYPE`.
pub fn register_stdio_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        ".",
        word_dot,
        "Print the top of the data stack, in the current radix, followed by a space.",
        "value -- "
    );

    add_native_word!(
        interpreter,
        "emit",
        word_emit,
        "Print a single character given its character code.",
        "char -- "
    );

    add_native_word!(interpreter, "cr", word_cr, "Print a newline.", " -- ");

    add_native_word!(
        interpreter,
        "space",
        word_space,
        "Print a single space.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "spaces",
        word_spaces,
        "Print count spaces.",
        "count -- "
    );

    add_native_word!(
        interpreter,
        "type",
        word_type,
        "Print a string with no added whitespace.",
        "string -- "
    );
}
