use std::rc::Rc;

use crate::{
    add_native_immediate_word, add_native_word,
    lang::code::{ByteCode, Instruction, Op},
    runtime::{
        data_structures::{
            dictionary::{WordRuntime, WordType, WordVisibility},
            value::{ToValue, Value},
        },
        error::{self, script_error_with_code_str, ThrowCode},
        interpreter::{DataSpaceManagement, Interpreter, LastCreatedWord, WordHandler},
    },
};

/// `CREATE name` reserves a new cell in the data-space for a DOES> continuation, then a word
/// whose data field begins right after that cell.  The word registered for `name` starts out with
/// the default handler of simply pushing its own data field address; a following `DOES>`, run at
/// the end of the enclosing definition, retargets that handler to run the does-part instead.
///
/// Signature: ` -- ` (consumes its name from the input stream)
fn word_create(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (location, name) = interpreter.next_token_word()?;

    // One reserved cell for the DOES> continuation; the data field starts just past it.
    let body_address = interpreter.data_space().word_create(interpreter)?;

    let mut code = ByteCode::new();
    code.push_back(Instruction::new(
        None,
        Op::DataField(Value::Int(body_address as i64)),
    ));

    let word_name = name.clone();
    let decompiled_code = code.clone();
    let handler: Rc<WordHandler> =
        Rc::new(move |interpreter: &mut dyn Interpreter| interpreter.execute_code(&word_name, &code));

    let handler_index = interpreter.next_handler_index();

    interpreter.add_word(
        location.path().clone(),
        location.line(),
        location.column(),
        name.clone(),
        handler,
        "A word built by CREATE.".to_string(),
        " -- addr".to_string(),
        WordRuntime::Normal,
        WordVisibility::Visible,
        WordType::Native,
        Some(decompiled_code),
    );

    interpreter.mark_word_created(&name, body_address);
    interpreter.mark_created(LastCreatedWord {
        handler_index,
        body_address,
    });

    Ok(())
}

/// `DOES>` opens the does-part of the word currently being defined.  Everything compiled after
/// this point, up to the closing `;`, is routed into a separate block of code instead of the
/// defining word's own body.  At `;` that block is resolved and spliced onto the word as a single
/// `Op::DoesBody` instruction, which retargets whatever word was most recently built by `CREATE`.
///
/// Signature: ` -- ` (compile time only)
fn word_does(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.context_mut().construction_mut()?.does_code = Some(ByteCode::new());
    Ok(())
}

/// `MARKER name` creates a word that, when executed, forgets every word (including itself) and
/// reclaims every data-space cell allocated since the marker was defined.
///
/// Signature: ` -- ` (consumes its name from the input stream)
fn word_marker(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (location, name) = interpreter.next_token_word()?;

    let threshold = interpreter.next_handler_index();
    let saved_here = interpreter.data_space().here();

    let handler: Rc<WordHandler> = Rc::new(move |interpreter: &mut dyn Interpreter| {
        interpreter.forget_words_newer_than(threshold);

        let current_here = interpreter.data_space().here();
        interpreter
            .data_space()
            .allot(interpreter, saved_here as i64 - current_here as i64)?;

        Ok(())
    });

    interpreter.add_word(
        location.path().clone(),
        location.line(),
        location.column(),
        name,
        handler,
        "Forget every word and data-space cell allocated since this marker.".to_string(),
        " -- ".to_string(),
        WordRuntime::Normal,
        WordVisibility::Visible,
        WordType::Native,
        None,
    );

    Ok(())
}

/// `>BODY` converts the execution token of a word built by CREATE into its data field address.
///
/// Signature: `xt -- addr`
fn word_to_body(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let handler_index = interpreter.pop_as_usize()?;
    let dictionary = interpreter.dictionary().get_merged();

    for word_info in dictionary.values() {
        if word_info.handler_index == handler_index {
            return match word_info.body_address {
                Some(address) => {
                    interpreter.push((address as i64).to_value())?;
                    Ok(())
                }

                None => script_error_with_code_str(
                    interpreter,
                    ThrowCode::NotCreated,
                    "Word was not built by CREATE.",
                ),
            };
        }
    }

    script_error_with_code_str(
        interpreter,
        ThrowCode::NotCreated,
        "No word found for that execution token.",
    )
}

/// `HERE` pushes the current top of the data-space.
///
/// Signature: ` -- addr`
fn word_here(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let here = interpreter.data_space().here();
    interpreter.push((here as i64).to_value())?;
    Ok(())
}

/// `ALLOT` grows (or, given a negative count, shrinks) the data-space.
///
/// Signature: `count -- `
fn word_allot(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let count = interpreter.pop_as_int()?;
    interpreter.data_space().allot(interpreter, count)?;
    Ok(())
}

/// `,` compiles a single cell into the data-space.
///
/// Signature: `value -- `
fn word_comma(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop_as_int()?;
    interpreter.data_space().comma(interpreter, value)?;
    Ok(())
}

/// `C,` compiles a single byte into the data-space.
///
/// Signature: `value -- `
fn word_c_comma(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop_as_int()?;
    let address = interpreter.data_space().allot(interpreter, 1)?;

    interpreter.data_space().store_byte(interpreter, address, value)
}

/// `@` fetches a cell from the data-space.
///
/// Signature: `addr -- value`
fn word_fetch(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let address = interpreter.pop_as_usize()?;
    let value = interpreter.data_space().fetch(interpreter, address)?;

    interpreter.push(value.to_value())?;
    Ok(())
}

/// `!` stores a cell in the data-space.
///
/// Signature: `value addr -- `
fn word_store(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let address = interpreter.pop_as_usize()?;
    let value = interpreter.pop_as_int()?;

    interpreter.data_space().store(interpreter, address, value)
}

/// `C@` fetches a single byte from the data-space.
///
/// Signature: `addr -- value`
fn word_c_fetch(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let address = interpreter.pop_as_usize()?;
    let value = interpreter.data_space().fetch_byte(interpreter, address)?;

    interpreter.push(value.to_value())?;
    Ok(())
}

/// `C!` stores a single byte in the data-space.
///
/// Signature: `value addr -- `
fn word_c_store(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let address = interpreter.pop_as_usize()?;
    let value = interpreter.pop_as_int()?;

    interpreter.data_space().store_byte(interpreter, address, value)
}

/// `BASE` pushes the data-space-less, interpreter-held current numeric radix.
///
/// Signature: ` -- radix`
fn word_base(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let radix = interpreter.radix();
    interpreter.push((radix as i64).to_value())?;
    Ok(())
}

/// `SET-BASE` sets the interpreter's current numeric radix, used both to parse number literals
/// and to format them for `.`, `WORDS`, and the like.
///
/// Signature: `radix -- `
fn word_set_base(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let radix = interpreter.pop_as_usize()?;
    interpreter.set_radix(radix as u32);
    Ok(())
}

/// `HEX` switches the interpreter's current radix to base 16.
fn word_hex(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.set_radix(16);
    Ok(())
}

/// `DECIMAL` switches the interpreter's current radix to base 10.
fn word_decimal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.set_radix(10);
    Ok(())
}

/// `OCTAL` switches the interpreter's current radix to base 8.
fn word_octal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.set_radix(8);
    Ok(())
}

/// Register CREATE/DOES>/MARKER/>BODY, the low level data-space access words, and the BASE
/// family of radix words.
pub fn register_definition_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "create",
        word_create,
        "Create a new word whose default behavior is to push its own data field address.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "does>",
        word_does,
        "Give the word currently being defined a run time behavior beyond pushing its data field.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "marker",
        word_marker,
        "Create a word that forgets everything defined since this point when executed.",
        " -- "
    );

    add_native_word!(
        interpreter,
        ">body",
        word_to_body,
        "Convert the execution token of a word built by CREATE into its data field address.",
        "xt -- addr"
    );

    add_native_word!(
        interpreter,
        "here",
        word_here,
        "Push the current top of the data-space.",
        " -- addr"
    );

    add_native_word!(
        interpreter,
        "allot",
        word_allot,
        "Grow, or with a negative count shrink, the data-space.",
        "count -- "
    );

    add_native_word!(
        interpreter,
        ",",
        word_comma,
        "Compile a single cell into the data-space.",
        "value -- "
    );

    add_native_word!(
        interpreter,
        "c,",
        word_c_comma,
        "Compile a single byte into the data-space.",
        "value -- "
    );

    add_native_word!(
        interpreter,
        "@",
        word_fetch,
        "Fetch a cell from the data-space.",
        "addr -- value"
    );

    add_native_word!(
        interpreter,
        "!",
        word_store,
        "Store a cell in the data-space.",
        "value addr -- "
    );

    add_native_word!(
        interpreter,
        "c@",
        word_c_fetch,
        "Fetch a single byte from the data-space.",
        "addr -- value"
    );

    add_native_word!(
        interpreter,
        "c!",
        word_c_store,
        "Store a single byte in the data-space.",
        "value addr -- "
    );

    add_native_word!(
        interpreter,
        "base",
        word_base,
        "Push the current numeric radix.",
        " -- radix"
    );

    add_native_word!(
        interpreter,
        "set-base",
        word_set_base,
        "Set the current numeric radix.",
        "radix -- "
    );

    add_native_word!(
        interpreter,
        "hex",
        word_hex,
        "Switch the current numeric radix to base 16.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "decimal",
        word_decimal,
        "Switch the current numeric radix to base 10.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "octal",
        word_octal,
        "Switch the current numeric radix to base 8.",
        " -- "
    );
}
