use crate::{
    add_native_word,
    runtime::{
        data_structures::value::ToValue,
        error::{self, script_error_str},
        interpreter::{BlockManagement, Interpreter},
    },
};

/// Make the given block resident, reading it in from the block file if it wasn't already, and
/// leave its byte buffer on the stack.
///
/// Signature: `block-number -- buffer`
fn word_block(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let number = interpreter.pop_as_usize()?;

    if number == 0 {
        script_error_str(interpreter, "Block 0 is reserved and not addressable.")?;
    }

    let buffer = interpreter.block(number)?;
    interpreter.push(buffer.to_value())?;

    Ok(())
}

/// Make the given block resident without reading it in from disk first, and leave its (blank)
/// byte buffer on the stack.  Used to prepare a block that's about to be completely overwritten.
///
/// Signature: `block-number -- buffer`
fn word_buffer(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let number = interpreter.pop_as_usize()?;

    if number == 0 {
        script_error_str(interpreter, "Block 0 is reserved and not addressable.")?;
    }

    let buffer = interpreter.block_buffer(number)?;
    interpreter.push(buffer.to_value())?;

    Ok(())
}

/// Mark the resident block as modified, so that it will be written back to disk on the next
/// `FLUSH` or `SAVE-BUFFERS`.
///
/// Signature: ` -- `
fn word_update(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.update_block();
    Ok(())
}

/// Write the resident block back to disk if it's dirty, then empty the block cache.
///
/// Signature: ` -- `
fn word_flush(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.flush_blocks()
}

/// Write the resident block back to disk if it's dirty, without emptying the block cache.
///
/// Signature: ` -- `
fn word_save_buffers(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.save_blocks()
}

/// Discard the resident block without writing it back to disk, regardless of whether it was
/// marked dirty.
///
/// Signature: ` -- `
fn word_empty_buffers(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.empty_blocks();
    Ok(())
}

/// List a block's contents to the terminal, 16 lines of 64 characters apiece, the way `LIST`
/// has traditionally displayed a text block.
///
/// Signature: `block-number -- `
fn word_list(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let number = interpreter.pop_as_usize()?;

    if number == 0 {
        script_error_str(interpreter, "Block 0 is reserved and not addressable.")?;
    }

    let buffer = interpreter.block(number)?;
    let bytes = buffer.borrow().buffer().clone();

    println!("--- Block {} ---", number);

    for (line_number, chunk) in bytes.chunks(64).enumerate() {
        let text = String::from_utf8_lossy(chunk);
        println!("{:2}: {}", line_number, text);
    }

    Ok(())
}

/// Load and execute a block as Forth source text.
///
/// Signature: `block-number -- `
fn word_load(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let number = interpreter.pop_as_usize()?;

    if number == 0 {
        script_error_str(interpreter, "Block 0 is reserved and not addressable.")?;
    }

    let buffer = interpreter.block(number)?;
    let bytes = buffer.borrow().buffer().clone();
    let text = String::from_utf8_lossy(&bytes).to_string();

    interpreter.process_source(&format!("<block {}>", number), &text)
}

/// Load and execute a contiguous range of blocks, from `start` through `end` inclusive.
///
/// Signature: `start end -- `
fn word_thru(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let end = interpreter.pop_as_usize()?;
    let start = interpreter.pop_as_usize()?;

    for number in start..=end {
        interpreter.push(number.to_value())?;
        word_load(interpreter)?;
    }

    Ok(())
}

/// Register all of the block words with the given interpreter.
pub fn register_block_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "block",
        word_block,
        "Make the given block resident and leave its byte buffer on the stack.",
        "block-number -- buffer"
    );

    add_native_word!(
        interpreter,
        "buffer",
        word_buffer,
        "Make the given block resident without reading it from disk.",
        "block-number -- buffer"
    );

    add_native_word!(
        interpreter,
        "update",
        word_update,
        "Mark the resident block as modified.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "flush",
        word_flush,
        "Write the resident block back to disk if dirty and empty the cache.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "save-buffers",
        word_save_buffers,
        "Write the resident block back to disk if dirty, keeping it cached.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "empty-buffers",
        word_empty_buffers,
        "Discard the resident block without writing it back.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "list",
        word_list,
        "Print a block's contents to the terminal.",
        "block-number -- "
    );

    add_native_word!(
        interpreter,
        "load",
        word_load,
        "Load and execute a block as Forth source.",
        "block-number -- "
    );

    add_native_word!(
        interpreter,
        "thru",
        word_thru,
        "Load and execute a contiguous range of blocks.",
        "start end -- "
    );
}
