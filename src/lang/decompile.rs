use crate::{
    lang::code::{ByteCode, Op},
    runtime::{
        data_structures::{byte_buffer::Buffer, dictionary::WordInfo, value::Value},
        interpreter::Interpreter,
    },
};
use std::fmt::Write;

/// Resolve an `Op::Execute`'s value to a printable word name, falling back to the raw value when
/// the handler index has no matching dictionary entry, (for example a word that's since been
/// `MARKER`ed away.)
fn execute_target_name(interpreter: &dyn Interpreter, value: &Value) -> String {
    match value {
        Value::String(name) => name.clone(),

        Value::Int(index) => {
            let names = interpreter.inverse_name_list();
            let index = *index as usize;

            match names.get(index) {
                Some(name) if !name.is_empty() => name.clone(),
                _ => format!("<unknown word {}>", index),
            }
        }

        other => format!("{}", other),
    }
}

/// Print the data-space region backing a `CREATE`d word's data field as a hex dump, reusing the
/// same format `.` on a byte-buffer uses.
fn hex_dump_data_field(interpreter: &dyn Interpreter, address: usize) -> String {
    let data_space = interpreter.data_space();
    let buffer = data_space.buffer();
    let len = buffer.borrow().len();

    if address >= len {
        return String::new();
    }

    // Present the tail of the data-space starting at the word's data field as a standalone
    // buffer so the existing hex-dump Display impl can be reused unmodified.
    let bytes = {
        let borrowed = buffer.borrow();
        let ptr = borrowed.byte_ptr() as *const u8;

        unsafe { std::slice::from_raw_parts(ptr.add(address), len - address) }.to_vec()
    };

    let mut view = crate::runtime::data_structures::byte_buffer::ByteBuffer::new(bytes.len());
    view.buffer_mut().copy_from_slice(&bytes);

    format!("{}", &view as &dyn Buffer)
}

/// Walk a word's colon-definition byte-code and render it the way a Forth `SEE` would: one line
/// per instruction, word names resolved where possible, literals and jumps spelled out instead of
/// left as raw enum variants.
fn decompile_code(interpreter: &dyn Interpreter, code: &ByteCode) -> String {
    let mut result = String::new();

    for instruction in code {
        match &instruction.op {
            Op::Execute(value) => {
                let _ = writeln!(&mut result, "  {}", execute_target_name(interpreter, value));
            }

            Op::PushConstantValue(value) => match value {
                Value::String(text) => {
                    let _ = writeln!(&mut result, "  S\" {}\"", text);
                }

                _ => {
                    let _ = writeln!(&mut result, "  [ {} ] LITERAL", value);
                }
            },

            Op::Jump(value)
            | Op::JumpIfZero(value)
            | Op::JumpIfNotZero(value)
            | Op::MarkLoopExit(value)
            | Op::MarkCatch(value) => {
                let _ = writeln!(&mut result, "  [ {} CELLS , ]", value);
            }

            Op::JumpTarget(_) | Op::UnmarkLoopExit | Op::UnmarkCatch => {
                // Landing pads and the unmark markers don't correspond to anything a Forth
                // programmer would type; they're implementation detail of the jump resolution.
            }

            Op::DefVariable(value) => {
                let _ = writeln!(&mut result, "  VARIABLE {}", value);
            }

            Op::DefConstant(value) => {
                let _ = writeln!(&mut result, "  CONSTANT {}", value);
            }

            Op::ReadVariable => {
                let _ = writeln!(&mut result, "  @");
            }

            Op::WriteVariable => {
                let _ = writeln!(&mut result, "  !");
            }

            Op::MarkContext | Op::ReleaseContext => {
                // Context management is implicit in the donor's managed-word convention; nothing
                // for SEE to show the user.
            }

            Op::JumpLoopStart => {
                let _ = writeln!(&mut result, "  [ continue ]");
            }

            Op::JumpLoopExit => {
                let _ = writeln!(&mut result, "  [ leave ]");
            }

            Op::DoesBody(value) => {
                let _ = writeln!(&mut result, "{}", decompile_does_body(interpreter, value));
            }

            Op::DataField(value) => {
                let address = value.get_int_val() as usize;
                let _ = writeln!(&mut result, "  ( data field @ {} )", address);
            }
        }
    }

    result
}

/// Render a `DoesBody` instruction: the hex dump of the data-space cells it owns, followed by the
/// (defining-word, created-word) name pair it was spliced from.
fn decompile_does_body(interpreter: &dyn Interpreter, value: &Value) -> String {
    let does_code = match value {
        Value::Code(code) => code,
        _ => return "  ( malformed DOES> body )".to_string(),
    };

    let mut result = String::new();

    // The does-part always begins with the DataField push the interpreter spliced in front of the
    // user's does-code at `;` time; pull the address back out to label the dump.
    if let Some(first) = does_code.front() {
        if let Op::DataField(address_value) = &first.op {
            let address = address_value.get_int_val() as usize;
            let _ = writeln!(&mut result, "  ( DOES> body, data field @ {} )", address);
            let _ = write!(&mut result, "{}", hex_dump_data_field(interpreter, address));
        }
    }

    let _ = writeln!(&mut result, "DOES>");
    let _ = write!(&mut result, "{}", decompile_code(interpreter, does_code));

    result
}

/// Decompile a single word back into a readable, Forth-like listing, the way `SEE` would show it.
///
/// Scripted words walk their byte-code with `decompile_code`.  Words built by `CREATE` (and not
/// yet retargeted by a `DOES>`) show `CREATE name ( size n )` plus a hex dump of their data field.
/// Anything else, (native words without stored byte-code,) falls back to a terse one-liner.
pub fn decompile_word(interpreter: &dyn Interpreter, word: &WordInfo) -> String {
    let mut result = String::new();

    match &word.code {
        Some(code) if word.created && word.body_address.is_some() => {
            let address = word.body_address.unwrap();
            let size = interpreter.data_space().here().saturating_sub(address);

            let _ = writeln!(&mut result, "CREATE {} ( size {} )", word.name, size);
            let _ = write!(&mut result, "{}", hex_dump_data_field(interpreter, address));

            // A CREATEd word can still have had DOES> applied to it; if the stored code holds a
            // DoesBody instruction show it too instead of just the bare data field.
            for instruction in code {
                if let Op::DoesBody(value) = &instruction.op {
                    let _ = write!(&mut result, "{}", decompile_does_body(interpreter, value));
                }
            }
        }

        Some(code) => {
            let _ = writeln!(&mut result, ": {}", word.name);
            let _ = write!(&mut result, "{}", decompile_code(interpreter, code));
            let _ = write!(&mut result, ";");

            if word.runtime == crate::runtime::data_structures::dictionary::WordRuntime::Immediate
            {
                let _ = write!(&mut result, " IMMEDIATE");
            }

            if word.compile_only {
                let _ = write!(&mut result, " compile-only");
            }

            let _ = writeln!(&mut result);
        }

        None => {
            let _ = writeln!(
                &mut result,
                ": {} ( unknown code ) {}",
                word.name, word.handler_index
            );
        }
    }

    result
}
