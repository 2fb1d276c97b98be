use crate::{
    add_native_immediate_word,
    lang::{
        code::{ByteCode, Instruction, Op},
        compilation::resolve_jumps_in,
        tokenizing::Token,
    },
    runtime::{
        data_structures::{
            dictionary::{WordContext, WordRuntime, WordType, WordVisibility},
            value::Value,
        },
        error::{self, script_error_str, script_error_with_code_str, ThrowCode},
        interpreter::Interpreter,
    },
};
use std::rc::Rc;

/// A script defined word.
struct ScriptFunction {
    /// The name of the word.
    name: String,

    /// The context management of the word.
    context: WordContext,

    /// The byte-code for the word.
    code: ByteCode,
}

impl ScriptFunction {
    /// Create the new ScriptFunction handler.
    pub fn new(name: String, context: WordContext, code: ByteCode) -> ScriptFunction {
        ScriptFunction {
            name,
            context,
            code,
        }
    }
}

/// Implement the Fn trait for ScriptFunction to make the struct callable.
impl Fn<(&mut dyn Interpreter,)> for ScriptFunction {
    extern "rust-call" fn call(&self, args: (&mut dyn Interpreter,)) -> error::Result<()> {
        if let WordContext::Managed = self.context {
            args.0.mark_context();
        }

        let result = args.0.execute_code(&self.name, &self.code);

        if let WordContext::Managed = self.context {
            args.0.release_context();
        }

        result
    }
}

/// Implement the FnMut trait for ScriptFunction to make the struct callable.
impl FnMut<(&mut dyn Interpreter,)> for ScriptFunction {
    extern "rust-call" fn call_mut(&mut self, args: (&mut dyn Interpreter,)) -> error::Result<()> {
        if let WordContext::Managed = self.context {
            args.0.mark_context();
        }

        let result = args.0.execute_code(&self.name, &self.code);

        if let WordContext::Managed = self.context {
            args.0.release_context();
        }

        result
    }
}

/// Implement the FnOnce trait for the ScriptFunction to make the struct callable.
impl FnOnce<(&mut dyn Interpreter,)> for ScriptFunction {
    type Output = error::Result<()>;

    extern "rust-call" fn call_once(self, args: (&mut dyn Interpreter,)) -> error::Result<()> {
        if let WordContext::Managed = self.context {
            args.0.mark_context();
        }

        let result = args.0.execute_code(&self.name, &self.code);

        if let WordContext::Managed = self.context {
            args.0.release_context();
        }

        result
    }
}

/// Start the creation of a new word.  Pull the name of the word from the next token in the token
/// stream.
fn word_start_word(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let token = interpreter.next_token()?;
    let (location, name) = match token {
        Token::Word(location, name) => (location, name),
        Token::Number(location, value) => (location, value.to_string()),
        Token::String(_, _) => {
            return script_error_str(interpreter, "Can not use a string as a word name.");
        }
    };

    interpreter.context_mut().construction_new();

    let sentinel = (interpreter.return_stack().len(), interpreter.stack().len());

    let construction = interpreter.context_mut().construction_mut()?;
    construction.name = name;
    construction.location = location;
    construction.control_sentinel = Some(sentinel);

    Ok(())
}

/// End the creation of a new word and register it with the interpreter.
fn word_end_word(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let mut construction = interpreter.context_mut().construction_pop()?;

    // Every IF/DO/BEGIN compiled in this definition must have been closed by its matching
    // THEN/LOOP/UNTIL, else a label or loop control parameter was left stranded on one of these
    // stacks.  Compare against the depths recorded when `:` opened this definition.
    if let Some((opened_rs_len, opened_ds_len)) = construction.control_sentinel {
        let rs_len = interpreter.return_stack().len();
        let ds_len = interpreter.stack().len();

        if rs_len != opened_rs_len || ds_len != opened_ds_len {
            return script_error_with_code_str(
                interpreter,
                ThrowCode::ControlStructureMismatch,
                "Unbalanced control structure: a definition left its stacks unbalanced, likely \
                 a dangling IF/DO/BEGIN with no matching THEN/LOOP/UNTIL.",
            );
        }
    }

    // Resolve the defining word's own jump labels, then, if DOES> was used within this
    // definition, resolve the does-part's labels separately (it's a distinct block with its own
    // label namespace) and splice it onto the end of the word's code as a single instruction.
    // The DataField the runtime pushes for us as it enters the DoesBody op is what lets the
    // does-part assume the data field address is already sitting on top of the data stack, the
    // same as the default CREATE behavior it's replacing.
    resolve_jumps_in(&mut construction.code);

    if let Some(mut does_code) = construction.does_code.take() {
        resolve_jumps_in(&mut does_code);

        construction
            .code
            .push_back(Instruction::new(None, Op::DoesBody(Value::Code(does_code))));
    }

    let decompiled_code = construction.code.clone();

    let new_function = ScriptFunction::new(
        construction.name.clone(),
        construction.context,
        construction.code,
    );

    let name = construction.name.clone();
    let compile_only = construction.compile_only;

    interpreter.add_word(
        construction.location.path().clone(),
        construction.location.line(),
        construction.location.column(),
        construction.name,
        Rc::new(new_function),
        construction.description,
        construction.signature,
        construction.runtime,
        construction.visibility,
        WordType::Scripted,
        Some(decompiled_code),
    );

    if compile_only {
        interpreter.mark_word_compile_only(&name);
    }

    Ok(())
}

/// Mark the current word being generated word as immediate.
fn word_immediate(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.context_mut().construction_mut()?.runtime = WordRuntime::Immediate;
    Ok(())
}

/// Mark the current word being generated as hidden from the directory index.
fn word_hidden(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.context_mut().construction_mut()?.visibility = WordVisibility::Hidden;
    Ok(())
}

/// Mark the current word being generated as not using the automatic context management.
fn word_contextless(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.context_mut().construction_mut()?.context = WordContext::Manual;
    Ok(())
}

/// Mark the current word being generated as compile-only: interpreting it directly, outside of a
/// definition, becomes an ambiguous condition rather than being silently allowed.
fn word_compile_only(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.context_mut().construction_mut()?.compile_only = true;
    Ok(())
}

/// Give a description to the current word being generated.
fn word_description(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let description = interpreter.next_token_string()?;

    interpreter.context_mut().construction_mut()?.description = description;
    Ok(())
}

/// Document the signature of the current word being generated.
fn word_signature(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let signature = interpreter.next_token_string()?;

    interpreter.context_mut().construction_mut()?.signature = signature;
    Ok(())
}

/// Register the word creation words with the interpreter.
pub fn register_word_creation_words(interpreter: &mut dyn Interpreter) {
    add_native_immediate_word!(
        interpreter,
        ":",
        word_start_word,
        "Start a new word definition.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        ";",
        word_end_word,
        "End the definition of the newly created word.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "immediate",
        word_immediate,
        "Mark the new word as immediate.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "hidden",
        word_hidden,
        "Mark the new word as hidden from the directory.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "contextless",
        word_contextless,
        "Mark the new word as not using the automatic context management.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "compile-only",
        word_compile_only,
        "Mark the new word as only legal to use at compile time.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "description:",
        word_description,
        "Give a description for the new word.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "signature:",
        word_signature,
        "Document the word's signature.",
        " -- "
    );
}
