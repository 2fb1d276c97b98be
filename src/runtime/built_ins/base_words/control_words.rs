use std::rc::Rc;

use crate::{
    add_native_immediate_word, add_native_word,
    lang::code::Op,
    runtime::{
        data_structures::{
            dictionary::{WordRuntime, WordType, WordVisibility},
            value::{ToValue, Value},
        },
        error::{self, script_error_with_code_str, ThrowCode},
        interpreter::{Interpreter, ReturnStackManagement},
    },
};

/// Compile a call to an already defined, normal word by name.  Used by the control structure
/// words below to splice calls to `swap`, `>r`, `r>`, and the loop helpers into the byte-code
/// they're generating, the same way the data-stack-driven `op.*` words do it by hand.
fn compile_call(interpreter: &mut dyn Interpreter, name: &str) -> error::Result<()> {
    let word_info = match interpreter.find_word(name) {
        Some(word_info) => word_info.clone(),
        None => {
            return script_error_with_code_str(
                interpreter,
                ThrowCode::UndefinedWord,
                &format!("Word '{}' is not defined.", name),
            );
        }
    };

    interpreter.insert_user_instruction(
        None,
        Op::Execute(Value::Int(word_info.handler_index as i64)),
    )
}

/// `IF ( flag -- )` compiles a conditional jump over the true-branch and leaves its own jump
/// label on the data stack for `ELSE` or `THEN` to resolve.
fn word_if(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let if_label = interpreter.context_mut().new_label();

    interpreter.insert_user_instruction(None, Op::JumpIfZero(if_label.clone()))?;
    interpreter.push(if_label)?;

    Ok(())
}

/// `ELSE` closes off the true-branch of an `IF`, jumping past the false-branch, and opens a new
/// label for the false-branch to land on.
fn word_else(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let if_label = interpreter.pop()?;
    let else_label = interpreter.context_mut().new_label();

    interpreter.insert_user_instruction(None, Op::Jump(else_label.clone()))?;
    interpreter.insert_user_instruction(None, Op::JumpTarget(if_label))?;
    interpreter.push(else_label)?;

    Ok(())
}

/// `THEN` marks the end of an `IF`/`ELSE` construct, resolving whichever label is still on top
/// of the data stack.
fn word_then(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let label = interpreter.pop()?;
    interpreter.insert_user_instruction(None, Op::JumpTarget(label))
}

/// `BEGIN` marks the top of an indefinite loop.  Leaves its label on the data stack for whichever
/// of `UNTIL`, `AGAIN`, or `WHILE` closes the loop.
fn word_begin(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let begin_label = interpreter.context_mut().new_label();

    interpreter.insert_user_instruction(None, Op::JumpTarget(begin_label.clone()))?;
    interpreter.push(begin_label)?;

    Ok(())
}

/// `UNTIL ( flag -- )` jumps back to the matching `BEGIN` while the flag is false.
fn word_until(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let begin_label = interpreter.pop()?;
    interpreter.insert_user_instruction(None, Op::JumpIfZero(begin_label))
}

/// `AGAIN` jumps back to the matching `BEGIN` unconditionally.
fn word_again(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let begin_label = interpreter.pop()?;
    interpreter.insert_user_instruction(None, Op::Jump(begin_label))
}

/// `WHILE ( flag -- )` tests the loop condition in the middle of a `BEGIN ... REPEAT` loop,
/// jumping past the rest of the loop body when false.
fn word_while(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let begin_label = interpreter.pop()?;
    let exit_label = interpreter.context_mut().new_label();

    interpreter.insert_user_instruction(None, Op::JumpIfZero(exit_label.clone()))?;
    interpreter.push(begin_label)?;
    interpreter.push(exit_label)?;

    Ok(())
}

/// `REPEAT` closes a `BEGIN ... WHILE ... REPEAT` loop, jumping back to `BEGIN` and resolving
/// `WHILE`'s exit label just past the jump.
fn word_repeat(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let exit_label = interpreter.pop()?;
    let begin_label = interpreter.pop()?;

    interpreter.insert_user_instruction(None, Op::Jump(begin_label))?;
    interpreter.insert_user_instruction(None, Op::JumpTarget(exit_label))
}

/// `UNLOOP ( -- )` drops the loop control parameters of the innermost `DO` loop off of the
/// return stack.  Needed before an early `EXIT` taken from inside a loop body, and reused by
/// `LEAVE` below.
fn word_unloop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.pop_return()?;
    interpreter.pop_return()?;

    Ok(())
}

/// `I ( -- index )` pushes the index of the innermost `DO` loop.
fn word_i(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let index = interpreter.peek_return(0)?;
    interpreter.push(index)?;

    Ok(())
}

/// `J ( -- index )` pushes the index of the loop one level out from the innermost `DO` loop.
/// The innermost loop's own index and limit occupy return stack depths 0 and 1, so the next
/// loop out's index sits at depth 2.
fn word_j(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let index = interpreter.peek_return(2)?;
    interpreter.push(index)?;

    Ok(())
}

/// Hidden helper compiled by `LOOP`.  Increments the innermost loop's index by one and reports
/// whether the loop should continue.  When it shouldn't, the index and limit are both popped off
/// of the return stack so that whichever path reaches the loop's exit label, (falling through
/// here or arriving via `LEAVE`,) finds the return stack already balanced.
///
/// Signature: ` -- continue?`
fn word_sf_loop_next(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let limit = interpreter.peek_return(1)?.get_int_val();
    let index = interpreter.peek_return(0)?.get_int_val();
    let new_index = index + 1;

    if new_index < limit {
        interpreter.pop_return()?;
        interpreter.push_return(new_index.to_value())?;
        interpreter.push(true.to_value())?;
    } else {
        interpreter.pop_return()?;
        interpreter.pop_return()?;
        interpreter.push(false.to_value())?;
    }

    Ok(())
}

/// Hidden helper compiled by `+LOOP`.  Same as `sf.loop-next` above, but the step is popped from
/// the data stack rather than always being one, and the loop continues or stops depending on the
/// sign of the step.
///
/// Signature: `step -- continue?`
fn word_sf_loop_next_step(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let step = interpreter.pop_as_int()?;
    let limit = interpreter.peek_return(1)?.get_int_val();
    let index = interpreter.peek_return(0)?.get_int_val();
    let new_index = index + step;

    let continuing = if step >= 0 {
        new_index < limit
    } else {
        new_index >= limit
    };

    if continuing {
        interpreter.pop_return()?;
        interpreter.push_return(new_index.to_value())?;
        interpreter.push(true.to_value())?;
    } else {
        interpreter.pop_return()?;
        interpreter.pop_return()?;
        interpreter.push(false.to_value())?;
    }

    Ok(())
}

/// `DO ( limit index -- )` opens a counted loop.  The loop's control parameters are moved onto
/// the return stack, limit below index, so `I` can read the index straight off the top.  The
/// loop's exit label is left on the data stack for `LOOP`/`+LOOP` to resolve, and also marked
/// with `Op::MarkLoopExit` so that `LEAVE`'s `Op::JumpLoopExit` knows where to land.
fn word_do(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let exit_label = interpreter.context_mut().new_label();
    interpreter.push(exit_label.clone())?;

    compile_call(interpreter, "swap")?;
    compile_call(interpreter, ">r")?;
    compile_call(interpreter, ">r")?;

    interpreter.insert_user_instruction(None, Op::MarkLoopExit(exit_label))
}

/// Shared tail end of `LOOP` and `+LOOP`: having just compiled a call that leaves a continue
/// flag on the data stack, compile the jump back to the loop body, or fall through to the loop's
/// exit label and unmark it.
fn compile_loop_tail(interpreter: &mut dyn Interpreter, exit_label: Value) -> error::Result<()> {
    let skip_label = interpreter.context_mut().new_label();

    interpreter.insert_user_instruction(None, Op::JumpIfZero(skip_label.clone()))?;
    interpreter.insert_user_instruction(None, Op::JumpLoopStart)?;
    interpreter.insert_user_instruction(None, Op::JumpTarget(skip_label))?;
    interpreter.insert_user_instruction(None, Op::JumpTarget(exit_label))?;
    interpreter.insert_user_instruction(None, Op::UnmarkLoopExit)
}

/// `LOOP` closes a `DO` loop, incrementing the index by one each time through.
fn word_loop_word(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let exit_label = interpreter.pop()?;

    compile_call(interpreter, "sf.loop-next")?;
    compile_loop_tail(interpreter, exit_label)
}

/// `+LOOP ( step -- )` closes a `DO` loop, incrementing the index by a runtime supplied step each
/// time through.
fn word_plus_loop(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let exit_label = interpreter.pop()?;

    compile_call(interpreter, "sf.loop-next-step")?;
    compile_loop_tail(interpreter, exit_label)
}

/// `LEAVE ( -- )` jumps straight out of the innermost `DO` loop, having first balanced the return
/// stack the same way `UNLOOP` does.
fn word_leave(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    compile_call(interpreter, "unloop")?;
    interpreter.insert_user_instruction(None, Op::JumpLoopExit)
}

/// Register `IF`/`ELSE`/`THEN`, `BEGIN`/`UNTIL`/`AGAIN`/`WHILE`/`REPEAT`, and
/// `DO`/`LOOP`/`+LOOP`/`LEAVE`/`UNLOOP`/`I`/`J`.
pub fn register_control_words(interpreter: &mut dyn Interpreter) {
    add_native_immediate_word!(
        interpreter,
        "if",
        word_if,
        "Compile a conditional jump over the following true-branch.",
        "flag -- "
    );

    add_native_immediate_word!(
        interpreter,
        "else",
        word_else,
        "Compile the jump separating the true and false branches of an IF.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "then",
        word_then,
        "Mark the end of an IF/ELSE construct.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "begin",
        word_begin,
        "Mark the top of an indefinite loop.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "until",
        word_until,
        "Jump back to BEGIN while the flag on the stack is false.",
        "flag -- "
    );

    add_native_immediate_word!(
        interpreter,
        "again",
        word_again,
        "Jump back to BEGIN unconditionally.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "while",
        word_while,
        "Test a loop condition in the middle of a BEGIN/REPEAT loop.",
        "flag -- "
    );

    add_native_immediate_word!(
        interpreter,
        "repeat",
        word_repeat,
        "Close a BEGIN/WHILE/REPEAT loop.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "do",
        word_do,
        "Open a counted loop.",
        "limit index -- "
    );

    add_native_immediate_word!(
        interpreter,
        "loop",
        word_loop_word,
        "Close a DO loop, incrementing the index by one.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "+loop",
        word_plus_loop,
        "Close a DO loop, incrementing the index by a runtime supplied step.",
        "step -- "
    );

    add_native_immediate_word!(
        interpreter,
        "leave",
        word_leave,
        "Jump straight out of the innermost DO loop.",
        " -- "
    );

    // These compile only words manipulate the construction stack's jump labels and the return
    // stack's loop control parameters; running them outside of a definition is an ambiguous
    // condition, per the Forth-2012 standard, rather than something with well defined behavior.
    for word in ["if", "else", "then", "begin", "until", "again", "while", "repeat", "do",
                 "loop", "+loop", "leave"]
    {
        interpreter.mark_word_compile_only(word);
    }

    add_native_word!(
        interpreter,
        "unloop",
        word_unloop,
        "Drop the innermost DO loop's control parameters off of the return stack.",
        " -- "
    );

    add_native_word!(interpreter, "i", word_i, "Push the innermost loop's index.", " -- index");

    add_native_word!(
        interpreter,
        "j",
        word_j,
        "Push the index of the loop one level out from the innermost loop.",
        " -- index"
    );

    interpreter.add_word(
        file!().to_string(),
        line!() as usize,
        0,
        "sf.loop-next".to_string(),
        Rc::new(word_sf_loop_next),
        "Increment the innermost loop's index by one, reporting whether to continue.".to_string(),
        " -- continue?".to_string(),
        WordRuntime::Normal,
        WordVisibility::Hidden,
        WordType::Native,
        None,
    );

    interpreter.add_word(
        file!().to_string(),
        line!() as usize,
        0,
        "sf.loop-next-step".to_string(),
        Rc::new(word_sf_loop_next_step),
        "Increment the innermost loop's index by a runtime step, reporting whether to continue."
            .to_string(),
        "step -- continue?".to_string(),
        WordRuntime::Normal,
        WordVisibility::Hidden,
        WordType::Native,
        None,
    );
}
