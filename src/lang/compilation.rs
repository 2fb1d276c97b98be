use std::collections::HashMap;

use crate::{
    lang::{
        code::{ByteCode, Instruction, Op},
        numeric::parse_number,
        source_buffer::SourceLocation,
        tokenizing::{Token, TokenList},
    },
    runtime::{
        data_structures::{
            dictionary::{WordContext, WordRuntime, WordVisibility},
            value::{ToValue, Value},
        },
        error::{self, script_error_with_code_str, StackId, ThrowCode},
        interpreter::{DataSpaceManagement, Interpreter},
    },
};

/// Where new instructions should be inserted within a construction's code block.  Most words
/// append to the end, but some, (like words that need to patch in a preamble after the fact,)
/// need to insert at the front instead.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum InsertionLocation {
    /// New instructions are appended to the end of the block.  This is the default.
    AtEnd,

    /// New instructions are inserted at the beginning of the block.
    AtTop,
}

/// A single word or top level script currently under construction.  Accumulates the byte-code for
/// the definition as well as the bits of bookkeeping needed to eventually register it as a proper
/// word with the interpreter's dictionary.
pub struct Construction {
    /// The name of the word being defined.  For top level script code this is a fixed sentinel
    /// name used only for call-stack reporting.
    pub name: String,

    /// Where in the original source the definition started.
    pub location: SourceLocation,

    /// A simple description of the word, set via `description:`.
    pub description: String,

    /// The word's stack signature, set via `signature:`.
    pub signature: String,

    /// When should the word run?  Immediate words run as soon as they're found at compile time.
    pub runtime: WordRuntime,

    /// Is the word visible in the `.w` directory listing?
    pub visibility: WordVisibility,

    /// Is the word's context managed automatically by the interpreter, or manually by the word
    /// itself?
    pub context: WordContext,

    /// The byte-code compiled so far for this word.
    pub code: ByteCode,

    /// If DOES> has been used within this definition, the byte-code compiled after it.  While
    /// this is Some, newly compiled instructions are routed here instead of into `code`.  At the
    /// end of the definition this is spliced into `code` as a single Op::DoesBody instruction.
    pub does_code: Option<ByteCode>,

    /// The depths of the return and data stacks at the moment `:`/`:NONAME` opened this
    /// definition.  `IF`/`DO`/`BEGIN` and friends stash their jump labels and loop control
    /// parameters on these same stacks while compiling; a well formed definition leaves both
    /// stacks back at this depth by the time `;` runs.  `None` until `word_start_word` fills it
    /// in, since a freshly pushed `Construction` doesn't yet know the depths it opened at.
    pub control_sentinel: Option<(usize, usize)>,

    /// Is the word being defined only legal to use at compile time, like `IF` or `DO`?  Set via
    /// `compile-only`; applied to the dictionary entry once `;` registers the word.
    pub compile_only: bool,
}

impl Construction {
    /// Create a new, empty construction.
    pub fn new() -> Construction {
        Construction {
            name: String::new(),
            location: SourceLocation::new(),
            description: String::new(),
            signature: String::new(),
            runtime: WordRuntime::Normal,
            visibility: WordVisibility::Visible,
            context: WordContext::Managed,
            code: ByteCode::new(),
            does_code: None,
            control_sentinel: None,
            compile_only: false,
        }
    }

    /// Create a new construction that already holds a block of code.  Used when an existing code
    /// block is pushed back onto the construction stack for further editing.
    pub fn new_with_code(code: ByteCode) -> Construction {
        let mut new_construction = Construction::new();
        new_construction.code = code;

        new_construction
    }

    /// Resolve all of the jump labels compiled into this construction's code into the relative
    /// instruction displacements that the inner interpreter expects.  See `resolve_jumps_in`.
    pub fn resolve_jumps(&mut self) {
        resolve_jumps_in(&mut self.code);
    }
}

/// Resolve all of the jump labels compiled into a block of byte-code into the relative
/// instruction displacements that the inner interpreter expects.
///
/// During compilation, words like IF/THEN and BEGIN/UNTIL don't yet know how far away their
/// target instruction will end up being, so they compile a unique label value instead.  Once
/// the whole definition has been compiled, every JumpTarget's label is looked up and every
/// instruction that referred to that label has its value replaced with the signed,
/// instruction-relative displacement to the target.
///
/// Applied separately to each `Construction`'s `code` (and, for CREATE...DOES> definitions, to
/// the does-part's own code before it is spliced in) since jump labels are only ever resolved
/// against the block they were compiled into.
pub fn resolve_jumps_in(code: &mut ByteCode) {
    let mut targets: HashMap<Value, usize> = HashMap::new();

    for (index, instruction) in code.iter().enumerate() {
        if let Op::JumpTarget(label) = &instruction.op {
            targets.insert(label.clone(), index);
        }
    }

    for (index, instruction) in code.iter_mut().enumerate() {
        let resolved = match &instruction.op {
            Op::Jump(label) => targets
                .get(label)
                .map(|target| Op::Jump(Value::Int(*target as i64 - index as i64))),

            Op::JumpIfZero(label) => targets
                .get(label)
                .map(|target| Op::JumpIfZero(Value::Int(*target as i64 - index as i64))),

            Op::JumpIfNotZero(label) => targets
                .get(label)
                .map(|target| Op::JumpIfNotZero(Value::Int(*target as i64 - index as i64))),

            Op::MarkLoopExit(label) => targets
                .get(label)
                .map(|target| Op::MarkLoopExit(Value::Int(*target as i64 - index as i64))),

            Op::MarkCatch(label) => targets
                .get(label)
                .map(|target| Op::MarkCatch(Value::Int(*target as i64 - index as i64))),

            _ => None,
        };

        if let Some(resolved) = resolved {
            instruction.op = resolved;
        }
    }

    for instruction in code.iter_mut() {
        if let Op::JumpTarget(_) = &instruction.op {
            instruction.op = Op::JumpTarget(Value::None);
        }
    }
}

impl Default for Construction {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of Constructions currently being compiled, along with the token stream being compiled
/// from.  Each source file, string, or `: ... ;` definition nested within gets its own frame on
/// the construction stack, while the token stream is shared for the whole compile of a single
/// source.
pub struct CodeConstructor {
    /// The tokens that make up the source currently being compiled.
    tokens: TokenList,

    /// The current read position within the token stream.
    position: usize,

    /// The stack of definitions currently under construction.  The top of the stack is the
    /// innermost definition currently being compiled.
    constructions: Vec<Construction>,

    /// Where new instructions should be inserted in the current construction.
    pub insertion: InsertionLocation,

    /// Monotonically increasing counter used to hand out unique compile time jump labels.
    next_label: i64,
}

impl CodeConstructor {
    /// Create a new code constructor for the given token stream.
    pub fn new(tokens: TokenList) -> CodeConstructor {
        CodeConstructor {
            tokens,
            position: 0,
            constructions: Vec::new(),
            insertion: InsertionLocation::AtEnd,
            next_label: 0,
        }
    }

    /// Extend the token stream with more tokens, without disturbing the current read position.
    /// Used by the interactive repl to feed each newly read line's tokens into an otherwise
    /// persistent construction context, so a `:`-definition can span multiple lines of input.
    pub fn append_tokens(&mut self, mut more: TokenList) {
        self.tokens.append(&mut more);
    }

    /// Get the next token from the stream, if any are left.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.position >= self.tokens.len() {
            return None;
        }

        let token = self.tokens[self.position].clone();
        self.position += 1;

        Some(token)
    }

    /// Hand out a fresh, unique compile time jump label.
    pub fn new_label(&mut self) -> Value {
        let label = self.next_label;
        self.next_label += 1;

        Value::String(format!("$label_{}", label))
    }

    /// Start a new, nested definition on the construction stack.
    pub fn construction_new(&mut self) {
        self.constructions.push(Construction::new());
    }

    /// Start a new, nested definition on the construction stack, seeded with an existing block of
    /// code.
    pub fn construction_new_with_code(&mut self, code: ByteCode) {
        self.constructions.push(Construction::new_with_code(code));
    }

    /// How many nested definitions are currently under construction.  The outermost, top level
    /// script construction (pushed once by `process_source_from_tokens`) counts as one, so a
    /// depth of 1 means we are in interpret state: no `:`-definition is currently open and words
    /// should execute immediately rather than being compiled into a deferred code block.  A depth
    /// greater than 1 means we are nested inside at least one definition, i.e. compile state.
    pub fn depth(&self) -> usize {
        self.constructions.len()
    }

    /// Access the top of the construction stack.
    pub fn construction(&self) -> error::Result<&Construction> {
        self.constructions
            .last()
            .ok_or(())
            .map_err(|_| construction_stack_underflow())
    }

    /// Access the top of the construction stack, mutably.
    pub fn construction_mut(&mut self) -> error::Result<&mut Construction> {
        self.constructions
            .last_mut()
            .ok_or(())
            .map_err(|_| construction_stack_underflow())
    }

    /// Pop and return the top of the construction stack.
    pub fn construction_pop(&mut self) -> error::Result<Construction> {
        self.constructions
            .pop()
            .ok_or(())
            .map_err(|_| construction_stack_underflow())
    }

    /// Insert an instruction into the current construction, honoring both the does_code routing
    /// and the current insertion location.
    pub fn push_instruction(&mut self, instruction: Instruction) -> error::Result<()> {
        let insertion = self.insertion;
        let construction = self.construction_mut()?;

        let code = match &mut construction.does_code {
            Some(does_code) => does_code,
            None => &mut construction.code,
        };

        match insertion {
            InsertionLocation::AtEnd => code.push_back(instruction),
            InsertionLocation::AtTop => code.push_front(instruction),
        }

        Ok(())
    }
}

/// Stack of code constructors.  A new frame is pushed every time a new top level source, (be it a
/// file, a string given to EVALUATE, or the interactive repl line,) starts being compiled.
pub type CodeConstructorList = Vec<CodeConstructor>;

fn construction_stack_underflow() -> error::ScriptError {
    error::ScriptError::new(None, "Construction stack underflow.".to_string(), None)
}

/// Run the interactive read-compile-execute loop against a line oriented reader.  Used both as
/// the top level interactive mode when no script is given on the command line, and re-entrantly by
/// `EVALUATE`/`INCLUDED` to drive a nested source (a string or an included file) through the same
/// incremental machinery.
///
/// Unlike `process_source_from_tokens`, which tokenizes and compiles a whole source in one shot,
/// `repl` keeps a single construction context open across every line read from `reader`. Each
/// line's tokens are appended to that context and drained immediately, which is what lets a
/// `:`-definition span more than one line the way a real Forth console allows, while top level
/// words still execute the moment they're read. `ok ` is printed after every line that completes
/// without error, matching interactive Forth transcripts; a trailing newline is emitted at EOF.
///
/// Errors are reported to standard error and do not stop the loop; a definition left half open by
/// an error is discarded by unwinding the construction stack back down to the outermost frame
/// before the next line is read.
/// Reset whichever stacks a throw's recovery class calls for, following the spec's recovery
/// table: a data/float-stack depth violation (or an outright `ABORT`) clears the data stack;
/// a return-stack depth violation, an undefined word, or a loop nested too deep clears the
/// return stack instead.  Anything else is left alone — the construction-stack unwind above is
/// the only recovery those errors need.
fn reset_stacks_for_error(interpreter: &mut dyn Interpreter, code: Option<ThrowCode>) {
    match code {
        Some(ThrowCode::Abort)
        | Some(ThrowCode::AbortQuote)
        | Some(ThrowCode::StackOverflow(StackId::Data))
        | Some(ThrowCode::StackUnderflow(StackId::Data))
        | Some(ThrowCode::StackOverflow(StackId::Float))
        | Some(ThrowCode::StackUnderflow(StackId::Float)) => {
            while !interpreter.stack().is_empty() {
                let _ = interpreter.pop();
            }
        }

        Some(ThrowCode::QuitCalled)
        | Some(ThrowCode::ReturnStackImbalance)
        | Some(ThrowCode::StackOverflow(StackId::Return))
        | Some(ThrowCode::StackUnderflow(StackId::Return))
        | Some(ThrowCode::UndefinedWord)
        | Some(ThrowCode::LoopDepthExceeded) => {
            interpreter.clear_return_stack();
        }

        _ => {}
    }
}

pub fn repl<R: std::io::BufRead>(
    interpreter: &mut dyn Interpreter,
    reader: &mut R,
    source_name: &str,
) -> error::Result<()> {
    use std::io::Write;

    interpreter.context_new(TokenList::new());
    interpreter.context_mut().construction_new();

    let mut line = String::new();

    let result: error::Result<()> = loop {
        line.clear();

        let bytes_read = match reader.read_line(&mut line) {
            Ok(count) => count,
            Err(io_error) => break Err(io_error.into()),
        };

        if bytes_read == 0 {
            println!();
            break Ok(());
        }

        let tokens = match crate::lang::tokenizing::tokenize_from_source(source_name, &line) {
            Ok(tokens) => tokens,
            Err(script_error) => {
                eprintln!("{}", script_error);
                continue;
            }
        };

        interpreter.context_mut().append_tokens(tokens);

        match compile_remaining_tokens(interpreter) {
            Ok(()) => {
                print!("ok ");
                let _ = std::io::stdout().flush();
            }

            Err(script_error) => {
                // A half finished definition would otherwise hold the construction stack open
                // forever; unwind it so the next line starts clean in interpret state.
                while interpreter.context().depth() > 1 {
                    if interpreter.context_mut().construction_pop().is_err() {
                        break;
                    }
                }

                reset_stacks_for_error(interpreter, script_error.code());

                eprintln!("{}", script_error);
            }
        }
    };

    let _ = interpreter.context_mut().construction_pop();
    interpreter.context_drop()?;

    result
}

/// Compile and execute every token in the given list against the interpreter.  This is the
/// outermost level of the outer interpreter: it drives the interleaved compile/execute loop used
/// for whole files, `EVALUATE`d strings, and the interactive repl.
pub fn process_source_from_tokens(
    tokens: TokenList,
    interpreter: &mut dyn Interpreter,
) -> error::Result<()> {
    interpreter.context_new(tokens);
    interpreter.context_mut().construction_new();

    let compile_result = compile_remaining_tokens(interpreter);

    let construction = interpreter.context_mut().construction_pop();
    interpreter.context_drop()?;

    compile_result?;

    let mut construction = construction?;
    construction.resolve_jumps();

    interpreter.execute_code("<script>", &construction.code)
}

fn compile_remaining_tokens(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    loop {
        crate::runtime::signals::check(interpreter)?;

        let next = interpreter.context_mut().next_token();

        let token = match next {
            Some(token) => token,
            None => break,
        };

        process_token(interpreter, token)?;
    }

    Ok(())
}

/// True when the construction stack holds only the outermost, top level script construction, (no
/// `:`-definition is currently open,) meaning we are in Forth's interpret state rather than
/// compile state.  In interpret state, ordinary words run the moment they're read instead of
/// being compiled into a deferred code block; this is what lets a word like CREATE read the very
/// next token out of the input stream as its own name argument, the way `: CONSTANT CREATE , DOES>
/// @ ;` expects.
fn interpreting(interpreter: &mut dyn Interpreter) -> bool {
    interpreter.context().depth() <= 1
}

/// Compile (or immediately execute, for immediate words) a single token.  Used both by the main
/// compile loop and by immediate words, (like `[if]` or DO,) that need to consume and compile
/// tokens themselves as part of their own execution.
pub fn process_token(interpreter: &mut dyn Interpreter, token: Token) -> error::Result<()> {
    match token {
        Token::Number(location, number) => {
            if interpreting(interpreter) {
                interpreter.push(number.to_value())?;
                Ok(())
            } else {
                interpreter
                    .insert_user_instruction(Some(location), Op::PushConstantValue(number.to_value()))
            }
        }

        Token::String(location, text) => {
            if interpreting(interpreter) {
                interpreter.push(Value::String(text))?;
                Ok(())
            } else {
                interpreter.insert_user_instruction(
                    Some(location),
                    Op::PushConstantValue(Value::String(text)),
                )
            }
        }

        Token::Word(location, word) => compile_word(interpreter, &location, &word),
    }
}

fn compile_word(
    interpreter: &mut dyn Interpreter,
    location: &SourceLocation,
    word: &str,
) -> error::Result<()> {
    if let Some(word_info) = interpreter.find_word(word) {
        let word_info = word_info.clone();

        // A compile-only word, (IF/THEN/DO/LOOP and the like,) manipulates the construction
        // stack directly and has no sensible meaning outside of a definition.  Interpreting one
        // directly, rather than as part of compiling a definition, is the Forth-2012 ambiguous
        // condition this guards against.
        if word_info.compile_only && interpreting(interpreter) {
            return script_error_with_code_str(
                interpreter,
                ThrowCode::CompileOnlyWordInterpreted,
                &format!("Word '{}' is compile-only and can't be used outside a definition.", word),
            );
        }

        return match word_info.runtime {
            WordRuntime::Immediate => interpreter.execute_word(location, &word_info),

            WordRuntime::Normal => {
                if interpreting(interpreter) {
                    interpreter.execute_word(location, &word_info)
                } else {
                    interpreter.insert_user_instruction(
                        Some(location.clone()),
                        Op::Execute(Value::Int(word_info.handler_index as i64)),
                    )
                }
            }
        };
    }

    if let Some(number) = parse_number(word, interpreter.radix()) {
        return if interpreting(interpreter) {
            interpreter.push(number.to_value())?;
            Ok(())
        } else {
            interpreter.insert_user_instruction(
                Some(location.clone()),
                Op::PushConstantValue(number.to_value()),
            )
        };
    }

    script_error_with_code_str(
        interpreter,
        ThrowCode::UndefinedWord,
        &format!("Word '{}' is not defined.", word),
    )
}
