
use std::{ error::Error,
           process::Termination,
           fmt::{ self, Debug, Display, Formatter }, process::ExitCode };
use crate::{ runtime::interpreter::CallStack,
             lang::source_buffer::SourceLocation };

use super::interpreter::Interpreter;



pub type Result<T> = std::result::Result<T, ScriptError>;



/// Which of the interpreter's stacks a stack-depth related throw refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum StackId
{
    /// The main data stack.
    Data,

    /// The return stack used to hold loop control parameters and DO/LOOP indices.
    Return,

    /// The optional floating point stack.
    Float,
}

impl Display for StackId
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match self
        {
            StackId::Data   => write!(f, "data"),
            StackId::Return => write!(f, "return"),
            StackId::Float  => write!(f, "float"),
        }
    }
}


/// The Forth-2012 style throw code taxonomy.  Every ScriptError raised by a failure that the
/// standard assigns a meaning to should carry the matching variant here so that CATCH/THROW can
/// round trip the numeric code, not just the text of the message.
///
/// Custom(n) is used for user level `n THROW` calls that don't correspond to one of the standard
/// ambiguous conditions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ThrowCode
{
    Abort,
    AbortQuote,
    StackOverflow(StackId),
    StackUnderflow(StackId),
    UndefinedWord,
    CompileOnlyWordInterpreted,
    InvalidForthVocabulary,
    AddressAlignmentException,
    InvalidNumericArgument,
    ReturnStackImbalance,
    LoopParametersUnavailable,
    InvalidRecursion,
    UserInterrupt,
    CompilerNestingError,
    ControlStructureMismatch,
    InvalidName,
    DefinitionNameTooLong,
    WriteToReadOnlyLocation,
    UnsupportedOperation,
    ControlFlowStackOverflow,
    InvalidInputSource,
    BlockReadWriteException,
    InvalidBlockNumber,
    InvalidFilePosition,
    FileIoException,
    NonExistentFile,
    UnexpectedEndOfFile,
    InvalidBaseForFloatConversion,
    LoopDepthExceeded,
    InvalidRecordOrBlockOffset,
    DivideByZero,
    ResultOutOfRange,
    FloatingPointDivideByZero,
    FloatingPointOutOfRange,
    FloatingPointStackUnbalanced,
    FloatingPointInvalidArgument,
    DataSpaceAllocateFailure,
    DataSpaceResizeFailure,
    DoesNotExist,
    QuitCalled,

    /// `>BODY`/`DOES>` used against a word that was never built by `CREATE`.
    NotCreated,

    /// A user supplied throw code that does not map to one of the above, e.g. `-99 throw`.
    Custom(i32),
}

impl ThrowCode
{
    /// The numeric code as it would appear on the stack after a THROW, following the negative
    /// number ranges reserved by the Forth-2012 standard for ambiguous conditions.
    pub fn code(&self) -> i32
    {
        match self
        {
            ThrowCode::Abort                          => -1,
            ThrowCode::AbortQuote                      => -2,
            ThrowCode::StackOverflow(StackId::Data)    => -3,
            ThrowCode::StackUnderflow(StackId::Data)   => -4,
            ThrowCode::StackOverflow(StackId::Return)  => -5,
            ThrowCode::StackUnderflow(StackId::Return) => -6,
            ThrowCode::DoesNotExist                    => -9,
            ThrowCode::ReturnStackImbalance            => -10,
            ThrowCode::LoopParametersUnavailable        => -11,
            ThrowCode::InvalidNumericArgument          => -12,
            ThrowCode::UndefinedWord                   => -13,
            ThrowCode::CompileOnlyWordInterpreted       => -14,
            ThrowCode::InvalidForthVocabulary           => -15,
            ThrowCode::AddressAlignmentException       => -23,
            ThrowCode::InvalidName                     => -24,
            ThrowCode::WriteToReadOnlyLocation          => -27,
            ThrowCode::UnsupportedOperation             => -21,
            ThrowCode::CompilerNestingError             => -29,
            ThrowCode::ControlStructureMismatch         => -30,
            ThrowCode::InvalidBaseForFloatConversion   => -40,
            ThrowCode::LoopDepthExceeded                => -32,
            ThrowCode::DivideByZero                     => -10,
            ThrowCode::ResultOutOfRange                 => -11,
            ThrowCode::FloatingPointDivideByZero        => -42,
            ThrowCode::FloatingPointOutOfRange          => -43,
            ThrowCode::FloatingPointStackUnbalanced     => -45,
            ThrowCode::FloatingPointInvalidArgument     => -46,
            ThrowCode::StackOverflow(StackId::Float)    => -44,
            ThrowCode::StackUnderflow(StackId::Float)   => -45,
            ThrowCode::DataSpaceAllocateFailure          => -59,
            ThrowCode::DataSpaceResizeFailure            => -59,
            ThrowCode::ControlFlowStackOverflow         => -3,
            ThrowCode::InvalidInputSource                => -55,
            ThrowCode::BlockReadWriteException          => -35,
            ThrowCode::InvalidBlockNumber                => -35,
            ThrowCode::InvalidFilePosition               => -51,
            ThrowCode::FileIoException                   => -152,
            ThrowCode::NonExistentFile                   => -38,
            ThrowCode::UnexpectedEndOfFile                => -52,
            ThrowCode::InvalidRecordOrBlockOffset        => -61,
            ThrowCode::UserInterrupt                     => -28,
            ThrowCode::InvalidRecursion                  => -37,
            ThrowCode::DefinitionNameTooLong              => -19,
            ThrowCode::QuitCalled                         => -56,
            ThrowCode::NotCreated                         => -9,
            ThrowCode::Custom(code)                       => *code,
        }
    }

    /// Map a raw Forth-2012 throw code back to the variant that reports it, for `n THROW`.  Falls
    /// back to `Custom(n)` for anything outside the standard's reserved ranges.  A few standard
    /// codes are shared by more than one ambiguous condition; those resolve to whichever variant
    /// this interpreter raises most often under that code.
    pub fn from_code(code: i32) -> ThrowCode
    {
        match code
        {
            -1  => ThrowCode::Abort,
            -2  => ThrowCode::AbortQuote,
            -3  => ThrowCode::StackOverflow(StackId::Data),
            -4  => ThrowCode::StackUnderflow(StackId::Data),
            -5  => ThrowCode::StackOverflow(StackId::Return),
            -6  => ThrowCode::StackUnderflow(StackId::Return),
            -9  => ThrowCode::DoesNotExist,
            -10 => ThrowCode::ReturnStackImbalance,
            -11 => ThrowCode::LoopParametersUnavailable,
            -12 => ThrowCode::InvalidNumericArgument,
            -13 => ThrowCode::UndefinedWord,
            -14 => ThrowCode::CompileOnlyWordInterpreted,
            -15 => ThrowCode::InvalidForthVocabulary,
            -19 => ThrowCode::DefinitionNameTooLong,
            -21 => ThrowCode::UnsupportedOperation,
            -23 => ThrowCode::AddressAlignmentException,
            -24 => ThrowCode::InvalidName,
            -27 => ThrowCode::WriteToReadOnlyLocation,
            -28 => ThrowCode::UserInterrupt,
            -29 => ThrowCode::CompilerNestingError,
            -30 => ThrowCode::ControlStructureMismatch,
            -32 => ThrowCode::LoopDepthExceeded,
            -35 => ThrowCode::BlockReadWriteException,
            -37 => ThrowCode::InvalidRecursion,
            -38 => ThrowCode::NonExistentFile,
            -40 => ThrowCode::InvalidBaseForFloatConversion,
            -42 => ThrowCode::FloatingPointDivideByZero,
            -43 => ThrowCode::FloatingPointOutOfRange,
            -44 => ThrowCode::StackOverflow(StackId::Float),
            -45 => ThrowCode::StackUnderflow(StackId::Float),
            -46 => ThrowCode::FloatingPointInvalidArgument,
            -51 => ThrowCode::InvalidFilePosition,
            -52 => ThrowCode::UnexpectedEndOfFile,
            -55 => ThrowCode::InvalidInputSource,
            -56 => ThrowCode::QuitCalled,
            -59 => ThrowCode::DataSpaceAllocateFailure,
            -61 => ThrowCode::InvalidRecordOrBlockOffset,
            -152 => ThrowCode::FileIoException,
            other => ThrowCode::Custom(other),
        }
    }
}

impl Display for ThrowCode
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{}", self.code())
    }
}


/// Any error that occurs during the execution of a Strange Forth script.
#[derive(Clone)]
pub struct ScriptError
{
    /// The location in the source code the error occurred, if available.
    location: Option<SourceLocation>,

    /// The description of the error.
    error: String,

    /// The script's call stack at the time of the error, if available.
    call_stack: Option<CallStack>,

    /// The Forth-2012 throw code that classifies this error, if known.  Errors raised from plain
    /// Rust failure paths (I/O, internal invariants) may leave this as None.
    code: Option<ThrowCode>
}


impl Error for ScriptError
{
}


/// When returned from main, convert the error result to an operating system exit code.
impl Termination for ScriptError
{
    /// Because this type represents an error, the exit code is always FAILURE.
    fn report(self) -> ExitCode
    {
        eprintln!("Error: {}", self);
        ExitCode::FAILURE
    }
}


/// Pretty print the ScriptError for debugging the error that occurred within the Strange Forth
/// script.
impl Display for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match &self.location
        {
            Some(location) => write!(f, "{}: {}", location, self.error)?,
            None => write!(f, "{}", self.error)?
        }

        if let Some(call_stack) = &self.call_stack
        {
            write!(f, "\n\nCall stack\n")?;

            for item in call_stack.iter().rev()
            {
                writeln!(f, "  {}", item)?;
            }
        }

        Ok(())
    }
}


/// Pretty print the ScriptError for debugging the error that occurred within the Strange Forth
/// script.
impl Debug for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{}", self)
    }
}


impl ScriptError
{
    /// Create a new ScriptError.
    pub fn new(location: Option<SourceLocation>,
               error: String,
               call_stack: Option<CallStack>) -> ScriptError
    {
        ScriptError
            {
                location,
                error,
                call_stack,
                code: None
            }
    }

    /// Create a new Script Error and wrap it in a Result::Err.
    pub fn new_as_result<T>(location: Option<SourceLocation>,
                            error: String,
                            call_stack: Option<CallStack>) -> Result<T>
    {
        Err(ScriptError::new(location, error, call_stack))
    }

    /// Create a new ScriptError tagged with a specific Forth-2012 throw code.
    pub fn new_with_code(location: Option<SourceLocation>,
                         error: String,
                         call_stack: Option<CallStack>,
                         code: ThrowCode) -> ScriptError
    {
        let mut new_error = ScriptError::new(location, error, call_stack);
        new_error.code = Some(code);
        new_error
    }

    /// Create a new ScriptError tagged with a throw code and wrap it in a Result::Err.
    pub fn new_with_code_as_result<T>(location: Option<SourceLocation>,
                                      error: String,
                                      call_stack: Option<CallStack>,
                                      code: ThrowCode) -> Result<T>
    {
        Err(ScriptError::new_with_code(location, error, call_stack, code))
    }

    /// If available, the location in the source code the error occurred.
    pub fn location(&self) -> &Option<SourceLocation>
    {
        &self.location
    }

    /// The description of the error.
    pub fn error(&self) -> &String
    {
        &self.error
    }

    /// If available, the script's call stack at the time of the error.
    pub fn call_stack(&self) -> &Option<CallStack>
    {
        &self.call_stack
    }

    /// The Forth-2012 throw code classifying this error, if one was attached when the error was
    /// raised.
    pub fn code(&self) -> Option<ThrowCode>
    {
        self.code
    }
}


/// Allow for the conversion of a std::io::Error into a ScriptError.
impl From<std::io::Error> for ScriptError
{
    fn from(error: std::io::Error) -> ScriptError
    {
        ScriptError::new(None, format!("I/O error: {}", error), None)
    }
}



/// A convenience function for creating a ScriptError and wrapping in in a Result::Err using the
/// interpreter's current location and call stack.
pub fn script_error<T>(interpreter: &dyn Interpreter, message: String) -> Result<T>
{
    let location = interpreter.current_location().clone();
    let call_stack = interpreter.call_stack().clone();

    ScriptError::new_as_result(location, message, Some(call_stack))
}



pub fn script_error_str<T>(interpreter: &dyn Interpreter, message: &str) -> Result<T>
{
    script_error(interpreter, message.to_string())
}



/// Like script_error, but tags the resulting ScriptError with a specific Forth-2012 throw code so
/// that CATCH/THROW can recover the numeric code and not just the message text.
pub fn script_error_with_code<T>(interpreter: &dyn Interpreter,
                                 code: ThrowCode,
                                 message: String) -> Result<T>
{
    let location = interpreter.current_location().clone();
    let call_stack = interpreter.call_stack().clone();

    ScriptError::new_with_code_as_result(location, message, Some(call_stack), code)
}



pub fn script_error_with_code_str<T>(interpreter: &dyn Interpreter,
                                     code: ThrowCode,
                                     message: &str) -> Result<T>
{
    script_error_with_code(interpreter, code, message.to_string())
}
