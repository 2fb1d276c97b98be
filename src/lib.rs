// The code makes use of some of the newer features of Rust.  These features are not yet stable and
// require the nightly version of Rust to compile.  Because of this some of the code may not compile
// in a future version of Rust.  The features used are:
#![feature(fn_traits)]
#![feature(unboxed_closures)]

/// Module for the managing source code and the generation of byte code.
#[macro_use]
pub mod lang;

/// Module for the runtime and the data structures used by the interpreter.  As well as the
/// interpreter itself.
#[macro_use]
pub mod runtime;
