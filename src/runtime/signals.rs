use crate::runtime::{
    error::{self, script_error_with_code_str, ThrowCode},
    interpreter::Interpreter,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// Set from the signal handler, polled cooperatively between tokens/lines.  A signal handler may
/// only safely touch async-signal-safe operations, so it does nothing but flip this flag; the
/// actual `ThrowCode::UserInterrupt` is raised back on the interpreter's own thread the next time
/// `check` is called.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
mod platform {
    /// Signal handler invoked directly by the kernel.  Must stick to async-signal-safe operations
    /// only, (an atomic store qualifies,) so all it does is record that SIGINT happened.
    extern "C" fn handle_sigint(_signal: libc::c_int) {
        super::INTERRUPTED.store(true, super::Ordering::SeqCst);
    }

    /// Install the SIGINT handler for the life of the process.
    pub fn install() {
        unsafe {
            libc::signal(libc::SIGINT, handle_sigint as libc::sighandler_t);
        }
    }
}

#[cfg(windows)]
mod platform {
    use winapi::shared::minwindef::{BOOL, DWORD, TRUE};
    use winapi::um::consoleapi::SetConsoleCtrlHandler;
    use winapi::um::wincon::CTRL_C_EVENT;

    unsafe extern "system" fn handle_ctrl_event(event_type: DWORD) -> BOOL {
        if event_type == CTRL_C_EVENT {
            super::INTERRUPTED.store(true, super::Ordering::SeqCst);
            TRUE
        } else {
            0
        }
    }

    /// Install the Ctrl-C console handler for the life of the process.
    pub fn install() {
        unsafe {
            SetConsoleCtrlHandler(Some(handle_ctrl_event), TRUE);
        }
    }
}

/// Install this process's interrupt handler.  Safe to call more than once; later installs simply
/// replace the earlier one with an identical handler.
pub fn install() {
    platform::install();
}

/// Check whether an interrupt has arrived since the last check, raising `ThrowCode::UserInterrupt`
/// if so.  Called between top level tokens/lines, (the repl's read-compile-execute loop and the
/// non-interactive source-file compile loop,) rather than from inside the signal handler itself.
pub fn check(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if INTERRUPTED.swap(false, Ordering::SeqCst) {
        return script_error_with_code_str(
            interpreter,
            ThrowCode::UserInterrupt,
            "Interrupted.",
        );
    }

    Ok(())
}
