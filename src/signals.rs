//! Interrupt handling.
//!
//! The handler does nothing but raise a flag and note which signal it
//! was.  Workers look at the flag when they are handed the turn, which
//! is the only point where the output is between rows, and the pool
//! looks once more after the last row; either way the terminal is
//! reset on the way out just as it would be after a normal run.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use nix;
use nix::libc::{c_int, SIGINT};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static CAUGHT: AtomicI32 = AtomicI32::new(0);

extern "C" fn raise_flag(signo: c_int) {
    CAUGHT.store(signo, Ordering::SeqCst);
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT and SIGTERM to the interrupt flag and hand back the
/// flag for the pool to watch.  The handler is one-shot: a second
/// interrupt gets the default behaviour and kills the process outright.
pub fn install() -> nix::Result<&'static AtomicBool> {
    let action = SigAction::new(
        SigHandler::Handler(raise_flag),
        SaFlags::SA_RESTART | SaFlags::SA_RESETHAND,
        SigSet::empty(),
    );
    for &signal in &[Signal::SIGINT, Signal::SIGTERM] {
        // The handler only touches atomics, which is async-signal-safe.
        unsafe {
            sigaction(signal, &action)?;
        }
    }
    Ok(&INTERRUPTED)
}

/// The status to exit with once an interrupted run has cleaned up:
/// 128 plus the number of the signal that arrived, as a shell would
/// report it.  Assumes SIGINT if nothing has been caught.
pub fn exit_status() -> i32 {
    match CAUGHT.load(Ordering::SeqCst) {
        0 => 128 + SIGINT,
        signo => 128 + signo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::libc::SIGTERM;

    #[test]
    fn exit_status_follows_the_last_signal() {
        raise_flag(SIGTERM);
        assert!(INTERRUPTED.load(Ordering::SeqCst));
        assert_eq!(exit_status(), 143);
        raise_flag(SIGINT);
        assert_eq!(exit_status(), 130);
    }
}
