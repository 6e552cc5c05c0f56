//! Process-wide shutdown flag
//!
//! SIGINT/SIGTERM set a single atomic flag that the driver, the hash
//! reader, and the analysis loop poll at their checkpoints. The handler
//! body is restricted to one atomic store.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// The process-wide cancellation flag. The rest of the crate takes this as
/// a `&AtomicBool` handle, so tests can substitute a flag of their own.
pub fn flag() -> &'static AtomicBool {
    &SHUTDOWN_REQUESTED
}

/// Install the SIGINT and SIGTERM handlers. Call once in `main`, before the
/// run starts.
pub fn install_signal_handlers() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    unsafe {
        signal::sigaction(Signal::SIGINT, &action).context("Failed to install SIGINT handler")?;
        signal::sigaction(Signal::SIGTERM, &action)
            .context("Failed to install SIGTERM handler")?;
    }

    Ok(())
}

extern "C" fn handle_signal(_signal: nix::libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}
