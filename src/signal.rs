//! Interrupt handling around vault writes.
//!
//! Outside a write, Ctrl-C / SIGTERM exits the process straight away with
//! status 130.  While a [`CriticalSection`] is held the handler only records
//! the interrupt; the write notices it at its next [`checkpoint`], unwinds
//! through its normal rollback, and the CLI exits afterwards.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Once;

use crate::errors::{WpStackError, Result};

/// Exit status used when the process stops because of an interrupt.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static CRITICAL_DEPTH: AtomicUsize = AtomicUsize::new(0);
static INSTALL: Once = Once::new();

/// Install the process-wide handler.  Safe to call more than once.
pub fn install_handler() -> Result<()> {
    let mut outcome = Ok(());
    INSTALL.call_once(|| {
        outcome = ctrlc::set_handler(on_interrupt).map_err(|e| {
            WpStackError::CommandFailed(format!("failed to install interrupt handler: {e}"))
        });
    });
    outcome
}

fn on_interrupt() {
    request_stop();
    if CRITICAL_DEPTH.load(Ordering::SeqCst) == 0 {
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
    tracing::warn!("interrupt received, finishing vault cleanup before exit");
}

/// Record an interrupt as if a signal had arrived, without exiting.
pub fn request_stop() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Returns `true` if an interrupt has been received.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Fail with `Interrupted` if an interrupt is pending.
///
/// Called between the steps of a vault write so the write can abort
/// through its rollback path.
pub fn checkpoint() -> Result<()> {
    if interrupted() {
        Err(WpStackError::Interrupted)
    } else {
        Ok(())
    }
}

/// Marks a region during which an interrupt must not kill the process.
pub struct CriticalSection {
    _private: (),
}

impl CriticalSection {
    pub fn enter() -> Self {
        CRITICAL_DEPTH.fetch_add(1, Ordering::SeqCst);
        Self { _private: () }
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        CRITICAL_DEPTH.fetch_sub(1, Ordering::SeqCst);
    }
}
