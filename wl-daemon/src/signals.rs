//! Termination handling
//!
//! SIGINT, SIGTERM and SIGHUP all end the daemon the same way: valve closed,
//! process exits with status 0.

use std::sync::Arc;

use tracing::info;
use wl_core::ShutdownGuard;

/// Close the valve for a termination request
///
/// Returns the exit status for the request that did the close, `None` for a
/// signal arriving while shutdown is already underway.
pub fn handle_termination(guard: &ShutdownGuard) -> Option<i32> {
    info!("SIGNAL: Received SIGINT/SIGTERM - initiating shutdown");
    if guard.engage("termination signal") {
        info!("SHUTDOWN: Daemon terminated gracefully");
        Some(0)
    } else {
        None
    }
}

/// Register the process-wide handler; must run once, right after the valve exists
pub fn install(guard: Arc<ShutdownGuard>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if let Some(status) = handle_termination(&guard) {
            std::process::exit(status);
        }
    })
}
