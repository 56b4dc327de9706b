//! Fail-safe valve shutdown
//!
//! The guard owns the only path to the valve. The controller drives the valve
//! through [`ShutdownGuard::drive`]; a termination request goes through
//! [`ShutdownGuard::engage`], which closes the valve and permanently locks the
//! controller out.
//!
//! Ordering: `engage` raises the flag first, then waits (bounded) for any
//! controller write already in flight, then writes "closed". A controller write
//! that starts after the flag is raised is skipped, so the close is always the
//! last write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::constants::timing;
use crate::hw::{ActuatorError, ValveActuator};

pub struct ShutdownGuard {
    valve: Arc<dyn ValveActuator>,
    engaged: AtomicBool,
    /// Held for the duration of each controller write
    write_gate: Mutex<()>,
}

impl ShutdownGuard {
    pub fn new(valve: Arc<dyn ValveActuator>) -> Self {
        Self {
            valve,
            engaged: AtomicBool::new(false),
            write_gate: Mutex::new(()),
        }
    }

    /// Controller-side valve write
    ///
    /// Returns `None` without touching the valve once shutdown has begun.
    pub fn drive(&self, open: bool) -> Option<Result<(), ActuatorError>> {
        let _gate = self.write_gate.lock();
        if self.engaged.load(Ordering::SeqCst) {
            debug!(open, "Shutdown in progress, valve write suppressed");
            return None;
        }
        Some(self.valve.set_open(open))
    }

    /// Close the valve for good
    ///
    /// Returns `true` for the request that performed the close and `false` for
    /// any repeat request. The close is attempted once; its failure is logged
    /// and does not stop shutdown.
    pub fn engage(&self, reason: &str) -> bool {
        if self.engaged.swap(true, Ordering::SeqCst) {
            debug!(reason, "Shutdown already in progress");
            return false;
        }

        warn!(reason, "SHUTDOWN: closing valve");

        let gate = self.write_gate.try_lock_for(timing::SHUTDOWN_GATE_WAIT);
        if gate.is_none() {
            warn!("SHUTDOWN: controller write still in flight, closing anyway");
        }

        match self.valve.set_open(false) {
            Ok(()) => info!("SHUTDOWN: valve closed"),
            Err(e) => error!(error = %e, "SHUTDOWN: failed to close valve"),
        }
        true
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::SeqCst)
    }
}
