//! Rolling measurement history shared between the sampler and its readers

use std::collections::VecDeque;

use parking_lot::RwLock;
use tracing::debug;

use crate::constants::history::CAPACITY;
use crate::data::{Measurement, Snapshot};
use crate::error::WaterLevelError;

/// Fixed-capacity FIFO of the most recent readings, most recent last
///
/// Always holds exactly `CAPACITY` slots; it starts filled with `None` and
/// every append evicts the oldest slot. Readers get a copy and never hold the
/// lock while working on it.
#[derive(Debug)]
pub struct HistoryBuffer {
    slots: RwLock<VecDeque<Option<Measurement>>>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        let mut slots = VecDeque::with_capacity(CAPACITY);
        slots.resize(CAPACITY, None);
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Evict the oldest slot and push `entry` as the newest
    pub fn append(&self, entry: Option<Measurement>) {
        let mut slots = self.slots.write();
        slots.pop_front();
        slots.push_back(entry);
    }

    /// Record the outcome of one sensor read; errors become a missed slot
    pub fn record(&self, reading: Result<Measurement, WaterLevelError>) {
        match reading {
            Ok(m) => self.append(Some(m)),
            Err(e) => {
                debug!(error = %e, "Sensor read failed, recording missed sample");
                self.append(None);
            }
        }
    }

    /// Independent copy of the window, oldest first
    pub fn snapshot(&self) -> Snapshot {
        self.slots.read().iter().copied().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
