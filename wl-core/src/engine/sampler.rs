//! Sensor sampling into the shared history
//!
//! One call to [`Sampler::sample_once`] is one sampler tick. The caller owns
//! the schedule; the sampler only guarantees that every tick leaves exactly
//! one new slot in the history, a reading or a gap.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::constants::history::FAILURE_LOG_EVERY;
use crate::engine::history::HistoryBuffer;
use crate::hw::SensorPort;

pub struct Sampler {
    sensor: Arc<dyn SensorPort>,
    history: Arc<HistoryBuffer>,
    consecutive_failures: AtomicU32,
}

impl Sampler {
    pub fn new(sensor: Arc<dyn SensorPort>, history: Arc<HistoryBuffer>) -> Self {
        Self {
            sensor,
            history,
            consecutive_failures: AtomicU32::new(0),
        }
    }

    /// Take one reading and append it (or a gap) to the history
    ///
    /// Blocks for as long as the sensor takes. Returns whether a reading was
    /// recorded.
    pub fn sample_once(&self) -> bool {
        let reading = self.sensor.measure_once();

        match &reading {
            Ok(m) => {
                let failures = self.consecutive_failures.swap(0, Ordering::Relaxed);
                if failures > 0 {
                    info!(failures, "SAMPLE: sensor recovered");
                }
                debug!(
                    distance_cm = m.distance_cm,
                    trustworthy = m.trustworthy,
                    "SAMPLE: reading"
                );
            }
            Err(e) => {
                let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
                if failures == 1 || failures % FAILURE_LOG_EVERY == 0 {
                    warn!(error = %e, failures, "SAMPLE: sensor read failed");
                }
            }
        }

        let recorded = reading.is_ok();
        self.history.record(reading);
        recorded
    }

    pub fn history(&self) -> &Arc<HistoryBuffer> {
        &self.history
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }
}
