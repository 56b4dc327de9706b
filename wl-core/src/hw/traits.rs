//! Hardware seams: the range sensor and the valve
//!
//! Everything above this module talks to hardware only through these traits,
//! so the sampling and control logic runs unchanged against test doubles.

#[cfg(test)]
use mockall::automock;

use crate::data::Measurement;
use crate::error::WaterLevelError;

/// Error from a single sensor reading; never fatal to the sampler
pub type SensorError = WaterLevelError;

/// Error from a single valve write; logged, never retried
pub type ActuatorError = WaterLevelError;

/// Something that can take one distance reading
#[cfg_attr(test, automock)]
pub trait SensorPort: Send + Sync {
    /// Take one reading. May block for the duration of the measurement.
    fn measure_once(&self) -> Result<Measurement, SensorError>;
}

/// Something that can open or close the valve
///
/// Writes are idempotent; ordering between writers is the caller's concern
/// (see `ShutdownGuard`).
#[cfg_attr(test, automock)]
pub trait ValveActuator: Send + Sync {
    fn set_open(&self, open: bool) -> Result<(), ActuatorError>;
}
