//! Hardware interaction modules
//!
//! Contains the sensor/valve traits and their sysfs GPIO implementations.

mod gpio;
mod hcsr04;
mod traits;

pub use gpio::{init_platform, resolve_pin, GpioValve};
pub use hcsr04::{measurement_from_pulse, RangeSensor};
pub use traits::{ActuatorError, SensorError, SensorPort, ValveActuator};

#[cfg(test)]
pub use traits::{MockSensorPort, MockValveActuator};
