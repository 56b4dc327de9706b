//! Waterlevel Core Library
//!
//! Keeps a reservoir between two water levels using an ultrasonic range
//! sensor and a solenoid valve.
//!
//! # Features
//!
//! - **Sampling**: Fixed 10-slot rolling history fed by a background sampler
//! - **Filtering**: Outlier rejection and a safety verdict over the history
//! - **Control**: Bang-bang valve control with a hysteresis band
//! - **Fail-safe**: Valve closed on unsafe readings and on shutdown
//! - **Hardware**: HC-SR04 sensor and valve output over Linux sysfs GPIO
//!
//! # Module Structure
//!
//! - `hw/` - Hardware traits and sysfs GPIO implementations
//! - `data/` - Measurement types and configuration
//! - `engine/` - History, filter, sampler, controller, shutdown guard
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wl_core::{Config, Controller, GpioValve, HistoryBuffer, ShutdownGuard};
//!
//! let config = Config::default();
//! let valve = Arc::new(GpioValve::configure(&config.pins.valve).unwrap());
//! let guard = Arc::new(ShutdownGuard::new(valve));
//! let mut controller = Controller::new(config.thresholds, guard);
//!
//! let history = HistoryBuffer::new();
//! controller.tick(&history.snapshot());
//! ```

// Grouped modules
pub mod data;
pub mod engine;
pub mod hw;

// Standalone modules
pub mod constants;
pub mod error;

pub use data::{format_history, Classification, Config, Measurement, PinConfig, Snapshot, ThresholdConfig};
pub use engine::{
    average_distance, partition, safe_to_fill, Controller, Decision, HistoryBuffer, Partition,
    Rule, Sampler, ShutdownGuard,
};
pub use error::{Result, WaterLevelError};
pub use hw::{
    init_platform, measurement_from_pulse, resolve_pin, ActuatorError, GpioValve, RangeSensor,
    SensorError, SensorPort, ValveActuator,
};
