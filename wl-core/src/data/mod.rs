//! Data types and configuration modules
//!
//! Contains the measurement/classification types and the startup configuration.

mod config;
mod types;

pub use config::{Config, PinConfig, ThresholdConfig};
pub use types::{format_history, Classification, Measurement, Snapshot};
