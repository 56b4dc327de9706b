//! Unified error handling for Waterlevel
//!
//! This crate provides a single error type used across all Waterlevel components.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.

use std::io;
use std::path::PathBuf;

/// Result type alias using WaterLevelError
pub type Result<T> = std::result::Result<T, WaterLevelError>;

/// Process exit codes for fatal startup errors
pub mod exit_code {
    /// GPIO platform (sysfs interface) could not be initialised
    pub const PLATFORM_INIT: i32 = 1;
    /// A GPIO identifier did not resolve to a pin
    pub const UNKNOWN_PIN: i32 = 2;
    /// The valve output pin could not be configured
    pub const VALVE_CONFIG: i32 = 3;
    /// The range sensor pins could not be configured
    pub const SENSOR_CONFIG: i32 = 4;
    /// The configuration file or flags were invalid
    pub const INVALID_CONFIG: i32 = 5;
}

/// Unified error type for all Waterlevel operations
#[derive(thiserror::Error, Debug)]
pub enum WaterLevelError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Platform and GPIO Setup Errors (fatal at startup)
    // ============================================================================
    #[error("GPIO platform initialisation failed: {0}")]
    PlatformInit(String),

    #[error("No GPIO pin named: {0}")]
    UnknownPin(String),

    #[error("Could not configure valve output pin {pin}: {reason}")]
    ValveConfig {
        pin: String,
        reason: String,
    },

    #[error("Could not configure range sensor: {0}")]
    SensorConfig(String),

    // ============================================================================
    // Hardware Access Errors
    // ============================================================================
    #[error("GPIO {pin} access failed: {source}")]
    Gpio {
        pin: u64,
        source: sysfs_gpio::Error,
    },

    #[error("No echo received within {waited_ms} ms")]
    EchoTimeout {
        waited_ms: u64,
    },

    #[error("Echo pin stuck high for more than {waited_ms} ms")]
    EchoStuck {
        waited_ms: u64,
    },

    #[error("Failed to drive valve pin {pin}: {reason}")]
    ValveWrite {
        pin: u64,
        reason: String,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },
}

impl WaterLevelError {
    /// Create an invalid configuration error for a named field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a sysfs GPIO error with the pin it happened on
    pub fn gpio(pin: u64, source: sysfs_gpio::Error) -> Self {
        Self::Gpio { pin, source }
    }

    /// Exit code used when this error aborts startup
    ///
    /// Configuration parsing problems share the invalid-config code; anything
    /// unexpected falls back to the platform code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PlatformInit(_) => exit_code::PLATFORM_INIT,
            Self::UnknownPin(_) => exit_code::UNKNOWN_PIN,
            Self::ValveConfig { .. } => exit_code::VALVE_CONFIG,
            Self::SensorConfig(_) => exit_code::SENSOR_CONFIG,
            Self::InvalidConfig { .. }
            | Self::JsonParse(_)
            | Self::FileRead { .. } => exit_code::INVALID_CONFIG,
            _ => exit_code::PLATFORM_INIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_exit_codes_are_distinct() {
        let codes = [
            WaterLevelError::PlatformInit("no sysfs".into()).exit_code(),
            WaterLevelError::UnknownPin("GPIOX".into()).exit_code(),
            WaterLevelError::ValveConfig { pin: "5".into(), reason: "busy".into() }.exit_code(),
            WaterLevelError::SensorConfig("echo".into()).exit_code(),
            WaterLevelError::invalid_config("top_cm", "not finite").exit_code(),
        ];
        assert_eq!(codes, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_runtime_errors_fall_back_to_platform_code() {
        assert_eq!(WaterLevelError::EchoTimeout { waited_ms: 50 }.exit_code(), 1);
        let err = WaterLevelError::ValveWrite { pin: 5, reason: "EIO".into() };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_display_messages() {
        let err = WaterLevelError::UnknownPin("GPIO99X".into());
        assert_eq!(err.to_string(), "No GPIO pin named: GPIO99X");

        let err = WaterLevelError::EchoStuck { waited_ms: 40 };
        assert_eq!(err.to_string(), "Echo pin stuck high for more than 40 ms");
    }
}
