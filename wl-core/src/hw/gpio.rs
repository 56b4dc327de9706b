//! Linux sysfs GPIO access
//!
//! Platform check, pin name resolution and the solenoid valve output.
//!
//! # Pin Names
//!
//! Pins are identified by their kernel GPIO number. The names `"13"`,
//! `"GPIO13"` and `"BCM13"` (any case) all resolve to GPIO 13.

use std::path::Path;
use std::thread;

use sysfs_gpio::{Direction, Pin};
use tracing::{debug, info};

use crate::constants::{paths, pins, timing};
use crate::error::{Result, WaterLevelError};
use crate::hw::traits::{ActuatorError, ValveActuator};

/// Check that the sysfs GPIO interface is present and usable
pub fn init_platform() -> Result<()> {
    let export = Path::new(paths::SYSFS_GPIO_BASE).join("export");
    if !export.exists() {
        return Err(WaterLevelError::PlatformInit(format!(
            "{} not found (is the sysfs GPIO interface enabled?)",
            export.display()
        )));
    }
    debug!(base = paths::SYSFS_GPIO_BASE, "sysfs GPIO interface present");
    Ok(())
}

/// Resolve a pin identifier to a kernel GPIO number
pub fn resolve_pin(name: &str) -> Result<u64> {
    let trimmed = name.trim();
    let upper = trimmed.to_ascii_uppercase();
    let digits = pins::NAME_PREFIXES
        .iter()
        .find_map(|prefix| upper.strip_prefix(prefix))
        .unwrap_or(&upper);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(WaterLevelError::UnknownPin(name.to_string()));
    }

    digits
        .parse::<u64>()
        .map_err(|_| WaterLevelError::UnknownPin(name.to_string()))
}

/// Export a pin if needed and give udev a moment to fix permissions
pub(crate) fn export_pin(pin: &Pin) -> sysfs_gpio::Result<()> {
    if !pin.is_exported() {
        pin.export()?;
        thread::sleep(timing::GPIO_EXPORT_SETTLE);
    }
    Ok(())
}

/// Solenoid valve on a GPIO output; high opens, low closes
#[derive(Debug)]
pub struct GpioValve {
    pin: Pin,
}

impl GpioValve {
    /// Export the named pin and configure it as an output driven low (closed)
    pub fn configure(name: &str) -> Result<Self> {
        let number = resolve_pin(name)?;
        let pin = Pin::new(number);

        export_pin(&pin)
            .and_then(|_| pin.set_direction(Direction::Low))
            .map_err(|e| WaterLevelError::ValveConfig {
                pin: name.to_string(),
                reason: e.to_string(),
            })?;

        info!(pin = number, "Valve output configured (closed)");
        Ok(Self { pin })
    }

    pub fn pin_number(&self) -> u64 {
        self.pin.get_pin_num()
    }
}

impl ValveActuator for GpioValve {
    fn set_open(&self, open: bool) -> std::result::Result<(), ActuatorError> {
        self.pin
            .set_value(u8::from(open))
            .map_err(|e| WaterLevelError::ValveWrite {
                pin: self.pin.get_pin_num(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_number() {
        assert_eq!(resolve_pin("5").unwrap(), 5);
        assert_eq!(resolve_pin(" 13 ").unwrap(), 13);
    }

    #[test]
    fn test_resolve_prefixed_names() {
        assert_eq!(resolve_pin("GPIO16").unwrap(), 16);
        assert_eq!(resolve_pin("gpio16").unwrap(), 16);
        assert_eq!(resolve_pin("BCM6").unwrap(), 6);
    }

    #[test]
    fn test_resolve_rejects_unknown_names() {
        for name in ["", "GPIO", "P1_7", "-3", "GPIO1.5", "99999999999999999999999"] {
            match resolve_pin(name) {
                Err(WaterLevelError::UnknownPin(n)) => assert_eq!(n, name),
                other => panic!("{:?} resolved to {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_unknown_pin_exit_code() {
        let err = GpioValve::configure("not-a-pin").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::UNKNOWN_PIN);
    }
}
