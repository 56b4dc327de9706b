//! HC-SR04 ultrasonic range sensor on two sysfs GPIO pins
//!
//! A 10 µs pulse on the trigger pin starts a measurement; the sensor then
//! holds the echo pin high for as long as the sound took to return.
//! Distance = (echo duration × speed of sound) / 2.

use std::thread;
use std::time::{Duration, Instant};

use sysfs_gpio::{Direction, Pin};
use tracing::info;

use crate::constants::hcsr04;
use crate::data::Measurement;
use crate::error::{Result, WaterLevelError};
use crate::hw::gpio::{export_pin, resolve_pin};
use crate::hw::traits::{SensorError, SensorPort};

/// Convert an echo pulse width to a measurement
///
/// Pulses outside the sensor's rated range still produce a reading, but it is
/// flagged untrustworthy.
pub fn measurement_from_pulse(pulse: Duration) -> Measurement {
    let distance_cm = pulse.as_secs_f32() * hcsr04::SPEED_OF_SOUND_CM_PER_S / 2.0;
    let trustworthy = (hcsr04::MIN_RANGE_CM..=hcsr04::MAX_RANGE_CM).contains(&distance_cm);
    Measurement::new(distance_cm, trustworthy)
}

#[derive(Debug)]
pub struct RangeSensor {
    trigger: Pin,
    echo: Pin,
}

impl RangeSensor {
    /// Resolve and configure the echo (input) and trigger (output, low) pins
    pub fn configure(echo_name: &str, trigger_name: &str) -> Result<Self> {
        let echo = Pin::new(resolve_pin(echo_name)?);
        let trigger = Pin::new(resolve_pin(trigger_name)?);

        export_pin(&trigger)
            .and_then(|_| trigger.set_direction(Direction::Low))
            .map_err(|e| {
                WaterLevelError::SensorConfig(format!("trigger pin {}: {}", trigger_name, e))
            })?;

        export_pin(&echo)
            .and_then(|_| echo.set_direction(Direction::In))
            .map_err(|e| WaterLevelError::SensorConfig(format!("echo pin {}: {}", echo_name, e)))?;

        info!(
            echo = echo.get_pin_num(),
            trigger = trigger.get_pin_num(),
            "Range sensor configured"
        );
        Ok(Self { trigger, echo })
    }

    /// Busy-poll the echo pin until it reads `level`, returning when it did
    fn wait_for_echo(&self, level: u8, timeout: Duration) -> Result<Option<Instant>> {
        let started = Instant::now();
        loop {
            let value = self
                .echo
                .get_value()
                .map_err(|e| WaterLevelError::gpio(self.echo.get_pin_num(), e))?;
            if value == level {
                return Ok(Some(Instant::now()));
            }
            if started.elapsed() > timeout {
                return Ok(None);
            }
            thread::sleep(hcsr04::POLL_INTERVAL);
        }
    }

    fn pulse_trigger(&self) -> Result<()> {
        let pin = self.trigger.get_pin_num();
        self.trigger
            .set_value(1)
            .map_err(|e| WaterLevelError::gpio(pin, e))?;
        thread::sleep(hcsr04::TRIGGER_PULSE);
        self.trigger
            .set_value(0)
            .map_err(|e| WaterLevelError::gpio(pin, e))
    }
}

impl SensorPort for RangeSensor {
    fn measure_once(&self) -> std::result::Result<Measurement, SensorError> {
        self.pulse_trigger()?;

        let rise = self
            .wait_for_echo(1, hcsr04::ECHO_START_TIMEOUT)?
            .ok_or(WaterLevelError::EchoTimeout {
                waited_ms: hcsr04::ECHO_START_TIMEOUT.as_millis() as u64,
            })?;

        let fall = self
            .wait_for_echo(0, hcsr04::ECHO_END_TIMEOUT)?
            .ok_or(WaterLevelError::EchoStuck {
                waited_ms: hcsr04::ECHO_END_TIMEOUT.as_millis() as u64,
            })?;

        Ok(measurement_from_pulse(fall.duration_since(rise)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_to_distance() {
        // 583 µs round trip is almost exactly 10 cm
        let m = measurement_from_pulse(Duration::from_micros(583));
        assert!((m.distance_cm - 10.0).abs() < 0.01);
        assert!(m.trustworthy);
    }

    #[test]
    fn test_out_of_range_pulses_are_untrustworthy() {
        assert!(!measurement_from_pulse(Duration::from_micros(50)).trustworthy);
        assert!(!measurement_from_pulse(Duration::from_millis(30)).trustworthy);
    }

    #[test]
    fn test_unknown_pins_fail_before_touching_hardware() {
        let err = RangeSensor::configure("echo?", "16").unwrap_err();
        assert!(matches!(err, WaterLevelError::UnknownPin(_)));
    }
}
