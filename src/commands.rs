//! Operator commands
//!
//! Both commands talk to the hardware only through the `wl_core` traits, so
//! the reporting logic runs against fakes in tests.

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info};
use wl_core::{
    average_distance, init_platform, Classification, Config, GpioValve, RangeSensor, SensorPort,
    Snapshot, ValveActuator,
};

/// Configure the valve pin (which drives it low) and write "closed" once more
pub fn close_valve(config: &Config) -> anyhow::Result<()> {
    init_platform().context("initialising GPIO")?;
    let valve = GpioValve::configure(&config.pins.valve).context("configuring valve")?;
    shut(&valve)?;
    info!(pin = valve.pin_number(), "Valve closed");
    Ok(())
}

/// Write "closed" to any valve
pub fn shut(valve: &dyn ValveActuator) -> anyhow::Result<()> {
    valve.set_open(false).context("closing valve")?;
    Ok(())
}

/// Set up the range sensor from the configured pins and run [`sample_distance`]
pub fn distance(config: &Config, samples: u32, out: &mut dyn Write) -> anyhow::Result<Classification> {
    init_platform().context("initialising GPIO")?;
    let sensor = RangeSensor::configure(&config.pins.echo, &config.pins.trigger)
        .context("configuring range sensor")?;
    sample_distance(&sensor, samples, wl_core::constants::timing::SAMPLE_INTERVAL, out)
}

/// Take `samples` readings `spacing` apart, print each, then print the average
///
/// Failed readings are printed and leave a gap, as they do in the daemon's
/// history.
pub fn sample_distance(
    sensor: &dyn SensorPort,
    samples: u32,
    spacing: Duration,
    out: &mut dyn Write,
) -> anyhow::Result<Classification> {
    let mut readings: Snapshot = Vec::with_capacity(samples as usize);

    for i in 0..samples {
        if i > 0 {
            thread::sleep(spacing);
        }
        match sensor.measure_once() {
            Ok(m) => {
                let note = if m.trustworthy { "" } else { " (out of sensor range)" };
                writeln!(out, "reading {:3}: {:7.2} cm{}", i + 1, m.distance_cm, note)?;
                readings.push(Some(m));
            }
            Err(e) => {
                debug!(error = %e, "Reading failed");
                writeln!(out, "reading {:3}: failed: {}", i + 1, e)?;
                readings.push(None);
            }
        }
    }

    let verdict = average_distance(&readings);
    match &verdict {
        Classification::Safe { average_cm } => writeln!(out, "average: {:.2} cm", average_cm)?,
        Classification::Unsafe { reason, .. } => writeln!(out, "average: {}", reason)?,
    }
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use wl_core::{ActuatorError, Measurement, SensorError, WaterLevelError};

    struct ScriptedSensor {
        script: Mutex<VecDeque<Result<Measurement, SensorError>>>,
    }

    impl ScriptedSensor {
        fn new(script: Vec<Result<Measurement, SensorError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    impl SensorPort for ScriptedSensor {
        fn measure_once(&self) -> Result<Measurement, SensorError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(WaterLevelError::EchoTimeout { waited_ms: 50 }))
        }
    }

    #[test]
    fn test_sample_distance_reports_average() {
        let sensor = ScriptedSensor::new(vec![
            Ok(Measurement::trusted(10.0)),
            Ok(Measurement::trusted(12.0)),
            Err(WaterLevelError::EchoStuck { waited_ms: 40 }),
            Ok(Measurement::trusted(350.0)),
            Ok(Measurement::trusted(14.0)),
        ]);

        let mut out = Vec::new();
        let verdict = sample_distance(&sensor, 5, Duration::ZERO, &mut out).unwrap();
        assert_eq!(verdict, Classification::Safe { average_cm: 12.0 });

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("reading   3: failed"));
        assert!(text.ends_with("average: 12.00 cm\n"));
    }

    #[test]
    fn test_sample_distance_unknown_with_few_readings() {
        let sensor = ScriptedSensor::new(vec![
            Ok(Measurement::trusted(10.0)),
            Ok(Measurement::new(450.0, false)),
        ]);

        let mut out = Vec::new();
        let verdict = sample_distance(&sensor, 4, Duration::ZERO, &mut out).unwrap();
        assert!(!verdict.is_safe());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(out of sensor range)"));
        assert!(text.ends_with("average: distance unknown\n"));
    }

    struct FailingValve;

    impl ValveActuator for FailingValve {
        fn set_open(&self, _open: bool) -> Result<(), ActuatorError> {
            Err(WaterLevelError::ValveWrite {
                pin: 5,
                reason: "EBUSY".into(),
            })
        }
    }

    #[test]
    fn test_shut_propagates_write_error() {
        let err = shut(&FailingValve).unwrap_err();
        assert!(err.to_string().contains("closing valve"));
    }
}
