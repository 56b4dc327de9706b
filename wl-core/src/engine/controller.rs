//! Bang-bang valve controller with a hysteresis band
//!
//! Rules are evaluated in a fixed priority order on every tick:
//!
//! 1. unsafe window: close, stop filling
//! 2. average closer than `target_cm` (full enough): close, stop filling
//! 3. already filling: keep the valve open
//! 4. average closer than `fill_cm` (not low enough yet): close
//! 5. average further than `fill_cm`: open, start filling
//! 6. anything else (average exactly `fill_cm`): close
//!
//! Between `target_cm` and `fill_cm` the previous state decides, which keeps
//! the valve from chattering around a single threshold.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use crate::data::{format_history, Classification, Measurement, ThresholdConfig};
use crate::engine::filter::safe_to_fill;
use crate::engine::shutdown::ShutdownGuard;

/// Which rule produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Unsafe,
    TargetReached,
    KeepFilling,
    AboveFillLevel,
    StartFilling,
    Undetermined,
    /// Valve write skipped because the shutdown guard holds the valve closed
    ShutDown,
}

/// Outcome of one controller tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub open: bool,
    pub filling: bool,
    pub rule: Rule,
}

impl Decision {
    fn close(rule: Rule) -> Self {
        Self {
            open: false,
            filling: false,
            rule,
        }
    }

    fn open(rule: Rule) -> Self {
        Self {
            open: true,
            filling: true,
            rule,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.open { "open" } else { "closed" };
        let why = match self.rule {
            Rule::Unsafe => "unsafe reading",
            Rule::TargetReached => "target level reached",
            Rule::KeepFilling => "filling in progress",
            Rule::AboveFillLevel => "level above fill threshold",
            Rule::StartFilling => "level below fill threshold",
            Rule::Undetermined => "level exactly at fill threshold",
            Rule::ShutDown => "shutdown in progress",
        };
        write!(f, "valve {} ({})", action, why)
    }
}

pub struct Controller {
    thresholds: ThresholdConfig,
    filling: bool,
    guard: Arc<ShutdownGuard>,
}

impl Controller {
    /// Create a controller in the idle (not filling) state
    pub fn new(thresholds: ThresholdConfig, guard: Arc<ShutdownGuard>) -> Self {
        Self {
            thresholds,
            filling: false,
            guard,
        }
    }

    pub fn is_filling(&self) -> bool {
        self.filling
    }

    /// Apply the rule table to a classification without side effects
    pub fn decide(&self, classification: &Classification) -> Decision {
        let average_cm = match classification {
            Classification::Unsafe { .. } => return Decision::close(Rule::Unsafe),
            Classification::Safe { average_cm } => *average_cm,
        };

        if average_cm < self.thresholds.target_cm {
            return Decision::close(Rule::TargetReached);
        }
        if self.filling {
            return Decision::open(Rule::KeepFilling);
        }
        if average_cm < self.thresholds.fill_cm {
            return Decision::close(Rule::AboveFillLevel);
        }
        if average_cm > self.thresholds.fill_cm {
            return Decision::open(Rule::StartFilling);
        }
        Decision::close(Rule::Undetermined)
    }

    /// Decide, update the filling state and drive the valve
    ///
    /// A failed valve write is logged and not retried. Once shutdown has
    /// begun nothing is written and the decision reports the valve closed.
    pub fn apply(&mut self, classification: &Classification) -> Decision {
        let decision = self.decide(classification);
        self.filling = decision.filling;

        match self.guard.drive(decision.open) {
            Some(Ok(())) => {}
            Some(Err(e)) => error!(error = %e, open = decision.open, "CONTROL: valve write failed"),
            None => {
                self.filling = false;
                return Decision::close(Rule::ShutDown);
            }
        }

        decision
    }

    /// One control cycle over a history snapshot
    pub fn tick(&mut self, snapshot: &[Option<Measurement>]) -> Decision {
        let classification =
            safe_to_fill(snapshot, self.thresholds.top_cm, self.thresholds.bottom_cm);
        let decision = self.apply(&classification);

        info!(
            history = %format_history(snapshot),
            "CONTROL: {} -> {}",
            classification,
            decision
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaterLevelError;
    use crate::hw::{MockValveActuator, ValveActuator};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use parking_lot::Mutex;

    fn thresholds() -> ThresholdConfig {
        ThresholdConfig {
            top_cm: 5.0,
            target_cm: 9.0,
            fill_cm: 14.0,
            bottom_cm: 20.0,
        }
    }

    fn safe(average_cm: f32) -> Classification {
        Classification::Safe { average_cm }
    }

    /// Records every valve write
    #[derive(Default)]
    struct RecordingValve {
        writes: Mutex<Vec<bool>>,
    }

    impl ValveActuator for RecordingValve {
        fn set_open(&self, open: bool) -> Result<(), WaterLevelError> {
            self.writes.lock().push(open);
            Ok(())
        }
    }

    fn controller_with_recorder() -> (Controller, Arc<RecordingValve>) {
        let valve = Arc::new(RecordingValve::default());
        let guard = Arc::new(ShutdownGuard::new(valve.clone()));
        (Controller::new(thresholds(), guard), valve)
    }

    #[test]
    fn test_fill_cycle_with_hysteresis() {
        let (mut controller, valve) = controller_with_recorder();

        let d = controller.apply(&safe(8.0));
        assert_eq!((d.open, d.rule), (false, Rule::TargetReached));
        assert!(!controller.is_filling());

        let d = controller.apply(&safe(15.0));
        assert_eq!((d.open, d.rule), (true, Rule::StartFilling));
        assert!(controller.is_filling());

        let d = controller.apply(&safe(12.0));
        assert_eq!((d.open, d.rule), (true, Rule::KeepFilling));
        assert!(controller.is_filling());

        let d = controller.apply(&safe(8.5));
        assert_eq!((d.open, d.rule), (false, Rule::TargetReached));
        assert!(!controller.is_filling());

        assert_eq!(*valve.writes.lock(), vec![false, true, true, false]);
    }

    #[test]
    fn test_idle_inside_band_stays_closed() {
        let (mut controller, _) = controller_with_recorder();
        let d = controller.apply(&safe(12.0));
        assert_eq!((d.open, d.rule), (false, Rule::AboveFillLevel));
        assert!(!controller.is_filling());
    }

    #[test]
    fn test_unsafe_closes_even_while_filling() {
        let (mut controller, valve) = controller_with_recorder();
        controller.apply(&safe(15.0));
        assert!(controller.is_filling());

        let d = controller.apply(&Classification::Unsafe {
            reason: "too many low values",
            average_cm: Some(18.0),
        });
        assert_eq!((d.open, d.rule), (false, Rule::Unsafe));
        assert!(!controller.is_filling());
        assert_eq!(*valve.writes.lock(), vec![true, false]);
    }

    #[test]
    fn test_exactly_fill_level_closes() {
        let (controller, _) = controller_with_recorder();
        let d = controller.decide(&safe(14.0));
        assert_eq!(d, Decision { open: false, filling: false, rule: Rule::Undetermined });
    }

    #[test]
    fn test_exactly_target_while_filling_keeps_filling() {
        let (mut controller, _) = controller_with_recorder();
        controller.apply(&safe(15.0));
        let d = controller.apply(&safe(9.0));
        assert_eq!(d.rule, Rule::KeepFilling);
    }

    #[test]
    fn test_valve_write_failure_does_not_stop_control() {
        let mut valve = MockValveActuator::new();
        let mut seq = Sequence::new();
        valve
            .expect_set_open()
            .with(eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(WaterLevelError::ValveWrite { pin: 5, reason: "EIO".into() }));
        valve
            .expect_set_open()
            .with(eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let guard = Arc::new(ShutdownGuard::new(Arc::new(valve)));
        let mut controller = Controller::new(thresholds(), guard);

        assert!(controller.apply(&safe(15.0)).open);
        assert!(controller.is_filling());
        assert!(controller.apply(&safe(13.0)).open);
    }

    #[test]
    fn test_engaged_guard_overrides_controller() {
        let (mut controller, valve) = controller_with_recorder();
        controller.apply(&safe(15.0));

        controller.guard.engage("SIGTERM");
        let d = controller.apply(&safe(16.0));

        assert_eq!(d, Decision { open: false, filling: false, rule: Rule::ShutDown });
        assert_eq!(d.to_string(), "valve closed (shutdown in progress)");
        assert!(!controller.is_filling());
        assert_eq!(*valve.writes.lock(), vec![true, false]);
    }

    #[test]
    fn test_tick_classifies_snapshot() {
        let (mut controller, valve) = controller_with_recorder();

        let snapshot: Vec<_> = (0..10).map(|_| Some(Measurement::trusted(16.0))).collect();
        assert_eq!(controller.tick(&snapshot).rule, Rule::StartFilling);

        let empty = vec![None; 10];
        assert_eq!(controller.tick(&empty).rule, Rule::Unsafe);

        assert_eq!(*valve.writes.lock(), vec![true, false]);
    }
}
