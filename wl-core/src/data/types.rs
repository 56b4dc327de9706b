//! Core data types for Waterlevel
//!
//! Contains measurement and classification types used across the crate.

use std::fmt;
use std::time::Instant;

/// A single distance reading from the range sensor
///
/// Immutable once created. `trustworthy` is the sensor's own verdict on the
/// reading and is independent of the plausibility filter applied later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub distance_cm: f32,
    pub acquired_at: Instant,
    pub trustworthy: bool,
}

impl Measurement {
    /// Create a measurement stamped with the current time
    pub fn new(distance_cm: f32, trustworthy: bool) -> Self {
        Self {
            distance_cm,
            acquired_at: Instant::now(),
            trustworthy,
        }
    }

    /// Shorthand for a reading the sensor vouches for
    pub fn trusted(distance_cm: f32) -> Self {
        Self::new(distance_cm, true)
    }
}

/// Copy of the history window, oldest first; `None` marks a missed reading
pub type Snapshot = Vec<Option<Measurement>>;

/// Safety verdict over a history snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Enough plausible readings; `average_cm` can drive the valve
    Safe { average_cm: f32 },
    /// The window cannot be trusted; `average_cm` is diagnostic only
    Unsafe {
        reason: &'static str,
        average_cm: Option<f32>,
    },
}

impl Classification {
    pub fn unsafe_because(reason: &'static str) -> Self {
        Self::Unsafe {
            reason,
            average_cm: None,
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe { .. })
    }

    /// Average distance when one was computed, safe or not
    pub fn average_cm(&self) -> Option<f32> {
        match self {
            Self::Safe { average_cm } => Some(*average_cm),
            Self::Unsafe { average_cm, .. } => *average_cm,
        }
    }

    /// Reason string for unsafe windows
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Safe { .. } => None,
            Self::Unsafe { reason, .. } => Some(*reason),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe { average_cm } => write!(f, "safe: {:5.2} cm", average_cm),
            Self::Unsafe {
                reason,
                average_cm: Some(avg),
            } => write!(f, "unsafe: {} ({:5.2} cm)", reason, avg),
            Self::Unsafe {
                reason,
                average_cm: None,
            } => write!(f, "unsafe: {}", reason),
        }
    }
}

/// Render the raw distances of a snapshot as one log line, `-` for missed slots
pub fn format_history(snapshot: &[Option<Measurement>]) -> String {
    snapshot
        .iter()
        .map(|slot| match slot {
            Some(m) if m.trustworthy => format!("{:5.2}", m.distance_cm),
            Some(m) => format!("{:5.2}?", m.distance_cm),
            None => "    -".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_accessors() {
        let safe = Classification::Safe { average_cm: 10.0 };
        assert!(safe.is_safe());
        assert_eq!(safe.average_cm(), Some(10.0));
        assert_eq!(safe.reason(), None);

        let unsafe_ = Classification::Unsafe {
            reason: "too many high values",
            average_cm: Some(9.5),
        };
        assert!(!unsafe_.is_safe());
        assert_eq!(unsafe_.average_cm(), Some(9.5));
        assert_eq!(unsafe_.reason(), Some("too many high values"));
    }

    #[test]
    fn test_classification_display() {
        assert_eq!(Classification::Safe { average_cm: 10.0 }.to_string(), "safe: 10.00 cm");
        assert_eq!(
            Classification::unsafe_because("insufficient history").to_string(),
            "unsafe: insufficient history"
        );
    }

    #[test]
    fn test_format_history_marks_missing_and_untrusted() {
        let snapshot = vec![
            None,
            Some(Measurement::trusted(4.5)),
            Some(Measurement::new(12.0, false)),
        ];
        assert_eq!(format_history(&snapshot), "    -  4.50 12.00?");
    }
}
