//! Outlier filtering and safety classification over a history snapshot
//!
//! # How It Works
//!
//! 1. **Diagnostics** (`average_distance`): plain mean of every reading up to
//!    200 cm, as long as at least 3 such readings exist.
//!
//! 2. **Control** (`safe_to_fill`): each slot is bucketed as unknown (missed or
//!    untrustworthy), too high (closer than `top_cm`), too low (further than
//!    `bottom_cm`) or valid. No more than 3 readings may fall in either
//!    out-of-range bucket and at least 7 must be valid before the average of
//!    the valid readings is reported as safe.
//!
//! Both functions are pure: the same snapshot always yields the same result.

use crate::constants::{filter, history};
use crate::data::{Classification, Measurement};

/// Slot counts produced by partitioning a snapshot against the thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Partition {
    pub unknown: usize,
    pub too_high: usize,
    pub too_low: usize,
    pub valid: usize,
}

/// Diagnostic average of all readings that are not spurious
///
/// Missed slots and readings over 200 cm are dropped, trusted or not.
pub fn average_distance(snapshot: &[Option<Measurement>]) -> Classification {
    let plausible: Vec<f32> = snapshot
        .iter()
        .flatten()
        .map(|m| m.distance_cm)
        .filter(|cm| *cm <= filter::SPURIOUS_DISTANCE_CM)
        .collect();

    if plausible.len() < filter::MIN_DIAGNOSTIC_SAMPLES {
        return Classification::unsafe_because(filter::REASON_DISTANCE_UNKNOWN);
    }

    Classification::Safe {
        average_cm: mean(&plausible),
    }
}

/// Bucket every slot of a snapshot against `top_cm`/`bottom_cm`
///
/// Returns the counts together with the distances of the valid readings.
pub fn partition(
    snapshot: &[Option<Measurement>],
    top_cm: f32,
    bottom_cm: f32,
) -> (Partition, Vec<f32>) {
    let mut counts = Partition::default();
    let mut valid = Vec::with_capacity(snapshot.len());

    for slot in snapshot {
        match slot {
            Some(m) if m.trustworthy => {
                if m.distance_cm < top_cm {
                    counts.too_high += 1;
                } else if m.distance_cm > bottom_cm {
                    counts.too_low += 1;
                } else if m.distance_cm.is_nan() {
                    counts.unknown += 1;
                } else {
                    counts.valid += 1;
                    valid.push(m.distance_cm);
                }
            }
            _ => counts.unknown += 1,
        }
    }

    (counts, valid)
}

/// Classify a snapshot for valve control
///
/// The out-of-range buckets are checked before the valid count so that a
/// window dominated by rim or bottom readings reports that cause; any window
/// with fewer than 7 valid readings is unsafe either way.
pub fn safe_to_fill(snapshot: &[Option<Measurement>], top_cm: f32, bottom_cm: f32) -> Classification {
    if snapshot.len() != history::CAPACITY {
        return Classification::unsafe_because(filter::REASON_INSUFFICIENT_HISTORY);
    }

    let (counts, valid) = partition(snapshot, top_cm, bottom_cm);
    let average_cm = (!valid.is_empty()).then(|| mean(&valid));

    if counts.too_high > filter::MAX_OUT_OF_RANGE_SAMPLES {
        return Classification::Unsafe {
            reason: filter::REASON_TOO_MANY_HIGH,
            average_cm,
        };
    }

    if counts.too_low > filter::MAX_OUT_OF_RANGE_SAMPLES {
        return Classification::Unsafe {
            reason: filter::REASON_TOO_MANY_LOW,
            average_cm,
        };
    }

    match average_cm {
        Some(average_cm) if counts.valid >= filter::MIN_VALID_SAMPLES => {
            Classification::Safe { average_cm }
        }
        _ => Classification::unsafe_because(filter::REASON_TOO_MANY_UNCERTAIN),
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}
