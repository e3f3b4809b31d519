//! Static validation bounds for health records
//!
//! Every record type exposes an `is_valid` predicate built from the range
//! checks in this module. Records that fail validation are rejected at the
//! mutation boundary with a `false` return; nothing here panics or errors.

use crate::records::MetricType;

/// Systolic blood pressure bounds (mmHg)
pub const SYSTOLIC_RANGE: (i32, i32) = (50, 300);

/// Diastolic blood pressure bounds (mmHg)
pub const DIASTOLIC_RANGE: (i32, i32) = (30, 200);

/// Heart rate bounds (bpm), shared by readings and heart-rate metrics
pub const HEART_RATE_RANGE: (i32, i32) = (30, 200);

/// Body weight bounds (lbs)
pub const WEIGHT_RANGE: (f64, f64) = (50.0, 500.0);

/// Blood sugar bounds (mg/dL)
pub const BLOOD_SUGAR_RANGE: (f64, f64) = (20.0, 600.0);

/// Body fat percentage bounds
pub const BODY_FAT_RANGE: (f64, f64) = (1.0, 75.0);

/// Lean body mass bounds (lbs)
pub const LEAN_BODY_MASS_RANGE: (f64, f64) = (20.0, 400.0);

/// Upper bound on calories for a single nutrition entry
pub const MAX_ENTRY_CALORIES: f64 = 50_000.0;

/// Maximum length of a health note
pub const MAX_NOTE_LEN: usize = 2_000;

/// Check an integer value against an inclusive range
pub fn in_range_i32(value: i32, range: (i32, i32)) -> bool {
    value >= range.0 && value <= range.1
}

/// Check a float value against an inclusive range; NaN and infinities fail
pub fn in_range_f64(value: f64, range: (f64, f64)) -> bool {
    value.is_finite() && value >= range.0 && value <= range.1
}

/// Validate a blood pressure pair; systolic must strictly exceed diastolic
pub fn valid_pressure_pair(systolic: i32, diastolic: i32) -> bool {
    in_range_i32(systolic, SYSTOLIC_RANGE)
        && in_range_i32(diastolic, DIASTOLIC_RANGE)
        && systolic > diastolic
}

/// Validate a scalar metric value against its type-specific range
///
/// Blood pressure is never valid as a scalar metric; it is recorded through
/// the multi-field `Reading` type instead.
pub fn valid_metric_value(metric_type: MetricType, value: f64) -> bool {
    match metric_type {
        MetricType::BloodPressure => false,
        MetricType::Weight => in_range_f64(value, WEIGHT_RANGE),
        MetricType::BloodSugar => in_range_f64(value, BLOOD_SUGAR_RANGE),
        MetricType::HeartRate => {
            value.is_finite() && in_range_i32(value.round() as i32, HEART_RATE_RANGE)
        }
        MetricType::BodyFatPercent => in_range_f64(value, BODY_FAT_RANGE),
        MetricType::LeanBodyMass => in_range_f64(value, LEAN_BODY_MASS_RANGE),
    }
}

/// Validate a non-negative, finite measurement (reps, weight, distance, time)
pub fn valid_measurement(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
