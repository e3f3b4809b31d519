//! Core health record types
//!
//! Value types for individual measurements: blood pressure readings, scalar
//! health metrics, and free-text health notes. All are serde-friendly and
//! carry a pure `is_valid` predicate checked at the mutation boundary.

use crate::validation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a scalar health measurement
///
/// Blood pressure appears here so notes and queries can reference it, but a
/// blood pressure measurement itself is always the multi-field [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    BloodPressure,
    Weight,
    BloodSugar,
    HeartRate,
    BodyFatPercent,
    LeanBodyMass,
}

impl MetricType {
    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            MetricType::BloodPressure => "Blood Pressure",
            MetricType::Weight => "Weight",
            MetricType::BloodSugar => "Blood Sugar",
            MetricType::HeartRate => "Heart Rate",
            MetricType::BodyFatPercent => "Body Fat %",
            MetricType::LeanBodyMass => "Lean Body Mass",
        }
    }

    /// Measurement unit for display
    pub fn unit(&self) -> &'static str {
        match self {
            MetricType::BloodPressure => "mmHg",
            MetricType::Weight | MetricType::LeanBodyMass => "lbs",
            MetricType::BloodSugar => "mg/dL",
            MetricType::HeartRate => "bpm",
            MetricType::BodyFatPercent => "%",
        }
    }
}

/// A single blood pressure reading
///
/// Immutable once created; readings only ever live inside a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub systolic: i32,
    pub diastolic: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn new(systolic: i32, diastolic: i32, heart_rate: Option<i32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            systolic,
            diastolic,
            heart_rate,
            timestamp: Utc::now(),
        }
    }

    /// Validity: 50..=300 systolic, 30..=200 diastolic, systolic > diastolic,
    /// heart rate (when present) 30..=200
    pub fn is_valid(&self) -> bool {
        validation::valid_pressure_pair(self.systolic, self.diastolic)
            && self
                .heart_rate
                .map_or(true, |hr| validation::in_range_i32(hr, validation::HEART_RATE_RANGE))
    }
}

/// A scalar health measurement (weight, blood sugar, heart rate, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub id: Uuid,
    pub metric_type: MetricType,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl HealthMetric {
    pub fn new(metric_type: MetricType, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            metric_type,
            value,
            timestamp,
        }
    }

    /// Validity: value within the type-specific range of `validation`
    pub fn is_valid(&self) -> bool {
        validation::valid_metric_value(self.metric_type, self.value)
    }
}

/// Free-text annotation attached to a metric type on a calendar day
///
/// Several notes may exist per (metric type, day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthNote {
    pub id: Uuid,
    pub user_id: String,
    pub metric_type: MetricType,
    pub date: NaiveDate,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthNote {
    pub fn new(user_id: impl Into<String>, metric_type: MetricType, date: NaiveDate, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            metric_type,
            date,
            text: text.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && self.text.len() <= validation::MAX_NOTE_LEN
    }
}
