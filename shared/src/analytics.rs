//! Derived analytics over sessions and metrics
//!
//! Everything here is a pure function over borrowed collections, recomputed
//! on every query and never cached or persisted. Trend classification is a
//! two-point comparison, not a regression; callers must not expect
//! smoothing.

use crate::records::{HealthMetric, MetricType};
use crate::sessions::{BpSession, FitnessSession};
use crate::nutrition::NutritionEntry;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Trend threshold on percentage change from the first value.
/// A UI-tuning constant, not a clinically meaningful cutoff.
pub const TREND_THRESHOLD_PERCENT: f64 = 5.0;

/// Threshold for fitness weight trends, in absolute pounds
pub const FITNESS_TREND_THRESHOLD_LBS: f64 = 5.0;

/// Standard rolling-average windows offered by the UI, in days
pub const ROLLING_WINDOWS_DAYS: [u32; 5] = [3, 7, 14, 21, 30];

/// Rolling blood pressure averages over a trailing day window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingAverage {
    pub window_days: u32,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub average_systolic: f64,
    pub average_diastolic: f64,
    /// Absent when no in-window reading carried a heart rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_heart_rate: Option<f64>,
    pub reading_count: usize,
    pub session_count: usize,
}

/// Direction of a two-point trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Blood pressure category per the standard AHA cut-points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BpCategory {
    Normal,
    Elevated,
    HypertensionStage1,
    HypertensionStage2,
    HypertensiveCrisis,
}

impl BpCategory {
    pub fn description(&self) -> &'static str {
        match self {
            BpCategory::Normal => "Normal",
            BpCategory::Elevated => "Elevated",
            BpCategory::HypertensionStage1 => "Hypertension (Stage 1)",
            BpCategory::HypertensionStage2 => "Hypertension (Stage 2)",
            BpCategory::HypertensiveCrisis => "Hypertensive Crisis",
        }
    }
}

/// Classify a blood pressure pair into its category
///
/// The higher of the two component categories wins.
pub fn classify_reading(systolic: i32, diastolic: i32) -> BpCategory {
    if systolic >= 180 || diastolic >= 120 {
        BpCategory::HypertensiveCrisis
    } else if systolic >= 140 || diastolic >= 90 {
        BpCategory::HypertensionStage2
    } else if systolic >= 130 || diastolic >= 80 {
        BpCategory::HypertensionStage1
    } else if systolic >= 120 {
        BpCategory::Elevated
    } else {
        BpCategory::Normal
    }
}

/// Compute rolling blood pressure averages over the trailing window
///
/// Sessions are selected by start time within `[now - window_days, now]`.
/// Averages run across every reading in every matched session, not an
/// average of per-session averages. An empty window yields `None`, never
/// zero.
pub fn rolling_average(
    sessions: &[BpSession],
    window_days: u32,
    now: DateTime<Utc>,
) -> Option<RollingAverage> {
    let window_start = now - Duration::days(i64::from(window_days));
    let in_window: Vec<&BpSession> = sessions
        .iter()
        .filter(|s| s.start_time >= window_start && s.start_time <= now)
        .collect();

    let mut systolic_sum = 0.0;
    let mut diastolic_sum = 0.0;
    let mut reading_count = 0usize;
    let mut hr_sum = 0.0;
    let mut hr_count = 0usize;

    for session in &in_window {
        for reading in &session.readings {
            systolic_sum += f64::from(reading.systolic);
            diastolic_sum += f64::from(reading.diastolic);
            reading_count += 1;
            if let Some(hr) = reading.heart_rate {
                hr_sum += f64::from(hr);
                hr_count += 1;
            }
        }
    }

    if reading_count == 0 {
        return None;
    }

    Some(RollingAverage {
        window_days,
        window_start,
        window_end: now,
        average_systolic: systolic_sum / reading_count as f64,
        average_diastolic: diastolic_sum / reading_count as f64,
        average_heart_rate: (hr_count > 0).then(|| hr_sum / hr_count as f64),
        reading_count,
        session_count: in_window.len(),
    })
}

/// Classify the two-point trend of a metric type over a trailing window
///
/// In-window metrics of the type are ordered by timestamp; with fewer than
/// two points the trend is `Stable`. Otherwise the last value is compared to
/// the first, with [`TREND_THRESHOLD_PERCENT`] on percentage change.
pub fn metric_trend(
    metrics: &[HealthMetric],
    metric_type: MetricType,
    window_days: u32,
    now: DateTime<Utc>,
) -> TrendDirection {
    let window_start = now - Duration::days(i64::from(window_days));
    let mut in_window: Vec<&HealthMetric> = metrics
        .iter()
        .filter(|m| {
            m.metric_type == metric_type && m.timestamp >= window_start && m.timestamp <= now
        })
        .collect();
    in_window.sort_by_key(|m| m.timestamp);

    let (Some(first), Some(last)) = (in_window.first(), in_window.last()) else {
        return TrendDirection::Stable;
    };
    if in_window.len() < 2 || first.value == 0.0 {
        return TrendDirection::Stable;
    }

    let percent_change = (last.value - first.value) / first.value * 100.0;
    if percent_change > TREND_THRESHOLD_PERCENT {
        TrendDirection::Increasing
    } else if percent_change < -TREND_THRESHOLD_PERCENT {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Classify the trend of max lifted weight across fitness sessions
///
/// Mirrors [`metric_trend`] but compares in absolute pounds with
/// [`FITNESS_TREND_THRESHOLD_LBS`] rather than a percentage.
pub fn fitness_weight_trend(
    sessions: &[FitnessSession],
    window_days: u32,
    now: DateTime<Utc>,
) -> TrendDirection {
    let window_start = now - Duration::days(i64::from(window_days));
    let mut in_window: Vec<(DateTime<Utc>, f64)> = sessions
        .iter()
        .filter(|s| s.start_time >= window_start && s.start_time <= now)
        .filter_map(|s| s.max_weight().map(|w| (s.start_time, w)))
        .collect();
    in_window.sort_by_key(|(start, _)| *start);

    let (Some((_, first)), Some((_, last))) = (in_window.first(), in_window.last()) else {
        return TrendDirection::Stable;
    };
    if in_window.len() < 2 {
        return TrendDirection::Stable;
    }

    let change = last - first;
    if change > FITNESS_TREND_THRESHOLD_LBS {
        TrendDirection::Increasing
    } else if change < -FITNESS_TREND_THRESHOLD_LBS {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Nutrition totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_calories: f64,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    pub total_fiber_g: f64,
    pub total_water_oz: f64,
    pub entry_count: usize,
}

/// Sum nutrition entries logged on a single day
pub fn daily_nutrition_summary(entries: &[NutritionEntry], date: NaiveDate) -> DailySummary {
    let mut summary = DailySummary {
        date,
        total_calories: 0.0,
        total_protein_g: 0.0,
        total_carbs_g: 0.0,
        total_fat_g: 0.0,
        total_fiber_g: 0.0,
        total_water_oz: 0.0,
        entry_count: 0,
    };
    for entry in entries.iter().filter(|e| e.date == date) {
        summary.total_calories += entry.calories;
        summary.total_protein_g += entry.protein_g;
        summary.total_carbs_g += entry.carbs_g;
        summary.total_fat_g += entry.fat_g;
        summary.total_fiber_g += entry.fiber_g;
        summary.total_water_oz += entry.water_oz;
        summary.entry_count += 1;
    }
    summary
}
