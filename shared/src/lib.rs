//! VitalTrack shared domain library
//!
//! Pure domain layer for the health/fitness/nutrition tracker: record types
//! with validity predicates, aggregate session types, and derived analytics.
//! No I/O and no async; persistence and sync live in `vitaltrack-engine`.

pub mod analytics;
pub mod nutrition;
pub mod records;
pub mod sessions;
pub mod validation;
pub mod workouts;

// Re-export commonly used items
pub use analytics::{
    daily_nutrition_summary, fitness_weight_trend, metric_trend, rolling_average, BpCategory,
    DailySummary, RollingAverage, TrendDirection,
};
pub use nutrition::{CustomNutritionTemplate, LegacyNutritionEntry, NutritionEntry, NutritionGoals};
pub use records::{HealthMetric, HealthNote, MetricType, Reading};
pub use sessions::{BpSession, ExerciseSession, ExerciseSet, FitnessSession};
pub use workouts::{CustomExercise, CustomWorkout};
