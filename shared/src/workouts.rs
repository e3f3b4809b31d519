//! User-authored workout and exercise templates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved workout template: an ordered list of exercise names the user can
/// start a session from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomWorkout {
    pub id: Uuid,
    pub name: String,
    pub exercise_names: Vec<String>,
    pub use_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl CustomWorkout {
    pub fn new(name: impl Into<String>, exercise_names: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            exercise_names,
            use_count: 0,
            last_used: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.exercise_names.is_empty()
            && self.exercise_names.iter().all(|n| !n.trim().is_empty())
    }

    pub fn record_use(&mut self) {
        self.use_count += 1;
        self.last_used = Some(Utc::now());
    }
}

/// A user-defined exercise available alongside the builtin catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomExercise {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    pub use_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl CustomExercise {
    pub fn new(name: impl Into<String>, muscle_group: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            muscle_group,
            use_count: 0,
            last_used: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn record_use(&mut self) {
        self.use_count += 1;
        self.last_used = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workout_validity() {
        let workout = CustomWorkout::new("Push Day", vec!["Bench Press".into(), "Dips".into()]);
        assert!(workout.is_valid());

        assert!(!CustomWorkout::new("", vec!["Bench Press".into()]).is_valid());
        assert!(!CustomWorkout::new("Empty", vec![]).is_valid());
        assert!(!CustomWorkout::new("Blank exercise", vec!["  ".into()]).is_valid());
    }

    #[test]
    fn test_exercise_use_tracking() {
        let mut exercise = CustomExercise::new("Cable Fly", Some("chest".to_string()));
        assert!(exercise.is_valid());
        exercise.record_use();
        assert_eq!(exercise.use_count, 1);
        assert!(exercise.last_used.is_some());
    }
}
