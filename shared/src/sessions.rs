//! Aggregate session types
//!
//! A session is a time-bounded, user-initiated recording window: created
//! empty and active, appended to while active, closed by an explicit
//! `complete` call, then persisted as an immutable record.

use crate::records::Reading;
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A blood pressure recording session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BpSession {
    pub id: Uuid,
    pub readings: Vec<Reading>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub active: bool,
}

impl BpSession {
    /// Start a new, empty, active session
    pub fn start() -> Self {
        Self {
            id: Uuid::new_v4(),
            readings: Vec::new(),
            start_time: Utc::now(),
            end_time: None,
            active: true,
        }
    }

    /// Append a reading; rejected (false) when the session is already
    /// completed or the reading fails validation
    pub fn add_reading(&mut self, reading: Reading) -> bool {
        if !self.active || !reading.is_valid() {
            return false;
        }
        self.readings.push(reading);
        true
    }

    /// Close the session. Returns false if it was already completed.
    pub fn complete(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.end_time = Some(Utc::now());
        true
    }

    /// Average systolic pressure across all readings, if any
    pub fn average_systolic(&self) -> Option<f64> {
        average(self.readings.iter().map(|r| f64::from(r.systolic)))
    }

    /// Average diastolic pressure across all readings, if any
    pub fn average_diastolic(&self) -> Option<f64> {
        average(self.readings.iter().map(|r| f64::from(r.diastolic)))
    }

    /// Average heart rate over only the readings that carry one
    pub fn average_heart_rate(&self) -> Option<f64> {
        average(self.readings.iter().filter_map(|r| r.heart_rate.map(f64::from)))
    }
}

/// One set within an exercise: any combination of reps, weight, time, distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_lbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl ExerciseSet {
    /// Validity: at least one measurement present, all present values finite
    /// and non-negative
    pub fn is_valid(&self) -> bool {
        let any = self.reps.is_some()
            || self.weight_lbs.is_some()
            || self.time_secs.is_some()
            || self.distance_miles.is_some();
        any && [self.weight_lbs, self.time_secs, self.distance_miles]
            .into_iter()
            .flatten()
            .all(validation::valid_measurement)
    }
}

/// A named exercise and its ordered sets within a fitness session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSession {
    pub exercise_name: String,
    /// Set when the exercise came from a user-authored template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_exercise_id: Option<Uuid>,
    pub sets: Vec<ExerciseSet>,
}

impl ExerciseSession {
    pub fn new(exercise_name: impl Into<String>) -> Self {
        Self {
            exercise_name: exercise_name.into(),
            custom_exercise_id: None,
            sets: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.exercise_name.trim().is_empty() && self.sets.iter().all(ExerciseSet::is_valid)
    }

    /// Total reps across all sets
    pub fn total_reps(&self) -> u32 {
        self.sets.iter().filter_map(|s| s.reps).sum()
    }

    /// Heaviest weight lifted in any set
    pub fn max_weight(&self) -> Option<f64> {
        self.sets
            .iter()
            .filter_map(|s| s.weight_lbs)
            .fold(None, |acc, w| Some(acc.map_or(w, |m: f64| m.max(w))))
    }

    /// Mean weight across sets that recorded one
    pub fn average_weight(&self) -> Option<f64> {
        average(self.sets.iter().filter_map(|s| s.weight_lbs))
    }

    /// Total recorded time across all sets, in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.sets.iter().filter_map(|s| s.time_secs).sum()
    }
}

/// A workout session: ordered exercises, started and completed explicitly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessSession {
    pub id: Uuid,
    pub exercises: Vec<ExerciseSession>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub favorite: bool,
    pub active: bool,
}

impl FitnessSession {
    pub fn start() -> Self {
        Self {
            id: Uuid::new_v4(),
            exercises: Vec::new(),
            start_time: Utc::now(),
            end_time: None,
            favorite: false,
            active: true,
        }
    }

    /// Append an exercise; rejected when completed or invalid
    pub fn add_exercise(&mut self, exercise: ExerciseSession) -> bool {
        if !self.active || !exercise.is_valid() {
            return false;
        }
        self.exercises.push(exercise);
        true
    }

    /// Append a set to the most recent exercise of the session
    pub fn add_set(&mut self, set: ExerciseSet) -> bool {
        if !self.active || !set.is_valid() {
            return false;
        }
        match self.exercises.last_mut() {
            Some(exercise) => {
                exercise.sets.push(set);
                true
            }
            None => false,
        }
    }

    pub fn complete(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.end_time = Some(Utc::now());
        true
    }

    /// Heaviest weight lifted across every exercise in the session
    pub fn max_weight(&self) -> Option<f64> {
        self.exercises
            .iter()
            .filter_map(ExerciseSession::max_weight)
            .fold(None, |acc, w| Some(acc.map_or(w, |m: f64| m.max(w))))
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
