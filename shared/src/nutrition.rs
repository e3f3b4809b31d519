//! Nutrition records, goals, and user-authored templates

use crate::validation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A logged day-of-eating entry with macro and micronutrient fields
///
/// Unlike readings and metrics, entries stay mutable by id until deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub sodium_mg: f64,
    pub sugar_g: f64,
    pub added_sugar_g: f64,
    pub fiber_g: f64,
    pub cholesterol_mg: f64,
    pub water_oz: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NutritionEntry {
    /// Validity: every numeric field finite and non-negative, calories capped
    pub fn is_valid(&self) -> bool {
        let fields = [
            self.calories,
            self.protein_g,
            self.carbs_g,
            self.fat_g,
            self.sodium_mg,
            self.sugar_g,
            self.added_sugar_g,
            self.fiber_g,
            self.cholesterol_mg,
            self.water_oz,
        ];
        fields.into_iter().all(validation::valid_measurement)
            && self.calories <= validation::MAX_ENTRY_CALORIES
    }
}

/// Historical entry shape from before the added-sugar field existed
///
/// Kept only so the persistence layer can decode old local blobs; the codec
/// backfills `added_sugar_g` with zero and re-saves in the current shape.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyNutritionEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub sodium_mg: f64,
    pub sugar_g: f64,
    pub fiber_g: f64,
    pub cholesterol_mg: f64,
    pub water_oz: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<LegacyNutritionEntry> for NutritionEntry {
    fn from(legacy: LegacyNutritionEntry) -> Self {
        Self {
            id: legacy.id,
            date: legacy.date,
            calories: legacy.calories,
            protein_g: legacy.protein_g,
            carbs_g: legacy.carbs_g,
            fat_g: legacy.fat_g,
            sodium_mg: legacy.sodium_mg,
            sugar_g: legacy.sugar_g,
            added_sugar_g: 0.0,
            fiber_g: legacy.fiber_g,
            cholesterol_mg: legacy.cholesterol_mg,
            water_oz: legacy.water_oz,
            label: legacy.label,
            notes: legacy.notes,
        }
    }
}

/// Daily nutrition targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoals {
    pub daily_calories: f64,
    pub daily_protein_g: f64,
    pub daily_carbs_g: f64,
    pub daily_fat_g: f64,
    pub daily_water_oz: f64,
}

impl NutritionGoals {
    pub fn is_valid(&self) -> bool {
        [
            self.daily_calories,
            self.daily_protein_g,
            self.daily_carbs_g,
            self.daily_fat_g,
            self.daily_water_oz,
        ]
        .into_iter()
        .all(validation::valid_measurement)
    }
}

/// User-authored nutrition template with usage tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomNutritionTemplate {
    pub id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub use_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl CustomNutritionTemplate {
    pub fn new(name: impl Into<String>, calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            calories,
            protein_g,
            carbs_g,
            fat_g,
            use_count: 0,
            last_used: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && [self.calories, self.protein_g, self.carbs_g, self.fat_g]
                .into_iter()
                .all(validation::valid_measurement)
    }

    /// Bump the usage counter; called each time the template is applied
    pub fn record_use(&mut self) {
        self.use_count += 1;
        self.last_used = Some(Utc::now());
    }
}
