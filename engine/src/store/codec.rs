//! Typed save/load over the byte store
//!
//! Both directions are total: a failed save is logged and dropped, a failed
//! decode is logged and yields an empty collection. A corrupted local cache
//! therefore silently resets instead of crashing; the raw bytes are not kept
//! around for recovery.

use super::{keys, LocalStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use vitaltrack_shared::{LegacyNutritionEntry, NutritionEntry};

/// Serialize a collection into its named blob
pub fn save<T: Serialize>(store: &dyn LocalStore, key: &str, value: &T) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key, error = %e, "failed to serialize collection; skipping save");
            return;
        }
    };
    if let Err(e) = store.put(key, &bytes) {
        warn!(key, error = %e, "failed to persist collection");
    }
}

/// Decode a collection from its named blob, resetting to empty on failure
pub fn load<T: DeserializeOwned + Default>(store: &dyn LocalStore, key: &str) -> T {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read collection; starting empty");
            return T::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "failed to decode collection; resetting to empty");
            T::default()
        }
    }
}

/// Load nutrition entries with the one supported schema migration
///
/// Entries saved before the added-sugar field existed fail the primary
/// decode; those blobs are retried against the legacy shape, backfilled with
/// `added_sugar_g = 0.0`, and immediately re-saved in the current shape.
pub fn load_nutrition_entries(store: &dyn LocalStore) -> Vec<NutritionEntry> {
    let bytes = match store.get(keys::NUTRITION_ENTRIES) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read nutrition entries; starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_slice::<Vec<NutritionEntry>>(&bytes) {
        Ok(entries) => entries,
        Err(primary_err) => match serde_json::from_slice::<Vec<LegacyNutritionEntry>>(&bytes) {
            Ok(legacy) => {
                warn!(count = legacy.len(), "migrating nutrition entries from legacy schema");
                let entries: Vec<NutritionEntry> =
                    legacy.into_iter().map(NutritionEntry::from).collect();
                save(store, keys::NUTRITION_ENTRIES, &entries);
                entries
            }
            Err(_) => {
                warn!(error = %primary_err, "failed to decode nutrition entries; resetting to empty");
                Vec::new()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use vitaltrack_shared::Reading;

    #[test]
    fn test_round_trip() {
        let store = MemoryStore::new();
        let readings = vec![Reading::new(120, 80, Some(70)), Reading::new(130, 85, None)];
        save(&store, "readings", &readings);

        let loaded: Vec<Reading> = load(&store, "readings");
        assert_eq!(loaded, readings);
    }

    #[test]
    fn test_missing_blob_loads_empty() {
        let store = MemoryStore::new();
        let loaded: Vec<Reading> = load(&store, "nothing_here");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_corrupt_blob_resets_to_empty() {
        let store = MemoryStore::new();
        store.put("readings", b"{not json at all").unwrap();
        let loaded: Vec<Reading> = load(&store, "readings");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_legacy_nutrition_migration_backfills_and_resaves() {
        let store = MemoryStore::new();
        let legacy_json = r#"[{
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "date": "2024-03-01",
            "calories": 420.0,
            "protein_g": 20.0,
            "carbs_g": 50.0,
            "fat_g": 14.0,
            "sodium_mg": 300.0,
            "sugar_g": 9.0,
            "fiber_g": 5.0,
            "cholesterol_mg": 30.0,
            "water_oz": 12.0
        }]"#;
        store.put(keys::NUTRITION_ENTRIES, legacy_json.as_bytes()).unwrap();

        let entries = load_nutrition_entries(&store);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].added_sugar_g, 0.0);
        assert_eq!(entries[0].calories, 420.0);

        // The blob was re-saved in the current shape, so a plain load works
        let reloaded: Vec<NutritionEntry> = load(&store, keys::NUTRITION_ENTRIES);
        assert_eq!(reloaded, entries);
    }

    #[test]
    fn test_garbage_nutrition_blob_resets_to_empty() {
        let store = MemoryStore::new();
        store.put(keys::NUTRITION_ENTRIES, b"\x00\x01\x02").unwrap();
        assert!(load_nutrition_entries(&store).is_empty());
    }
}
