//! End-to-end tests for the data manager: mutation contract, persistence,
//! and sync orchestration over the in-memory adapters

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use vitaltrack_engine::config::SyncConfig;
use vitaltrack_engine::sensor::{SensorError, SensorSample, SensorSource};
use vitaltrack_engine::store::{codec, keys};
use vitaltrack_engine::{
    DataManager, FileStore, MemoryRemoteStore, MemoryStore, RemoteSnapshot, SyncStatus,
};
use vitaltrack_shared::{
    CustomNutritionTemplate, CustomWorkout, ExerciseSession, ExerciseSet, HealthMetric,
    HealthNote, MetricType, NutritionEntry, Reading,
};

fn manager_with(remote: Arc<MemoryRemoteStore>) -> DataManager {
    DataManager::new(Box::new(MemoryStore::new()), remote, SyncConfig::default())
}

fn offline_manager() -> DataManager {
    manager_with(Arc::new(MemoryRemoteStore::new()))
}

fn weight(value: f64) -> HealthMetric {
    HealthMetric::new(MetricType::Weight, value, Utc::now())
}

fn entry(calories: f64) -> NutritionEntry {
    NutritionEntry {
        id: uuid::Uuid::new_v4(),
        date: Utc::now().date_naive(),
        calories,
        protein_g: 25.0,
        carbs_g: 40.0,
        fat_g: 10.0,
        sodium_mg: 350.0,
        sugar_g: 8.0,
        added_sugar_g: 2.0,
        fiber_g: 4.0,
        cholesterol_mg: 40.0,
        water_oz: 10.0,
        label: None,
        notes: None,
    }
}

async fn wait_for<F: Fn(&SyncStatus) -> bool>(rx: &mut watch::Receiver<SyncStatus>, pred: F) {
    loop {
        if pred(&rx.borrow_and_update()) {
            return;
        }
        rx.changed().await.expect("status channel closed");
    }
}

// ---------------------------------------------------------------------------
// Mutation contract
// ---------------------------------------------------------------------------

#[test]
fn bp_session_lifecycle_through_manager() {
    let mut mgr = offline_manager();

    // No active session yet
    assert!(!mgr.add_reading(Reading::new(120, 80, None)));

    let id = mgr.start_bp_session();
    assert!(mgr.add_reading(Reading::new(120, 80, Some(70))));
    assert!(mgr.add_reading(Reading::new(130, 90, None)));
    // Invalid reading never lands in the session
    assert!(!mgr.add_reading(Reading::new(80, 120, None)));
    assert_eq!(mgr.bp_sessions()[0].readings.len(), 2);

    assert!(mgr.complete_bp_session());
    assert!(!mgr.complete_bp_session());
    assert!(!mgr.add_reading(Reading::new(125, 85, None)));

    assert!(mgr.delete_bp_session(id));
    // Second delete of the same id is a no-op
    assert!(!mgr.delete_bp_session(id));
    assert!(mgr.bp_sessions().is_empty());
}

#[test]
fn new_session_targets_most_recent_active() {
    let mut mgr = offline_manager();
    let first = mgr.start_bp_session();
    let second = mgr.start_bp_session();

    // Most recent first
    assert_eq!(mgr.bp_sessions()[0].id, second);
    assert_eq!(mgr.bp_sessions()[1].id, first);

    mgr.add_reading(Reading::new(118, 76, None));
    assert_eq!(mgr.bp_sessions()[0].readings.len(), 1);
    assert!(mgr.bp_sessions()[1].readings.is_empty());
}

#[test]
fn delete_bp_sessions_by_date() {
    let mut mgr = offline_manager();
    mgr.start_bp_session();
    mgr.start_bp_session();

    let today = Utc::now().date_naive();
    let yesterday = today - ChronoDuration::days(1);
    assert_eq!(mgr.delete_bp_sessions_on(yesterday), 0);
    assert_eq!(mgr.delete_bp_sessions_on(today), 2);
    assert!(mgr.bp_sessions().is_empty());
}

#[test]
fn fitness_session_lifecycle_through_manager() {
    let mut mgr = offline_manager();

    // Sets need an exercise, exercises need an active session
    assert!(!mgr.add_exercise_session(ExerciseSession::new("Squat")));

    let id = mgr.start_fitness_session();
    assert!(mgr.add_exercise_session(ExerciseSession::new("Squat")));
    assert!(mgr.add_exercise_set(ExerciseSet {
        reps: Some(5),
        weight_lbs: Some(225.0),
        time_secs: None,
        distance_miles: None,
        timestamp: Utc::now(),
    }));
    assert_eq!(mgr.fitness_sessions()[0].max_weight(), Some(225.0));

    assert!(mgr.complete_fitness_session());
    assert!(!mgr.add_exercise_session(ExerciseSession::new("Deadlift")));

    assert!(mgr.set_fitness_favorite(id, true));
    assert!(mgr.fitness_sessions()[0].favorite);
    assert!(mgr.delete_fitness_session(id));
    assert!(!mgr.delete_fitness_session(id));
}

#[test]
fn invalid_metric_is_rejected() {
    let mut mgr = offline_manager();
    assert!(!mgr.add_metric(weight(12.0)));
    assert!(!mgr.add_metric(weight(f64::NAN)));
    assert!(!mgr.add_metric(HealthMetric::new(
        MetricType::BloodPressure,
        120.0,
        Utc::now()
    )));
    assert!(mgr.health_metrics().is_empty());

    assert!(mgr.add_metric(weight(171.0)));
    assert!(mgr.add_metric(weight(172.5)));
    // Head insertion: newest first
    assert_eq!(mgr.health_metrics()[0].value, 172.5);
}

#[test]
fn metrics_filter_by_type() {
    let mut mgr = offline_manager();
    mgr.add_metric(weight(171.0));
    mgr.add_metric(HealthMetric::new(MetricType::BloodSugar, 95.0, Utc::now()));
    mgr.add_metric(weight(172.0));

    assert_eq!(mgr.metrics_of(MetricType::Weight).len(), 2);
    assert_eq!(mgr.metrics_of(MetricType::BloodSugar).len(), 1);
    assert!(mgr.metrics_of(MetricType::HeartRate).is_empty());
}

#[test]
fn nutrition_entry_crud() {
    let mut mgr = offline_manager();
    let mut e = entry(650.0);
    let id = e.id;
    assert!(mgr.add_nutrition_entry(e.clone()));

    e.calories = 700.0;
    assert!(mgr.update_nutrition_entry(e.clone()));
    assert_eq!(mgr.nutrition_entries()[0].calories, 700.0);

    // Invalid update leaves the stored entry alone
    e.calories = -5.0;
    assert!(!mgr.update_nutrition_entry(e));
    assert_eq!(mgr.nutrition_entries()[0].calories, 700.0);

    assert!(mgr.delete_nutrition_entry(id));
    assert!(!mgr.delete_nutrition_entry(id));
}

#[test]
fn delete_by_id_removes_exactly_one_and_preserves_order() {
    let mut mgr = offline_manager();

    let first = mgr.start_bp_session();
    let second = mgr.start_bp_session();
    let third = mgr.start_bp_session();
    assert!(mgr.delete_bp_session(second));
    let remaining: Vec<_> = mgr.bp_sessions().iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec![third, first]);

    let entries = [entry(100.0), entry(200.0), entry(300.0)];
    for e in &entries {
        assert!(mgr.add_nutrition_entry(e.clone()));
    }
    assert!(mgr.delete_nutrition_entry(entries[1].id));
    let remaining: Vec<_> = mgr.nutrition_entries().iter().map(|e| e.id).collect();
    assert_eq!(remaining, vec![entries[2].id, entries[0].id]);
}

#[test]
fn template_use_counts_survive_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap();

    let remote = Arc::new(MemoryRemoteStore::new());
    let mut mgr = DataManager::new(
        Box::new(FileStore::open(path).unwrap()),
        remote.clone(),
        SyncConfig::default(),
    );

    let workout = CustomWorkout::new("Push Day", vec!["Bench Press".into(), "Dips".into()]);
    let workout_id = workout.id;
    assert!(mgr.add_custom_workout(workout));
    assert!(mgr.record_workout_use(workout_id));
    assert!(mgr.record_workout_use(workout_id));

    let template = CustomNutritionTemplate::new("Protein Shake", 220.0, 40.0, 8.0, 3.0);
    let template_id = template.id;
    assert!(mgr.add_nutrition_template(template));
    assert!(mgr.record_nutrition_template_use(template_id));

    drop(mgr);
    let reloaded = DataManager::new(
        Box::new(FileStore::open(path).unwrap()),
        remote,
        SyncConfig::default(),
    );
    assert_eq!(reloaded.custom_workouts()[0].use_count, 2);
    assert_eq!(reloaded.nutrition_templates()[0].use_count, 1);
}

#[test]
fn notes_crud_and_lookup() {
    let mut mgr = offline_manager();
    let date = Utc::now().date_naive();

    let note = HealthNote::new("user-1", MetricType::Weight, date, "slept badly");
    let id = note.id;
    assert!(mgr.add_note(note));
    assert!(mgr.add_note(HealthNote::new(
        "user-1",
        MetricType::Weight,
        date,
        "salty dinner"
    )));
    // Blank note is rejected
    assert!(!mgr.add_note(HealthNote::new("user-1", MetricType::Weight, date, "  ")));

    assert_eq!(mgr.notes_for(MetricType::Weight, date).len(), 2);
    assert!(mgr.notes_for(MetricType::BloodSugar, date).is_empty());

    assert!(mgr.update_note(id, "slept badly, skipped coffee"));
    assert!(!mgr.update_note(id, ""));
    let updated = mgr
        .health_notes()
        .iter()
        .find(|n| n.id == id)
        .unwrap();
    assert_eq!(updated.text, "slept badly, skipped coffee");
    assert!(updated.updated_at >= updated.created_at);

    assert!(mgr.delete_note(id));
    assert!(!mgr.delete_note(id));
}

// ---------------------------------------------------------------------------
// Local persistence round trips
// ---------------------------------------------------------------------------

#[test]
fn collections_reload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap();
    let remote = Arc::new(MemoryRemoteStore::new());

    let mut mgr = DataManager::new(
        Box::new(FileStore::open(path).unwrap()),
        remote.clone(),
        SyncConfig::default(),
    );
    // Mixed-validity stream: invalid entries are rejected at add and never
    // reach the store
    for i in 0..50 {
        assert!(mgr.add_nutrition_entry(entry(400.0 + f64::from(i))));
        let invalid = match i % 3 {
            0 => entry(-10.0),
            1 => entry(f64::NAN),
            _ => entry(60_000.0),
        };
        assert!(!mgr.add_nutrition_entry(invalid));
    }
    assert_eq!(mgr.nutrition_entries().len(), 50);
    mgr.start_bp_session();
    mgr.add_reading(Reading::new(122, 81, Some(64)));
    mgr.add_metric(weight(171.0));
    drop(mgr);

    let reloaded = DataManager::new(
        Box::new(FileStore::open(path).unwrap()),
        remote,
        SyncConfig::default(),
    );
    assert_eq!(reloaded.nutrition_entries().len(), 50);
    assert!(reloaded.nutrition_entries().iter().all(NutritionEntry::is_valid));
    // Head insertion order survives the round trip
    assert_eq!(reloaded.nutrition_entries()[0].calories, 449.0);
    assert_eq!(reloaded.bp_sessions()[0].readings.len(), 1);
    assert_eq!(reloaded.health_metrics()[0].value, 171.0);
}

// ---------------------------------------------------------------------------
// Sync orchestration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signed_out_mutations_never_push() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let mut mgr = manager_with(remote.clone());

    assert!(mgr.add_metric(weight(171.0)));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(remote.push_attempts(), 0);
    assert_eq!(*mgr.sync_status().borrow(), SyncStatus::Idle);
}

#[tokio::test]
async fn mutation_pushes_snapshot_when_signed_in() {
    let remote = Arc::new(MemoryRemoteStore::signed_in("user-1"));
    let mut mgr = manager_with(remote.clone());
    let mut status = mgr.sync_status();

    assert!(mgr.add_metric(weight(171.0)));
    wait_for(&mut status, |s| matches!(s, SyncStatus::Synced { .. })).await;

    assert_eq!(remote.pushes_completed(), 1);
    let snapshot = remote.stored_snapshot().unwrap();
    assert_eq!(snapshot.health_metrics.len(), 1);
    assert_eq!(snapshot.health_metrics[0].value, 171.0);
    assert!(!mgr.is_sync_in_flight());
}

#[tokio::test]
async fn second_mutation_during_push_is_not_queued() {
    let remote = Arc::new(MemoryRemoteStore::signed_in("user-1"));
    let gate = remote.hold_pushes();
    let mut mgr = manager_with(remote.clone());
    let mut status = mgr.sync_status();

    assert!(mgr.add_metric(weight(171.0)));
    // Let the spawned push reach the gate
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(remote.push_attempts(), 1);
    assert!(mgr.is_sync_in_flight());

    // Guard drops this one; the mutation itself still lands locally
    assert!(mgr.add_metric(weight(172.0)));
    assert_eq!(remote.push_attempts(), 1);

    gate.notify_one();
    wait_for(&mut status, |s| matches!(s, SyncStatus::Synced { .. })).await;
    assert_eq!(remote.pushes_completed(), 1);
    // The completed push carries the snapshot taken at schedule time
    assert_eq!(remote.stored_snapshot().unwrap().health_metrics.len(), 1);
    assert_eq!(mgr.health_metrics().len(), 2);
    assert!(!mgr.is_sync_in_flight());
}

#[tokio::test]
async fn push_failure_surfaces_in_status_and_keeps_local_data() {
    let remote = Arc::new(MemoryRemoteStore::signed_in("user-1"));
    remote.set_fail_pushes(true);
    let mut mgr = manager_with(remote.clone());
    let mut status = mgr.sync_status();

    assert!(mgr.add_metric(weight(171.0)));
    wait_for(&mut status, |s| matches!(s, SyncStatus::Failed { .. })).await;

    assert!(status.borrow().last_error().is_some());
    assert_eq!(remote.pushes_completed(), 0);
    assert_eq!(mgr.health_metrics().len(), 1);
    assert!(!mgr.is_sync_in_flight());
}

#[tokio::test]
async fn resync_replaces_local_state_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap();

    let remote = Arc::new(MemoryRemoteStore::signed_in("user-1"));
    remote.seed_snapshot(RemoteSnapshot {
        health_metrics: vec![weight(180.0), weight(181.5)],
        nutrition_entries: vec![entry(500.0)],
        ..Default::default()
    });

    let mut mgr = DataManager::new(
        Box::new(FileStore::open(path).unwrap()),
        remote.clone(),
        SyncConfig::default(),
    );
    assert!(mgr.resync().await);
    assert_eq!(mgr.health_metrics().len(), 2);
    assert_eq!(mgr.nutrition_entries().len(), 1);
    assert!(!mgr.is_sync_in_flight());

    // The pulled state was written through to disk
    drop(mgr);
    let reloaded = DataManager::new(
        Box::new(FileStore::open(path).unwrap()),
        remote,
        SyncConfig::default(),
    );
    assert_eq!(reloaded.health_metrics().len(), 2);
}

#[tokio::test]
async fn resync_seeds_remote_when_no_document_exists() {
    let store = MemoryStore::new();
    codec::save(&store, keys::HEALTH_METRICS, &vec![weight(171.0)]);

    let remote = Arc::new(MemoryRemoteStore::signed_in("user-1"));
    let mut mgr = DataManager::new(Box::new(store), remote.clone(), SyncConfig::default());
    assert_eq!(mgr.health_metrics().len(), 1);

    assert!(mgr.resync().await);
    let seeded = remote.stored_snapshot().unwrap();
    assert_eq!(seeded.health_metrics.len(), 1);
    // Local data is untouched by the first-sync upload
    assert_eq!(mgr.health_metrics().len(), 1);
}

#[tokio::test]
async fn resync_requires_authentication() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let mut mgr = manager_with(remote.clone());
    assert!(!mgr.resync().await);
    assert_eq!(remote.pulls(), 0);
}

#[tokio::test(start_paused = true)]
async fn sign_in_pulls_and_replaces_local_state_after_debounce() {
    let remote = Arc::new(MemoryRemoteStore::signed_in("user-1"));
    remote.seed_snapshot(RemoteSnapshot {
        health_metrics: vec![weight(180.0)],
        ..Default::default()
    });

    let store = MemoryStore::new();
    codec::save(&store, keys::HEALTH_METRICS, &vec![weight(171.0)]);
    let mut mgr = DataManager::new(Box::new(store), remote.clone(), SyncConfig::default());

    assert!(mgr.handle_sign_in().await);
    assert_eq!(remote.pulls(), 1);
    // Remote snapshot replaced the locally loaded metric wholesale
    assert_eq!(mgr.health_metrics().len(), 1);
    assert_eq!(mgr.health_metrics()[0].value, 180.0);
    assert!(matches!(
        *mgr.sync_status().borrow(),
        SyncStatus::Synced { .. }
    ));
    assert!(!mgr.is_sync_in_flight());
}

#[tokio::test(start_paused = true)]
async fn sign_in_resync_times_out_and_releases_the_guard() {
    let remote = Arc::new(MemoryRemoteStore::signed_in("user-1"));
    // The remote has no document, so resync falls into the seeding push,
    // which the gate holds open past the timeout
    let _gate = remote.hold_pushes();
    let mut mgr = manager_with(remote.clone());

    assert!(!mgr.handle_sign_in().await);
    assert!(mgr.sync_status().borrow().last_error().is_some());
    // The permit was dropped with the cancelled future
    assert!(!mgr.is_sync_in_flight());
}

// ---------------------------------------------------------------------------
// Sensor import
// ---------------------------------------------------------------------------

struct StubSensor {
    samples: Vec<SensorSample>,
    authorized: bool,
}

#[async_trait]
impl SensorSource for StubSensor {
    async fn samples(
        &self,
        _metric_type: MetricType,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<SensorSample>, SensorError> {
        if !self.authorized {
            return Err(SensorError::Unauthorized);
        }
        Ok(self.samples.clone())
    }
}

#[tokio::test]
async fn sensor_import_inserts_only_valid_samples() {
    let now = Utc::now();
    let sensor = StubSensor {
        authorized: true,
        samples: vec![
            SensorSample { value: 171.0, timestamp: now },
            SensorSample { value: 12.0, timestamp: now },
            SensorSample { value: 172.5, timestamp: now },
        ],
    };

    let mut mgr = offline_manager();
    let inserted = mgr
        .import_sensor_samples(&sensor, MetricType::Weight, now - ChronoDuration::days(1), now)
        .await;
    assert_eq!(inserted, 2);
    assert_eq!(mgr.health_metrics().len(), 2);
}

#[tokio::test]
async fn unauthorized_sensor_import_inserts_nothing() {
    let now = Utc::now();
    let sensor = StubSensor {
        authorized: false,
        samples: vec![SensorSample { value: 171.0, timestamp: now }],
    };

    let mut mgr = offline_manager();
    let inserted = mgr
        .import_sensor_samples(&sensor, MetricType::Weight, now - ChronoDuration::days(1), now)
        .await;
    assert_eq!(inserted, 0);
    assert!(mgr.health_metrics().is_empty());
}
