//! The data manager: single owner of all mutable collections
//!
//! Every mutation follows the same contract: validate the record, reject
//! invalid input with a `false` return, mutate the in-memory collection
//! (insert at head, most-recent-first), persist the affected collection
//! locally, emit a change event, and, when a remote session is signed in,
//! schedule an asynchronous push. Remote failures never reach the mutating
//! caller; they land in the observable sync status.
//!
//! All mutation happens through `&mut self` on one owner, so collections are
//! never touched concurrently. Spawned push tasks only see a snapshot copy,
//! the in-flight flag, and the status channel.

mod sync;

use crate::config::SyncConfig;
use crate::events::{DataEvent, SyncStatus};
use crate::remote::RemoteStore;
use crate::sensor::{SensorSource, SensorSample};
use crate::store::{codec, keys, LocalStore};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};
use uuid::Uuid;
use vitaltrack_shared::{
    analytics, BpSession, CustomExercise, CustomNutritionTemplate, CustomWorkout, DailySummary,
    ExerciseSession, ExerciseSet, FitnessSession, HealthMetric, HealthNote, MetricType,
    NutritionEntry, NutritionGoals, Reading, RollingAverage, TrendDirection,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Owns the in-memory collections and mediates every mutation
pub struct DataManager {
    bp_sessions: Vec<BpSession>,
    fitness_sessions: Vec<FitnessSession>,
    health_metrics: Vec<HealthMetric>,
    nutrition_entries: Vec<NutritionEntry>,
    nutrition_goals: Option<NutritionGoals>,
    custom_workouts: Vec<CustomWorkout>,
    custom_exercises: Vec<CustomExercise>,
    nutrition_templates: Vec<CustomNutritionTemplate>,
    health_notes: Vec<HealthNote>,

    store: Box<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    sync: SyncConfig,

    sync_in_flight: Arc<AtomicBool>,
    status_tx: watch::Sender<SyncStatus>,
    status_rx: watch::Receiver<SyncStatus>,
    events_tx: broadcast::Sender<DataEvent>,
}

impl DataManager {
    /// Build a manager over the given adapters, loading every collection
    /// from the local store (corrupted blobs reset to empty)
    pub fn new(store: Box<dyn LocalStore>, remote: Arc<dyn RemoteStore>, sync: SyncConfig) -> Self {
        let bp_sessions = codec::load(store.as_ref(), keys::BP_SESSIONS);
        let fitness_sessions = codec::load(store.as_ref(), keys::FITNESS_SESSIONS);
        let health_metrics = codec::load(store.as_ref(), keys::HEALTH_METRICS);
        let nutrition_entries = codec::load_nutrition_entries(store.as_ref());
        let nutrition_goals = codec::load(store.as_ref(), keys::NUTRITION_GOALS);
        let custom_workouts = codec::load(store.as_ref(), keys::CUSTOM_WORKOUTS);
        let custom_exercises = codec::load(store.as_ref(), keys::CUSTOM_EXERCISES);
        let nutrition_templates = codec::load(store.as_ref(), keys::NUTRITION_TEMPLATES);
        let health_notes = codec::load(store.as_ref(), keys::HEALTH_NOTES);

        let (status_tx, status_rx) = watch::channel(SyncStatus::Idle);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        info!("data manager loaded from local store");

        Self {
            bp_sessions,
            fitness_sessions,
            health_metrics,
            nutrition_entries,
            nutrition_goals,
            custom_workouts,
            custom_exercises,
            nutrition_templates,
            health_notes,
            store,
            remote,
            sync,
            sync_in_flight: Arc::new(AtomicBool::new(false)),
            status_tx,
            status_rx,
            events_tx,
        }
    }

    // ------------------------------------------------------------------
    // Observability
    // ------------------------------------------------------------------

    /// Watch receiver carrying the latest sync status
    pub fn sync_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// Subscribe to coarse per-collection change events
    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.events_tx.subscribe()
    }

    /// Whether a push or resync currently holds the in-flight guard
    pub fn is_sync_in_flight(&self) -> bool {
        self.sync_in_flight.load(Ordering::Acquire)
    }

    fn changed(&self, event: DataEvent) {
        let _ = self.events_tx.send(event);
        self.schedule_push();
    }

    // ------------------------------------------------------------------
    // Blood pressure sessions
    // ------------------------------------------------------------------

    pub fn bp_sessions(&self) -> &[BpSession] {
        &self.bp_sessions
    }

    /// Start a new recording session and return its id
    pub fn start_bp_session(&mut self) -> Uuid {
        let session = BpSession::start();
        let id = session.id;
        self.bp_sessions.insert(0, session);
        self.persist_bp();
        self.changed(DataEvent::BpSessionsChanged);
        id
    }

    /// Append a reading to the most recent active session
    pub fn add_reading(&mut self, reading: Reading) -> bool {
        let Some(session) = self.bp_sessions.iter_mut().find(|s| s.active) else {
            return false;
        };
        if !session.add_reading(reading) {
            return false;
        }
        self.persist_bp();
        self.changed(DataEvent::BpSessionsChanged);
        true
    }

    /// Complete the most recent active session
    pub fn complete_bp_session(&mut self) -> bool {
        let Some(session) = self.bp_sessions.iter_mut().find(|s| s.active) else {
            return false;
        };
        if !session.complete() {
            return false;
        }
        self.persist_bp();
        self.changed(DataEvent::BpSessionsChanged);
        true
    }

    /// Delete exactly one session by id; missing ids are a no-op
    pub fn delete_bp_session(&mut self, id: Uuid) -> bool {
        let Some(index) = self.bp_sessions.iter().position(|s| s.id == id) else {
            return false;
        };
        self.bp_sessions.remove(index);
        self.persist_bp();
        self.changed(DataEvent::BpSessionsChanged);
        true
    }

    /// Delete every session started on the given calendar date
    pub fn delete_bp_sessions_on(&mut self, date: NaiveDate) -> usize {
        let before = self.bp_sessions.len();
        self.bp_sessions.retain(|s| s.start_time.date_naive() != date);
        let removed = before - self.bp_sessions.len();
        if removed > 0 {
            self.persist_bp();
            self.changed(DataEvent::BpSessionsChanged);
        }
        removed
    }

    /// Rolling blood pressure averages over the trailing window, absent when
    /// no reading falls inside it
    pub fn bp_rolling_average(&self, window_days: u32) -> Option<RollingAverage> {
        analytics::rolling_average(&self.bp_sessions, window_days, Utc::now())
    }

    // ------------------------------------------------------------------
    // Fitness sessions
    // ------------------------------------------------------------------

    pub fn fitness_sessions(&self) -> &[FitnessSession] {
        &self.fitness_sessions
    }

    pub fn start_fitness_session(&mut self) -> Uuid {
        let session = FitnessSession::start();
        let id = session.id;
        self.fitness_sessions.insert(0, session);
        self.persist_fitness();
        self.changed(DataEvent::FitnessSessionsChanged);
        id
    }

    /// Append an exercise to the most recent active fitness session
    pub fn add_exercise_session(&mut self, exercise: ExerciseSession) -> bool {
        let Some(session) = self.fitness_sessions.iter_mut().find(|s| s.active) else {
            return false;
        };
        if !session.add_exercise(exercise) {
            return false;
        }
        self.persist_fitness();
        self.changed(DataEvent::FitnessSessionsChanged);
        true
    }

    /// Append a set to the most recent exercise of the active session
    pub fn add_exercise_set(&mut self, set: ExerciseSet) -> bool {
        let Some(session) = self.fitness_sessions.iter_mut().find(|s| s.active) else {
            return false;
        };
        if !session.add_set(set) {
            return false;
        }
        self.persist_fitness();
        self.changed(DataEvent::FitnessSessionsChanged);
        true
    }

    pub fn complete_fitness_session(&mut self) -> bool {
        let Some(session) = self.fitness_sessions.iter_mut().find(|s| s.active) else {
            return false;
        };
        if !session.complete() {
            return false;
        }
        self.persist_fitness();
        self.changed(DataEvent::FitnessSessionsChanged);
        true
    }

    pub fn delete_fitness_session(&mut self, id: Uuid) -> bool {
        let Some(index) = self.fitness_sessions.iter().position(|s| s.id == id) else {
            return false;
        };
        self.fitness_sessions.remove(index);
        self.persist_fitness();
        self.changed(DataEvent::FitnessSessionsChanged);
        true
    }

    pub fn set_fitness_favorite(&mut self, id: Uuid, favorite: bool) -> bool {
        let Some(session) = self.fitness_sessions.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        session.favorite = favorite;
        self.persist_fitness();
        self.changed(DataEvent::FitnessSessionsChanged);
        true
    }

    /// Trend of max lifted weight over the trailing window (±5 lbs band)
    pub fn fitness_weight_trend(&self, window_days: u32) -> TrendDirection {
        analytics::fitness_weight_trend(&self.fitness_sessions, window_days, Utc::now())
    }

    // ------------------------------------------------------------------
    // Health metrics
    // ------------------------------------------------------------------

    pub fn health_metrics(&self) -> &[HealthMetric] {
        &self.health_metrics
    }

    pub fn metrics_of(&self, metric_type: MetricType) -> Vec<&HealthMetric> {
        self.health_metrics
            .iter()
            .filter(|m| m.metric_type == metric_type)
            .collect()
    }

    pub fn add_metric(&mut self, metric: HealthMetric) -> bool {
        if !metric.is_valid() {
            return false;
        }
        self.health_metrics.insert(0, metric);
        self.persist_metrics();
        self.changed(DataEvent::MetricsChanged);
        true
    }

    pub fn delete_metric(&mut self, id: Uuid) -> bool {
        let Some(index) = self.health_metrics.iter().position(|m| m.id == id) else {
            return false;
        };
        self.health_metrics.remove(index);
        self.persist_metrics();
        self.changed(DataEvent::MetricsChanged);
        true
    }

    /// Two-point trend of a metric type over the trailing window (±5% band)
    pub fn metric_trend(&self, metric_type: MetricType, window_days: u32) -> TrendDirection {
        analytics::metric_trend(&self.health_metrics, metric_type, window_days, Utc::now())
    }

    /// Pull samples from the platform health service and insert the valid
    /// ones as metrics. Unauthorized or failed queries insert nothing.
    pub async fn import_sensor_samples(
        &mut self,
        source: &dyn SensorSource,
        metric_type: MetricType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> usize {
        let samples: Vec<SensorSample> = match source.samples(metric_type, start, end).await {
            Ok(samples) => samples,
            Err(e) => {
                warn!(?metric_type, error = %e, "sensor import skipped");
                return 0;
            }
        };

        let mut inserted = 0;
        for sample in samples {
            let metric = HealthMetric::new(metric_type, sample.value, sample.timestamp);
            if metric.is_valid() {
                self.health_metrics.insert(0, metric);
                inserted += 1;
            }
        }
        if inserted > 0 {
            self.persist_metrics();
            self.changed(DataEvent::MetricsChanged);
        }
        inserted
    }

    // ------------------------------------------------------------------
    // Nutrition
    // ------------------------------------------------------------------

    pub fn nutrition_entries(&self) -> &[NutritionEntry] {
        &self.nutrition_entries
    }

    pub fn nutrition_goals(&self) -> Option<&NutritionGoals> {
        self.nutrition_goals.as_ref()
    }

    pub fn add_nutrition_entry(&mut self, entry: NutritionEntry) -> bool {
        if !entry.is_valid() {
            return false;
        }
        self.nutrition_entries.insert(0, entry);
        self.persist_nutrition();
        self.changed(DataEvent::NutritionChanged);
        true
    }

    /// Replace an existing entry in place, keeping its position
    pub fn update_nutrition_entry(&mut self, entry: NutritionEntry) -> bool {
        if !entry.is_valid() {
            return false;
        }
        let Some(existing) = self.nutrition_entries.iter_mut().find(|e| e.id == entry.id) else {
            return false;
        };
        *existing = entry;
        self.persist_nutrition();
        self.changed(DataEvent::NutritionChanged);
        true
    }

    pub fn delete_nutrition_entry(&mut self, id: Uuid) -> bool {
        let Some(index) = self.nutrition_entries.iter().position(|e| e.id == id) else {
            return false;
        };
        self.nutrition_entries.remove(index);
        self.persist_nutrition();
        self.changed(DataEvent::NutritionChanged);
        true
    }

    pub fn set_nutrition_goals(&mut self, goals: NutritionGoals) -> bool {
        if !goals.is_valid() {
            return false;
        }
        self.nutrition_goals = Some(goals);
        codec::save(self.store.as_ref(), keys::NUTRITION_GOALS, &self.nutrition_goals);
        self.changed(DataEvent::NutritionChanged);
        true
    }

    /// Nutrition totals for one calendar day
    pub fn daily_nutrition_summary(&self, date: NaiveDate) -> DailySummary {
        analytics::daily_nutrition_summary(&self.nutrition_entries, date)
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    pub fn custom_workouts(&self) -> &[CustomWorkout] {
        &self.custom_workouts
    }

    pub fn custom_exercises(&self) -> &[CustomExercise] {
        &self.custom_exercises
    }

    pub fn nutrition_templates(&self) -> &[CustomNutritionTemplate] {
        &self.nutrition_templates
    }

    pub fn add_custom_workout(&mut self, workout: CustomWorkout) -> bool {
        if !workout.is_valid() {
            return false;
        }
        self.custom_workouts.insert(0, workout);
        self.persist_workouts();
        self.changed(DataEvent::TemplatesChanged);
        true
    }

    pub fn delete_custom_workout(&mut self, id: Uuid) -> bool {
        let Some(index) = self.custom_workouts.iter().position(|w| w.id == id) else {
            return false;
        };
        self.custom_workouts.remove(index);
        self.persist_workouts();
        self.changed(DataEvent::TemplatesChanged);
        true
    }

    /// Bump a workout template's usage counter
    pub fn record_workout_use(&mut self, id: Uuid) -> bool {
        let Some(workout) = self.custom_workouts.iter_mut().find(|w| w.id == id) else {
            return false;
        };
        workout.record_use();
        self.persist_workouts();
        self.changed(DataEvent::TemplatesChanged);
        true
    }

    pub fn add_custom_exercise(&mut self, exercise: CustomExercise) -> bool {
        if !exercise.is_valid() {
            return false;
        }
        self.custom_exercises.insert(0, exercise);
        self.persist_exercises();
        self.changed(DataEvent::TemplatesChanged);
        true
    }

    pub fn delete_custom_exercise(&mut self, id: Uuid) -> bool {
        let Some(index) = self.custom_exercises.iter().position(|e| e.id == id) else {
            return false;
        };
        self.custom_exercises.remove(index);
        self.persist_exercises();
        self.changed(DataEvent::TemplatesChanged);
        true
    }

    pub fn record_exercise_use(&mut self, id: Uuid) -> bool {
        let Some(exercise) = self.custom_exercises.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        exercise.record_use();
        self.persist_exercises();
        self.changed(DataEvent::TemplatesChanged);
        true
    }

    pub fn add_nutrition_template(&mut self, template: CustomNutritionTemplate) -> bool {
        if !template.is_valid() {
            return false;
        }
        self.nutrition_templates.insert(0, template);
        self.persist_nutrition_templates();
        self.changed(DataEvent::TemplatesChanged);
        true
    }

    pub fn delete_nutrition_template(&mut self, id: Uuid) -> bool {
        let Some(index) = self.nutrition_templates.iter().position(|t| t.id == id) else {
            return false;
        };
        self.nutrition_templates.remove(index);
        self.persist_nutrition_templates();
        self.changed(DataEvent::TemplatesChanged);
        true
    }

    pub fn record_nutrition_template_use(&mut self, id: Uuid) -> bool {
        let Some(template) = self.nutrition_templates.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        template.record_use();
        self.persist_nutrition_templates();
        self.changed(DataEvent::TemplatesChanged);
        true
    }

    // ------------------------------------------------------------------
    // Health notes
    // ------------------------------------------------------------------

    pub fn health_notes(&self) -> &[HealthNote] {
        &self.health_notes
    }

    pub fn notes_for(&self, metric_type: MetricType, date: NaiveDate) -> Vec<&HealthNote> {
        self.health_notes
            .iter()
            .filter(|n| n.metric_type == metric_type && n.date == date)
            .collect()
    }

    pub fn add_note(&mut self, note: HealthNote) -> bool {
        if !note.is_valid() {
            return false;
        }
        self.health_notes.insert(0, note);
        self.persist_notes();
        self.changed(DataEvent::NotesChanged);
        true
    }

    /// Rewrite a note's text, refreshing its updated timestamp
    pub fn update_note(&mut self, id: Uuid, text: impl Into<String>) -> bool {
        let text = text.into();
        let Some(note) = self.health_notes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        let mut updated = note.clone();
        updated.text = text;
        updated.updated_at = Utc::now();
        if !updated.is_valid() {
            return false;
        }
        *note = updated;
        self.persist_notes();
        self.changed(DataEvent::NotesChanged);
        true
    }

    pub fn delete_note(&mut self, id: Uuid) -> bool {
        let Some(index) = self.health_notes.iter().position(|n| n.id == id) else {
            return false;
        };
        self.health_notes.remove(index);
        self.persist_notes();
        self.changed(DataEvent::NotesChanged);
        true
    }

    // ------------------------------------------------------------------
    // Local persistence
    // ------------------------------------------------------------------

    fn persist_bp(&self) {
        codec::save(self.store.as_ref(), keys::BP_SESSIONS, &self.bp_sessions);
    }

    fn persist_fitness(&self) {
        codec::save(self.store.as_ref(), keys::FITNESS_SESSIONS, &self.fitness_sessions);
    }

    fn persist_metrics(&self) {
        codec::save(self.store.as_ref(), keys::HEALTH_METRICS, &self.health_metrics);
    }

    fn persist_nutrition(&self) {
        codec::save(self.store.as_ref(), keys::NUTRITION_ENTRIES, &self.nutrition_entries);
    }

    fn persist_workouts(&self) {
        codec::save(self.store.as_ref(), keys::CUSTOM_WORKOUTS, &self.custom_workouts);
    }

    fn persist_exercises(&self) {
        codec::save(self.store.as_ref(), keys::CUSTOM_EXERCISES, &self.custom_exercises);
    }

    fn persist_nutrition_templates(&self) {
        codec::save(self.store.as_ref(), keys::NUTRITION_TEMPLATES, &self.nutrition_templates);
    }

    fn persist_notes(&self) {
        codec::save(self.store.as_ref(), keys::HEALTH_NOTES, &self.health_notes);
    }

    fn persist_all(&self) {
        self.persist_bp();
        self.persist_fitness();
        self.persist_metrics();
        self.persist_nutrition();
        codec::save(self.store.as_ref(), keys::NUTRITION_GOALS, &self.nutrition_goals);
        self.persist_workouts();
        self.persist_exercises();
        self.persist_nutrition_templates();
        self.persist_notes();
    }
}
