//! In-memory remote store
//!
//! Doubles as an offline stub and as the test harness for sync
//! orchestration: auth state is switchable, failures are injectable, and
//! pushes can be held open to exercise the in-flight guard.

use super::{RemoteError, RemoteSnapshot, RemoteStore};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Notify;

#[derive(Default)]
pub struct MemoryRemoteStore {
    user_id: RwLock<Option<String>>,
    snapshot: Mutex<Option<RemoteSnapshot>>,
    fail_pushes: AtomicBool,
    push_attempts: AtomicUsize,
    pushes_completed: AtomicUsize,
    pulls: AtomicUsize,
    push_gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already signed in as `user_id`
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let store = Self::default();
        store.sign_in(user_id);
        store
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        *self.user_id.write().expect("auth lock poisoned") = Some(user_id.into());
    }

    pub fn sign_out(&self) {
        *self.user_id.write().expect("auth lock poisoned") = None;
    }

    /// Make every subsequent push fail with a network error
    pub fn set_fail_pushes(&self, fail: bool) {
        self.fail_pushes.store(fail, Ordering::SeqCst);
    }

    /// Hold pushes open until the returned handle is notified, one push per
    /// `notify_one` call
    pub fn hold_pushes(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.push_gate.lock().expect("gate lock poisoned") = Some(Arc::clone(&notify));
        notify
    }

    /// Pushes that made it past the manager's in-flight guard
    pub fn push_attempts(&self) -> usize {
        self.push_attempts.load(Ordering::SeqCst)
    }

    pub fn pushes_completed(&self) -> usize {
        self.pushes_completed.load(Ordering::SeqCst)
    }

    pub fn pulls(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }

    /// The last pushed snapshot, if any
    pub fn stored_snapshot(&self) -> Option<RemoteSnapshot> {
        self.snapshot.lock().expect("snapshot lock poisoned").clone()
    }

    /// Seed the remote document, as if another device had pushed it
    pub fn seed_snapshot(&self, snapshot: RemoteSnapshot) {
        *self.snapshot.lock().expect("snapshot lock poisoned") = Some(snapshot);
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn push(&self, _user_id: &str, snapshot: &RemoteSnapshot) -> Result<(), RemoteError> {
        if !self.is_authenticated() {
            return Err(RemoteError::Unauthorized);
        }
        self.push_attempts.fetch_add(1, Ordering::SeqCst);

        let gate = self.push_gate.lock().expect("gate lock poisoned").clone();
        if let Some(notify) = gate {
            notify.notified().await;
        }

        if self.fail_pushes.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("injected push failure".to_string()));
        }

        *self.snapshot.lock().expect("snapshot lock poisoned") = Some(snapshot.clone());
        self.pushes_completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn pull(&self, _user_id: &str) -> Result<RemoteSnapshot, RemoteError> {
        if !self.is_authenticated() {
            return Err(RemoteError::Unauthorized);
        }
        self.pulls.fetch_add(1, Ordering::SeqCst);
        self.snapshot
            .lock()
            .expect("snapshot lock poisoned")
            .clone()
            .ok_or(RemoteError::NotFound)
    }

    fn is_authenticated(&self) -> bool {
        self.user_id.read().expect("auth lock poisoned").is_some()
    }

    fn current_user_id(&self) -> Option<String> {
        self.user_id.read().expect("auth lock poisoned").clone()
    }
}
