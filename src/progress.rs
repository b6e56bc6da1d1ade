//! Build progress fan-out.
//!
//! The broadcaster keeps the latest [`ProgressState`] and pushes every update
//! through a bounded `tokio::sync::broadcast` channel. A subscriber that falls
//! behind loses the oldest messages, never the newest. Each build reports
//! through its own [`BuildProgress`], which stamps a build id and keeps the
//! percentage from going backwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, trace};
use uuid::Uuid;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Idle,
    Scanning,
    Reading,
    Analyzing,
    Complete,
    /// Synthetic: nothing happened within the subscriber's wait window.
    Keepalive,
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressStatus::Idle => write!(f, "idle"),
            ProgressStatus::Scanning => write!(f, "scanning"),
            ProgressStatus::Reading => write!(f, "reading"),
            ProgressStatus::Analyzing => write!(f, "analyzing"),
            ProgressStatus::Complete => write!(f, "complete"),
            ProgressStatus::Keepalive => write!(f, "keepalive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub status: ProgressStatus,
    pub message: String,
    /// 0..=100
    pub percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<Uuid>,
}

impl ProgressState {
    pub fn idle() -> Self {
        Self {
            status: ProgressStatus::Idle,
            message: String::new(),
            percentage: 0,
            build_id: None,
        }
    }

    /// Keepalive carrying the last percentage a subscriber saw.
    pub fn keepalive(percentage: u8, build_id: Option<Uuid>) -> Self {
        Self {
            status: ProgressStatus::Keepalive,
            message: String::new(),
            percentage,
            build_id,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::idle()
    }
}

struct Inner {
    current: Mutex<ProgressState>,
    sender: broadcast::Sender<ProgressState>,
    subscribers: Mutex<HashSet<Uuid>>,
}

/// Latest progress state plus the set of live subscribers.
#[derive(Clone)]
pub struct ProgressBroadcaster {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                current: Mutex::new(ProgressState::idle()),
                sender,
                subscribers: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Replace the current state and push it to every subscriber.
    ///
    /// Never fails: with nobody listening the state is just stored.
    pub fn update(&self, state: ProgressState) {
        let mut current = lock(&self.inner.current);
        *current = state.clone();
        if self.inner.sender.send(state).is_err() {
            trace!("progress update with no live subscribers");
        }
    }

    pub fn current(&self) -> ProgressState {
        lock(&self.inner.current).clone()
    }

    /// Register a subscriber. Its first message is the current state.
    pub fn subscribe(&self) -> Subscription {
        // Hold the state lock so no update slips between snapshot and receiver.
        let current = lock(&self.inner.current);
        let receiver = self.inner.sender.subscribe();
        let id = Uuid::new_v4();
        let count = {
            let mut subscribers = lock(&self.inner.subscribers);
            subscribers.insert(id);
            subscribers.len()
        };
        debug!(subscriber = %id, active = count, "progress subscriber registered");

        Subscription {
            id,
            pending: Some(current.clone()),
            last_percentage: current.percentage,
            last_build: current.build_id,
            receiver,
            owner: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// One observer's view of the progress stream.
///
/// Dropping it (or calling [`Subscription::unsubscribe`]) removes it from
/// the broadcaster.
pub struct Subscription {
    id: Uuid,
    pending: Option<ProgressState>,
    last_percentage: u8,
    last_build: Option<Uuid>,
    receiver: broadcast::Receiver<ProgressState>,
    owner: Weak<Inner>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next state, waiting at most `wait`.
    ///
    /// Returns a keepalive when the wait elapses and `None` once the
    /// broadcaster has been dropped.
    pub async fn next(&mut self, wait: Duration) -> Option<ProgressState> {
        if let Some(state) = self.pending.take() {
            return Some(state);
        }
        loop {
            match tokio::time::timeout(wait, self.receiver.recv()).await {
                Ok(Ok(state)) => {
                    self.observe(&state);
                    return Some(state);
                }
                Ok(Err(RecvError::Lagged(skipped))) => {
                    debug!(subscriber = %self.id, skipped, "subscriber lagged, dropping oldest updates");
                }
                Ok(Err(RecvError::Closed)) => return None,
                Err(_) => {
                    return Some(ProgressState::keepalive(self.last_percentage, self.last_build));
                }
            }
        }
    }

    fn observe(&mut self, state: &ProgressState) {
        if state.build_id != self.last_build {
            self.last_build = state.build_id;
            self.last_percentage = state.percentage;
        } else {
            self.last_percentage = self.last_percentage.max(state.percentage);
        }
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.owner.upgrade() {
            let mut subscribers = lock(&inner.subscribers);
            subscribers.remove(&self.id);
            debug!(subscriber = %self.id, active = subscribers.len(), "progress subscriber removed");
        }
    }
}

/// Progress reporter for a single build.
pub struct BuildProgress {
    broadcaster: ProgressBroadcaster,
    build_id: Uuid,
    last: AtomicU8,
}

impl BuildProgress {
    pub fn new(broadcaster: &ProgressBroadcaster) -> Self {
        Self {
            broadcaster: broadcaster.clone(),
            build_id: Uuid::new_v4(),
            last: AtomicU8::new(0),
        }
    }

    /// A reporter nobody listens to.
    pub fn detached() -> Self {
        Self::new(&ProgressBroadcaster::new(1))
    }

    pub fn build_id(&self) -> Uuid {
        self.build_id
    }

    /// Publish a state; the percentage is clamped to 100 and never drops
    /// below what this build already reported.
    pub fn report(&self, status: ProgressStatus, message: impl Into<String>, percentage: u8) {
        let requested = percentage.min(100);
        let percentage = self.last.fetch_max(requested, Ordering::AcqRel).max(requested);
        self.broadcaster.update(ProgressState {
            status,
            message: message.into(),
            percentage,
            build_id: Some(self.build_id),
        });
    }
}
