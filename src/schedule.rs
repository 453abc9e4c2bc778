//! @acp:module "Scheduling"
//! @acp:summary "Debounced scan scheduling and the coalescing index refresh queue"
//! @acp:domain core
//! @acp:layer service
//!
//! Both types are driven by the caller's clock: every operation takes `now`,
//! so event loops and tests decide when time passes.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);
pub const DEFAULT_INDEX_DELAY: Duration = Duration::from_millis(500);

/// @acp:summary "Runs at most one scan per key per quiescence window"
///
/// A key becomes due once `window` has elapsed since its most recent change.
/// Changes inside the window push the deadline back.
#[derive(Debug, Clone)]
pub struct ScanScheduler<K: Ord + Clone> {
    window: Duration,
    pending: BTreeMap<K, Instant>,
}

impl<K: Ord + Clone> ScanScheduler<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Change the window; pending keys keep their last-change time.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Record a change; returns `true` when the key was not already pending.
    pub fn notify_change(&mut self, key: K, now: Instant) -> bool {
        self.pending.insert(key, now).is_none()
    }

    /// Remove and return every key whose window has elapsed, in key order.
    pub fn due(&mut self, now: Instant) -> Vec<K> {
        let window = self.window;
        let ready: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, last)| now.saturating_duration_since(**last) >= window)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &ready {
            self.pending.remove(key);
        }
        ready
    }

    /// Earliest instant at which some key becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().map(|last| *last + self.window)
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K: Ord + Clone> Default for ScanScheduler<K> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// @acp:summary "Batches index refreshes behind one trailing timer"
///
/// Every push restarts the shared timer; when it expires the whole batch is
/// released at once. Draining an empty or not-yet-due queue returns nothing.
#[derive(Debug, Clone)]
pub struct IndexQueue<K: Ord + Clone> {
    delay: Duration,
    pending: BTreeSet<K>,
    last_push: Option<Instant>,
}

impl<K: Ord + Clone> IndexQueue<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: BTreeSet::new(),
            last_push: None,
        }
    }

    /// Change the delay; the queued batch is kept and timed from its last push.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn push(&mut self, key: K, now: Instant) {
        self.pending.insert(key);
        self.last_push = Some(now);
    }

    pub fn drain(&mut self, now: Instant) -> Vec<K> {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.last_push = None;
                std::mem::take(&mut self.pending).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.last_push.map(|last| last + self.delay)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K: Ord + Clone> Default for IndexQueue<K> {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_DELAY)
    }
}
