//! Per-`(base, date)` serialization of get-or-create.
//!
//! Holds one async mutex per key while a lookup-then-insert runs, so two
//! tasks in this process never both miss and both insert. Entries are
//! dropped again once nobody holds or waits on them.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;

type RateKey = (String, NaiveDate);

#[derive(Default)]
pub struct RateLocks {
    locks: DashMap<RateKey, Arc<Mutex<()>>>,
}

impl RateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` while holding the lock for `(base, date)`.
    pub async fn run_exclusive<F, T>(&self, base: &str, date: NaiveDate, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let entry = self.checkout(base, date);
        let _guard = entry.lock.lock().await;
        work.await
    }

    fn checkout(&self, base: &str, date: NaiveDate) -> LockEntry<'_> {
        let key = (base.to_string(), date);
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        LockEntry {
            locks: &self.locks,
            key,
            lock,
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// One caller's handle on a key. Dropping it, on completion or cancellation,
/// removes the map entry when no other caller holds or waits on it.
struct LockEntry<'a> {
    locks: &'a DashMap<RateKey, Arc<Mutex<()>>>,
    key: RateKey,
    lock: Arc<Mutex<()>>,
}

impl Drop for LockEntry<'_> {
    fn drop(&mut self) {
        // Release our reference first so an idle entry is left with only the map's.
        drop(std::mem::take(&mut self.lock));
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
