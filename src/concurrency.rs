//! Per-page locking.
//!
//! Every workflow that reads a page, calls the backend, and writes the page
//! back holds the page's lock for the whole sequence, so concurrent runs on
//! the same page queue up instead of overwriting each other. Different pages
//! never contend.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct PageLockManager {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl PageLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `page_id`, created on first use. Entries nobody holds a
    /// handle to are pruned on each call.
    pub fn get_lock(&self, page_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        // Holders and waiters keep a clone; the map's own reference is the last.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(page_id.to_string()).or_default().clone()
    }

    pub fn tracked_pages(&self) -> usize {
        self.locks.lock().len()
    }
}
