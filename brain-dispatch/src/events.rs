//! Local event fan-out keyed by `job:<id>`, per SPEC_FULL.md §4.5.
//!
//! `JobEvents` is the in-process analogue of the spec's "terminal updates
//! emit a local event" — `StatusTracker` and the zombie reaper both call
//! [`JobEvents::notify`], and [`crate::wait_for_completion`] is the only
//! reader.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A registry of per-job notification handles.
#[derive(Default, Clone)]
pub struct JobEvents {
    inner: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
}

impl JobEvents {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the `Notify` handle for `job_id`. Multiple callers
    /// waiting on the same job share one handle.
    pub fn handle_for(&self, job_id: &str) -> Arc<Notify> {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.entry(job_id.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    /// Wake every waiter registered for `job_id` and drop the handle —
    /// a terminal status only happens once per job, so there is nothing
    /// left to notify afterwards.
    pub fn notify(&self, job_id: &str) {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(notify) = map.remove(job_id) {
            notify.notify_waiters();
        }
    }
}
