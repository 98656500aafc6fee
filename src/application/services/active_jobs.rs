use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::JobId;

/// Single-writer claims keyed by job id. A claim lasts as long as its guard.
#[derive(Debug, Clone, Default)]
pub struct ActiveJobs {
    inner: Arc<Mutex<HashSet<JobId>>>,
}

impl ActiveJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id`, or returns `None` if another execution already holds it.
    pub fn claim(&self, id: &JobId) -> Option<ActiveJobGuard> {
        let mut active = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(id.clone()) {
            return None;
        }
        Some(ActiveJobGuard {
            jobs: Arc::clone(&self.inner),
            id: id.clone(),
        })
    }

    pub fn is_active(&self, id: &JobId) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[derive(Debug)]
pub struct ActiveJobGuard {
    jobs: Arc<Mutex<HashSet<JobId>>>,
    id: JobId,
}

impl Drop for ActiveJobGuard {
    fn drop(&mut self) {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
