use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{JobId, JobRecord, JobStatus};

/// Process-local job store for tests and scaffold mode.
#[derive(Default)]
pub struct InMemoryJobRepository {
    records: RwLock<HashMap<JobId, JobRecord>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn load(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, job: &JobRecord) -> Result<(), RepositoryError> {
        self.records
            .write()
            .await
            .insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<JobRecord>, RepositoryError> {
        let mut jobs: Vec<JobRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect();
        jobs.sort_by_key(|job| job.created_at);
        Ok(jobs)
    }
}
