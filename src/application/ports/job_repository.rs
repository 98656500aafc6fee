use async_trait::async_trait;

use crate::domain::{JobId, JobRecord, JobStatus};

use super::RepositoryError;

/// Durable store holding one record per job.
///
/// `save` must be atomic with respect to concurrent `load`s and must only return once the
/// record is committed to the backing store; the pipeline relies on that ordering before it
/// starts the next stage.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn load(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError>;

    async fn save(&self, job: &JobRecord) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError>;

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<JobRecord>, RepositoryError>;
}
