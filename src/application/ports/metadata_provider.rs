use async_trait::async_trait;

use crate::domain::{AudioMetadata, JobId};

use super::StagingStoreError;

/// Source of best-effort title/author information for an uploaded recording.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn lookup(&self, job_id: &JobId) -> Result<Option<AudioMetadata>, StagingStoreError>;
}
