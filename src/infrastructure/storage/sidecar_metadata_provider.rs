use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{MetadataProvider, StagingStore, StagingStoreError};
use crate::domain::{AudioMetadata, JobId, StoragePath};

/// Reads the JSON metadata stored next to an upload.
pub struct SidecarMetadataProvider {
    store: Arc<dyn StagingStore>,
}

impl SidecarMetadataProvider {
    pub fn new(store: Arc<dyn StagingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MetadataProvider for SidecarMetadataProvider {
    async fn lookup(&self, job_id: &JobId) -> Result<Option<AudioMetadata>, StagingStoreError> {
        let raw = match self.store.fetch(&StoragePath::metadata(job_id)).await {
            Ok(raw) => raw,
            Err(StagingStoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_slice::<AudioMetadata>(&raw) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Ignoring unreadable metadata sidecar");
                Ok(None)
            }
        }
    }
}
