use std::sync::Arc;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::presentation::config::{JobStoreProvider, JobStoreSettings};

use super::{FileJobRepository, InMemoryJobRepository};

pub struct JobRepositoryFactory;

impl JobRepositoryFactory {
    pub fn create(settings: &JobStoreSettings) -> Result<Arc<dyn JobRepository>, RepositoryError> {
        let repository: Arc<dyn JobRepository> = match settings.provider {
            JobStoreProvider::File => Arc::new(FileJobRepository::new(&settings.path)?),
            JobStoreProvider::Memory => Arc::new(InMemoryJobRepository::new()),
        };
        tracing::info!(provider = ?settings.provider, path = %settings.path, "Job store ready");
        Ok(repository)
    }
}
