use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::ObjectStagingStore;

pub struct StagingStoreFactory;

impl StagingStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn StagingStore>, StagingStoreError> {
        let store = match settings.provider {
            StorageProviderSetting::Local => {
                ObjectStagingStore::local(PathBuf::from(&settings.local_path))?
            }
            StorageProviderSetting::Azure => {
                let account = required(&settings.azure_account, "azure_account")?;
                let key = required(&settings.azure_access_key, "azure_access_key")?;
                let container = required(&settings.azure_container, "azure_container")?;
                ObjectStagingStore::azure(account, key, container)?
            }
            StorageProviderSetting::Memory => ObjectStagingStore::in_memory(),
        };

        tracing::info!(provider = ?settings.provider, "Staging store ready");
        Ok(Arc::new(store))
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, StagingStoreError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StagingStoreError::Configuration(format!("{} required", name)))
}
