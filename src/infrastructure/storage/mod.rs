mod object_staging_store;
mod sidecar_metadata_provider;
mod store_factory;

pub use object_staging_store::ObjectStagingStore;
pub use sidecar_metadata_provider::SidecarMetadataProvider;
pub use store_factory::StagingStoreFactory;
