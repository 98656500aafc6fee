use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use tempfile::TempDir;

use murmur::application::ports::{MetadataProvider, StagingStore, StagingStoreError};
use murmur::domain::{AudioMetadata, StoragePath};
use murmur::infrastructure::storage::{
    ObjectStagingStore, SidecarMetadataProvider, StagingStoreFactory,
};
use murmur::presentation::config::{StorageProviderSetting, StorageSettings};

use crate::helpers::{job_id, put_object};

#[tokio::test]
async fn given_streamed_chunks_when_storing_locally_then_bytes_are_concatenated_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = ObjectStagingStore::local(dir.path().to_path_buf()).unwrap();
    let path = StoragePath::audio(&job_id("local"));
    let chunks = vec![
        Ok::<_, io::Error>(Bytes::from_static(b"RIFF")),
        Ok(Bytes::from_static(b"-body")),
    ];

    let written = store
        .store(&path, Box::pin(stream::iter(chunks)), None)
        .await
        .unwrap();

    assert_eq!(written, 9);
    assert_eq!(store.fetch(&path).await.unwrap(), b"RIFF-body");
    assert_eq!(store.head(&path).await.unwrap(), 9);
    assert!(dir.path().join("audio").join("local").exists());
}

#[tokio::test]
async fn given_failing_stream_when_storing_then_io_error_is_returned_and_nothing_is_kept() {
    let store = ObjectStagingStore::in_memory();
    let path = StoragePath::audio(&job_id("broken-upload"));
    let chunks = vec![
        Ok(Bytes::from_static(b"partial")),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
    ];

    let result = store
        .store(&path, Box::pin(stream::iter(chunks)), None)
        .await;

    assert!(matches!(result, Err(StagingStoreError::Io(_))));
    assert!(!store.exists(&path).await.unwrap());
}

#[tokio::test]
async fn given_missing_object_when_fetching_or_deleting_then_not_found() {
    let store = ObjectStagingStore::in_memory();
    let path = StoragePath::audio(&job_id("absent"));

    assert!(matches!(
        store.fetch(&path).await,
        Err(StagingStoreError::NotFound(_))
    ));
    assert!(!store.exists(&path).await.unwrap());
}

#[tokio::test]
async fn given_stored_object_when_deleting_then_it_no_longer_exists() {
    let store = ObjectStagingStore::in_memory();
    let path = StoragePath::audio(&job_id("short-lived"));
    put_object(&store, &path, b"audio").await;

    store.delete(&path).await.unwrap();

    assert!(!store.exists(&path).await.unwrap());
}

#[tokio::test]
async fn given_sidecar_when_looking_up_metadata_then_title_and_author_are_returned() {
    let store = Arc::new(ObjectStagingStore::in_memory());
    let id = job_id("with-meta");
    put_object(
        store.as_ref(),
        &StoragePath::metadata(&id),
        br#"{"title": "Board meeting", "author": "Finance"}"#,
    )
    .await;
    let provider = SidecarMetadataProvider::new(store);

    let metadata = provider.lookup(&id).await.unwrap();

    assert_eq!(
        metadata,
        Some(AudioMetadata {
            title: Some("Board meeting".to_string()),
            author: Some("Finance".to_string()),
        })
    );
}

#[tokio::test]
async fn given_no_sidecar_when_looking_up_metadata_then_none() {
    let provider = SidecarMetadataProvider::new(Arc::new(ObjectStagingStore::in_memory()));

    assert_eq!(provider.lookup(&job_id("bare")).await.unwrap(), None);
}

#[tokio::test]
async fn given_unreadable_sidecar_when_looking_up_metadata_then_none() {
    let store = Arc::new(ObjectStagingStore::in_memory());
    let id = job_id("bad-meta");
    put_object(store.as_ref(), &StoragePath::metadata(&id), b"title=oops").await;
    let provider = SidecarMetadataProvider::new(store);

    assert_eq!(provider.lookup(&id).await.unwrap(), None);
}

#[tokio::test]
async fn given_azure_provider_without_account_when_creating_store_then_configuration_error() {
    let settings = StorageSettings {
        provider: StorageProviderSetting::Azure,
        ..StorageSettings::default()
    };

    let result = StagingStoreFactory::create(&settings);

    assert!(matches!(result, Err(StagingStoreError::Configuration(_))));
}

#[tokio::test]
async fn given_memory_provider_when_creating_store_then_objects_round_trip() {
    let settings = StorageSettings {
        provider: StorageProviderSetting::Memory,
        ..StorageSettings::default()
    };
    let store = StagingStoreFactory::create(&settings).unwrap();
    let path = StoragePath::audio(&job_id("factory"));

    put_object(store.as_ref(), &path, b"abc").await;

    assert_eq!(store.fetch(&path).await.unwrap(), b"abc");
}
