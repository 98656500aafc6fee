use chrono::{Duration, Utc};
use tempfile::TempDir;

use murmur::application::ports::{JobRepository, RepositoryError};
use murmur::domain::{JobId, JobRecord, JobStatus, SpeakerSettings};
use murmur::infrastructure::persistence::{FileJobRepository, JobRepositoryFactory};
use murmur::presentation::config::{JobStoreProvider, JobStoreSettings};

fn job(raw: &str, status: JobStatus) -> JobRecord {
    let mut job = JobRecord::new(JobId::parse(raw).unwrap(), SpeakerSettings::default());
    job.status = status;
    job
}

#[tokio::test]
async fn given_saved_job_when_loading_then_record_round_trips() {
    let dir = TempDir::new().unwrap();
    let repository = FileJobRepository::new(dir.path()).unwrap();
    let mut record = job("episode-1", JobStatus::Summarizing);
    record.data.text = Some("Hello there.".to_string());
    record.data.language = Some("sv".to_string());
    record.data.processing_time = Some(12.5);

    repository.save(&record).await.unwrap();
    let loaded = repository.load(&record.id).await.unwrap();

    assert_eq!(loaded, Some(record));
}

#[tokio::test]
async fn given_unknown_job_when_loading_then_none_is_returned() {
    let dir = TempDir::new().unwrap();
    let repository = FileJobRepository::new(dir.path()).unwrap();

    let loaded = repository.load(&JobId::parse("nobody").unwrap()).await.unwrap();

    assert!(loaded.is_none());
}

#[tokio::test]
async fn given_job_saved_twice_when_loading_then_latest_state_wins() {
    let dir = TempDir::new().unwrap();
    let repository = FileJobRepository::new(dir.path()).unwrap();
    let mut record = job("twice", JobStatus::Init);
    repository.save(&record).await.unwrap();

    record.advance_to(JobStatus::FetchingAudio);
    repository.save(&record).await.unwrap();

    let loaded = repository.load(&record.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, JobStatus::FetchingAudio);
}

#[tokio::test]
async fn given_saves_when_finished_then_no_temporary_files_remain() {
    let dir = TempDir::new().unwrap();
    let repository = FileJobRepository::new(dir.path()).unwrap();
    for i in 0..5 {
        repository
            .save(&job(&format!("job-{}", i), JobStatus::Init))
            .await
            .unwrap();
    }

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names.len(), 5);
    assert!(names.iter().all(|name| name.ends_with(".json") && !name.starts_with('.')));
}

#[tokio::test]
async fn given_corrupt_record_when_loading_then_corrupt_error_is_returned() {
    let dir = TempDir::new().unwrap();
    let repository = FileJobRepository::new(dir.path()).unwrap();
    std::fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();

    let result = repository.load(&JobId::parse("broken").unwrap()).await;

    assert!(matches!(result, Err(RepositoryError::Corrupt { id, .. }) if id == "broken"));
}

#[tokio::test]
async fn given_mixed_records_when_listing_by_status_then_matching_jobs_are_returned_oldest_first() {
    let dir = TempDir::new().unwrap();
    let repository = FileJobRepository::new(dir.path()).unwrap();
    let mut newer = job("newer", JobStatus::Transcribing);
    let mut older = job("older", JobStatus::Transcribing);
    older.created_at = Utc::now() - Duration::hours(1);
    newer.created_at = Utc::now();
    repository.save(&newer).await.unwrap();
    repository.save(&older).await.unwrap();
    repository.save(&job("done", JobStatus::Completed)).await.unwrap();
    std::fs::write(dir.path().join("garbage.json"), b"[]").unwrap();
    std::fs::write(dir.path().join(".partial.tmp"), b"{").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

    let transcribing = repository.list_by_status(JobStatus::Transcribing).await.unwrap();

    let ids: Vec<&str> = transcribing.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["older", "newer"]);
}

#[tokio::test]
async fn given_saved_job_when_deleting_twice_then_both_calls_succeed() {
    let dir = TempDir::new().unwrap();
    let repository = FileJobRepository::new(dir.path()).unwrap();
    let record = job("gone", JobStatus::Completed);
    repository.save(&record).await.unwrap();

    repository.delete(&record.id).await.unwrap();
    repository.delete(&record.id).await.unwrap();

    assert!(repository.load(&record.id).await.unwrap().is_none());
}

#[tokio::test]
async fn given_record_with_legacy_status_names_when_loading_then_statuses_are_mapped() {
    let dir = TempDir::new().unwrap();
    let repository = FileJobRepository::new(dir.path()).unwrap();
    let raw = r#"{
        "id": "legacy",
        "status": "downloading_audio",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:05:00Z"
    }"#;
    std::fs::write(dir.path().join("legacy.json"), raw).unwrap();

    let loaded = repository
        .load(&JobId::parse("legacy").unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(loaded.status, JobStatus::FetchingAudio);
    assert_eq!(loaded.speaker_settings, SpeakerSettings::default());
    assert!(loaded.data.text.is_none());
}

#[tokio::test]
async fn given_file_provider_settings_when_creating_repository_then_records_land_in_configured_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("jobs");
    let settings = JobStoreSettings {
        provider: JobStoreProvider::File,
        path: path.to_string_lossy().into_owned(),
    };

    let repository = JobRepositoryFactory::create(&settings).unwrap();
    repository.save(&job("factory", JobStatus::Init)).await.unwrap();

    assert!(path.join("factory.json").exists());
}
