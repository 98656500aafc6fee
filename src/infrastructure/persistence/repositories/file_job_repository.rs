use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{JobId, JobRecord, JobStatus};

const RECORD_EXTENSION: &str = "json";

/// One `{job_id}.json` file per job.
///
/// Writes go to a temporary file in the same directory, are fsynced, renamed over the
/// record and followed by a directory fsync, so a reader sees either the old or the new
/// record and a returned `save` survives a crash.
pub struct FileJobRepository {
    root: PathBuf,
}

impl FileJobRepository {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn record_path(&self, id: &JobId) -> PathBuf {
        self.root.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    fn parse(id: &str, raw: &[u8]) -> Result<JobRecord, RepositoryError> {
        serde_json::from_slice(raw).map_err(|e| RepositoryError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl JobRepository for FileJobRepository {
    #[instrument(skip(self), fields(job_id = %id))]
    async fn load(&self, id: &JobId) -> Result<Option<JobRecord>, RepositoryError> {
        match tokio::fs::read(self.record_path(id)).await {
            Ok(raw) => Self::parse(id.as_str(), &raw).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepositoryError::Io(e)),
        }
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, status = %job.status))]
    async fn save(&self, job: &JobRecord) -> Result<(), RepositoryError> {
        let payload = serde_json::to_vec_pretty(job)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let root = self.root.clone();
        let target = self.record_path(&job.id);

        tokio::task::spawn_blocking(move || write_atomic(&root, &target, &payload))
            .await
            .map_err(|e| RepositoryError::Io(io::Error::other(e)))??;

        tracing::debug!("Job record committed");
        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        match tokio::fs::remove_file(self.record_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepositoryError::Io(e)),
        }
    }

    #[instrument(skip(self))]
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<JobRecord>, RepositoryError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut jobs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.starts_with('.')
                || path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION)
            {
                continue;
            }

            let raw = tokio::fs::read(&path).await?;
            match Self::parse(stem, &raw) {
                Ok(job) if job.status == status => jobs.push(job),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable job record"),
            }
        }

        jobs.sort_by_key(|job| job.created_at);
        Ok(jobs)
    }
}

fn write_atomic(root: &Path, target: &Path, payload: &[u8]) -> io::Result<()> {
    let temp = root.join(format!(".{}.tmp", Uuid::new_v4()));

    let written = File::create(&temp).and_then(|mut file| {
        file.write_all(payload)?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&temp, target)) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }

    sync_dir(root)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
