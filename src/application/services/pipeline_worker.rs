use std::sync::Arc;

use tokio::sync::mpsc;

use super::job_service::{JobService, JobServiceError};
use crate::domain::JobId;

pub struct JobMessage {
    pub job_id: JobId,
}

/// Consumes queued job ids and runs each one on its own task.
pub struct PipelineWorker {
    receiver: mpsc::Receiver<JobMessage>,
    job_service: Arc<JobService>,
}

impl PipelineWorker {
    pub fn new(receiver: mpsc::Receiver<JobMessage>, job_service: Arc<JobService>) -> Self {
        Self {
            receiver,
            job_service,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Pipeline worker started");
        while let Some(msg) = self.receiver.recv().await {
            let job_service = Arc::clone(&self.job_service);
            tokio::spawn(async move {
                match job_service.resume(&msg.job_id).await {
                    Ok(job) => {
                        tracing::info!(job_id = %msg.job_id, status = %job.status, "Job finished");
                    }
                    Err(JobServiceError::AlreadyRunning(_)) => {
                        tracing::debug!(job_id = %msg.job_id, "Job already running, skipping");
                    }
                    Err(e) => {
                        tracing::error!(job_id = %msg.job_id, error = %e, "Job failed");
                    }
                }
            });
        }
        tracing::info!("Pipeline worker stopped: channel closed");
    }
}
