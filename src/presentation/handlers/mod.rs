mod error;
mod health;
mod jobs;
mod upload;

pub use error::ErrorResponse;
pub use health::health_handler;
pub use jobs::{
    delete_job_handler, job_status_handler, resume_job_handler, submit_job_handler,
    update_speakers_handler,
};
pub use upload::upload_handler;
