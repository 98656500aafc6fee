use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{JobMessage, JobService};
use crate::presentation::config::{ScaffoldConfig, Settings};

#[derive(Clone)]
pub struct AppState {
    pub job_service: Arc<JobService>,
    pub job_sender: mpsc::Sender<JobMessage>,
    pub settings: Settings,
    pub scaffold_config: ScaffoldConfig,
}
