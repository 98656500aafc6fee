use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use murmur::application::ports::{JobRepository, StagingStore, TextService, TranscriptionEngine};
use murmur::application::services::{
    JobMessage, JobPipeline, JobService, PipelineWorker, TranscriptProcessor,
};
use murmur::infrastructure::audio::{MockTranscriptionEngine, TranscriptionEngineFactory};
use murmur::infrastructure::llm::{ChatTextService, MockTextService};
use murmur::infrastructure::observability::{TracingConfig, init_tracing};
use murmur::infrastructure::persistence::{InMemoryJobRepository, JobRepositoryFactory};
use murmur::infrastructure::storage::{
    ObjectStagingStore, SidecarMetadataProvider, StagingStoreFactory,
};
use murmur::presentation::{AppState, Environment, ScaffoldConfig, Settings, create_router};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

struct Adapters {
    repository: Arc<dyn JobRepository>,
    staging_store: Arc<dyn StagingStore>,
    transcription_engine: Arc<dyn TranscriptionEngine>,
    text_service: Arc<dyn TextService>,
}

fn production_adapters(settings: &Settings) -> anyhow::Result<Adapters> {
    let repository = JobRepositoryFactory::create(&settings.jobs)?;
    let staging_store = StagingStoreFactory::create(&settings.storage)?;

    let transcription_timeout = settings
        .retry
        .transcription_call_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
    let transcription_engine = TranscriptionEngineFactory::create(
        &settings.transcription,
        Arc::clone(&staging_store),
        transcription_timeout,
    )?;

    let text_timeout = settings
        .retry
        .text_call_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
    let text_service = Arc::new(ChatTextService::new(&settings.llm, text_timeout)?);

    Ok(Adapters {
        repository,
        staging_store,
        transcription_engine,
        text_service,
    })
}

fn scaffold_adapters(scaffold_config: &ScaffoldConfig) -> Adapters {
    tracing::warn!("Scaffold mode: using mock transcription and text services");
    Adapters {
        repository: Arc::new(InMemoryJobRepository::new()),
        staging_store: Arc::new(ObjectStagingStore::in_memory()),
        transcription_engine: Arc::new(MockTranscriptionEngine::new(scaffold_config.mock_delay())),
        text_service: Arc::new(MockTextService::new(scaffold_config.mock_delay())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(&TracingConfig::from_settings(&settings.logging, environment));

    let scaffold_config = ScaffoldConfig::default();
    let adapters = if scaffold_config.enabled {
        scaffold_adapters(&scaffold_config)
    } else {
        production_adapters(&settings)?
    };

    let metadata_provider = Arc::new(SidecarMetadataProvider::new(Arc::clone(
        &adapters.staging_store,
    )));
    let processor = TranscriptProcessor::new(
        adapters.text_service,
        settings.retry.text_policy(),
        settings.pipeline.limits(),
    );
    let pipeline = Arc::new(JobPipeline::new(
        Arc::clone(&adapters.repository),
        Arc::clone(&adapters.staging_store),
        adapters.transcription_engine,
        metadata_provider,
        processor,
        settings.retry.transcription_policy(),
    ));
    let job_service = Arc::new(JobService::new(
        adapters.repository,
        adapters.staging_store,
        pipeline,
    ));

    let (job_sender, job_receiver) = mpsc::channel(settings.server.queue_capacity.max(1));
    tokio::spawn(PipelineWorker::new(job_receiver, Arc::clone(&job_service)).run());

    let interrupted = job_service
        .interrupted_jobs()
        .await
        .context("Failed to scan for interrupted jobs")?;
    if !interrupted.is_empty() {
        tracing::info!(jobs = interrupted.len(), "Re-enqueueing interrupted jobs");
        let recovery_sender = job_sender.clone();
        tokio::spawn(async move {
            for job_id in interrupted {
                if recovery_sender.send(JobMessage { job_id }).await.is_err() {
                    tracing::error!("Pipeline worker stopped during recovery");
                    break;
                }
            }
        });
    }

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        job_service,
        job_sender,
        settings,
        scaffold_config,
    };
    let router = create_router(state);

    tracing::info!(environment = %environment, "Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
