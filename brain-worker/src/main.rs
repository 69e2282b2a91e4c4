//! The Brain Worker: a separate process that pulls jobs off
//! `jobs.dispatch` and runs them to completion (SPEC_FULL.md §2, §4.5).
//!
//! Every worker process that shares a queue group name competes for the
//! same durable consumer, so a `JobDispatch` lands on exactly one of
//! them. Status is published `received -> running -> (completed|failed)`;
//! Brain only acts on the terminal transition.

mod config;
mod error;
mod exec;
mod tools;
mod vars;

use std::sync::Arc;
use std::time::Instant;

use brain_bus::BusClient;
use brain_proto::bus::{JobDispatch, JobState, JobStatus};
use brain_proto::Turn;
use brain_store::Store;
use config::{Config, ConfigError, ProviderKind};
use error::ExecError;

#[derive(Debug, thiserror::Error)]
enum WorkerError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("bus: {0}")]
    Bus(#[from] brain_bus::BusError),
    #[error("store: {0}")]
    Store(#[from] brain_store::StoreError),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "brain-worker: fatal startup error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), WorkerError> {
    let config = Config::from_env()?;
    tracing::info!(worker_id = %config.worker_id, queue_group = %config.queue_group, "brain-worker: starting");

    let bus = BusClient::connect(&config.nats_url).await?;
    let store = Store::open(&config.store_path).await?;
    let stream = bus
        .ensure_stream(
            "jobs",
            vec![
                brain_bus::subjects::JOBS_DISPATCH.to_string(),
                brain_bus::subjects::JOBS_STATUS_WILDCARD.to_string(),
            ],
        )
        .await?;
    let consumer = bus
        .durable_consumer(
            &stream,
            &config.queue_group,
            brain_bus::subjects::JOBS_DISPATCH,
            config.job_timeout + std::time::Duration::from_secs(5),
            3,
        )
        .await?;

    let state_store: Arc<brain_state_memory::MemoryStore> =
        Arc::new(brain_state_memory::MemoryStore::new());
    let turn = build_turn(&config, bus.clone(), store.clone(), state_store.clone());
    let state_store: Arc<dyn brain_proto::StateStore> = state_store;

    tracing::info!("brain-worker: ready, pulling jobs");
    loop {
        let delivered = match consumer.next::<JobDispatch>().await {
            Ok(delivered) => delivered,
            Err(err) => {
                tracing::warn!(error = %err, "brain-worker: fetch failed, retrying");
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                continue;
            }
        };
        let job = delivered.payload.clone();
        delivered.ack().await.ok();
        process_job(&bus, &config, &turn, &state_store, job).await;
    }
}

async fn process_job(
    bus: &BusClient,
    config: &Config,
    turn: &Arc<dyn Turn>,
    state_store: &Arc<dyn brain_proto::StateStore>,
    job: JobDispatch,
) {
    let job_id = job.job_id.clone();
    tracing::info!(job_id = %job_id, job_type = ?job.job_type, "brain-worker: received job");
    publish_status(bus, &config.worker_id, &job_id, JobState::Received, None, None, None).await;
    publish_status(bus, &config.worker_id, &job_id, JobState::Running, None, None, None).await;

    let start = Instant::now();
    let outcome = tokio::time::timeout(
        config.job_timeout,
        exec::dispatch(&job, turn, state_store, &config.command_workdir),
    )
    .await
    .unwrap_or(Err(ExecError::Timeout));
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(result) => {
            tracing::info!(job_id = %job_id, duration_ms, "brain-worker: job completed");
            publish_status(bus, &config.worker_id, &job_id, JobState::Completed, Some(result), None, Some(duration_ms)).await;
        }
        Err(err) => {
            tracing::warn!(job_id = %job_id, error = %err, duration_ms, "brain-worker: job failed");
            publish_status(bus, &config.worker_id, &job_id, JobState::Failed, None, Some(err.to_string()), Some(duration_ms)).await;
        }
    }
}

async fn publish_status(
    bus: &BusClient,
    worker_id: &str,
    job_id: &str,
    status: JobState,
    result: Option<serde_json::Value>,
    error: Option<String>,
    duration_ms: Option<u64>,
) {
    let mut status = JobStatus::new(job_id, worker_id, status);
    status.result = result;
    status.error = error;
    status.duration_ms = duration_ms;
    if let Err(err) = bus.publish(&brain_bus::subjects::job_status(job_id), &status).await {
        tracing::error!(job_id = %job_id, error = %err, "brain-worker: failed to publish job status");
    }
}

fn build_turn(
    config: &Config,
    bus: BusClient,
    store: Store,
    state_store: Arc<brain_state_memory::MemoryStore>,
) -> Arc<dyn Turn> {
    let tools = build_tools(bus, store);
    let context_strategy: Box<dyn brain_model::context::ContextStrategy> =
        Box::new(brain_context::SlidingWindow::new());
    let mut hooks = brain_hooks::HookRegistry::new();
    hooks.add(Arc::new(brain_hook_security::RedactionHook::new()));
    hooks.add(Arc::new(brain_hook_security::ExfilGuardHook::new()));
    let state_reader: Arc<dyn brain_proto::StateReader> = state_store;

    let react_config = brain_agent::ReactConfig {
        default_model: config.model.clone(),
        ..brain_agent::ReactConfig::default()
    };

    match config.provider {
        ProviderKind::Anthropic => Arc::new(brain_agent::ReactTurn::new(
            brain_provider_anthropic::AnthropicProvider::new(config.provider_api_key.clone().unwrap_or_default()),
            tools,
            context_strategy,
            hooks,
            state_reader,
            react_config,
        )),
        ProviderKind::OpenAi => Arc::new(brain_agent::ReactTurn::new(
            brain_provider_openai::OpenAIProvider::new(config.provider_api_key.clone().unwrap_or_default()),
            tools,
            context_strategy,
            hooks,
            state_reader,
            react_config,
        )),
        ProviderKind::Ollama => Arc::new(brain_agent::ReactTurn::new(
            brain_provider_ollama::OllamaProvider::new(),
            tools,
            context_strategy,
            hooks,
            state_reader,
            react_config,
        )),
    }
}

/// Composes the built-ins behind a [`brain_tool::UnifiedRegistry`] and
/// flattens it into the plain `ToolRegistry` `ReactTurn` is generic
/// over — see `brain`'s own `build_tools` for the same shape.
fn build_tools(bus: BusClient, store: Store) -> brain_tool::ToolRegistry {
    let mut unified = brain_tool::UnifiedRegistry::new();
    unified.register_builtin(Arc::new(tools::DispatchJobTool::new(bus, store.clone())));
    unified.register_builtin(Arc::new(tools::GetJobStatusTool::new(store.clone())));
    unified.register_builtin(Arc::new(tools::ListJobsTool::new(store)));

    let mut flat = brain_tool::ToolRegistry::new();
    for tool in unified.list() {
        flat.register(tool);
    }
    flat
}
