//! The Brain daemon: one long-lived process wiring the bus, store,
//! memory, agent loop, scheduler, task manager, transfer handshake, and
//! HTTP surface together (SPEC_FULL.md §4, §8).

mod config;
mod tools;

use std::sync::Arc;

use brain::prelude::*;
use brain_bus::BusClient;
use brain_dispatch::JobEvents;
use brain_memory::{HttpEmbedder, MemoryService, Observer, ProviderObserver, VectorStore};
use brain_schedule::ScheduleManager;
use brain_store::Store;
use config::{Config, ConfigError, ProviderKind};

/// Errors that can abort daemon startup. Everything after startup is
/// handled in place (logged, retried, or surfaced to the caller) rather
/// than propagated here.
#[derive(Debug, thiserror::Error)]
enum BrainError {
    /// Reading configuration from the environment failed.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    /// Opening the relational store failed.
    #[error("store: {0}")]
    Store(#[from] brain_store::StoreError),
    /// Opening the vector store failed.
    #[error("vectors: {0}")]
    Vectors(#[from] brain_memory::MemoryError),
    /// Connecting to the bus failed.
    #[error("bus: {0}")]
    Bus(#[from] brain_bus::BusError),
    /// Starting the schedule manager failed.
    #[error("schedules: {0}")]
    Schedule(#[from] brain_schedule::ScheduleError),
    /// Subscribing the status tracker to job updates failed.
    #[error("dispatch: {0}")]
    Dispatch(#[from] brain_dispatch::DispatchError),
    /// Binding the HTTP listener failed.
    #[error("http bind: {0}")]
    Bind(#[source] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "brain: fatal startup error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BrainError> {
    let config = Config::from_env()?;

    tracing::info!(instance_id = %config.instance_id, version = %config.version, "brain: starting");

    let store = Store::open(&config.store_path).await?;
    let vectors = VectorStore::open(&config.vector_path)?;
    let bus = BusClient::connect(&config.nats_url).await?;

    let memory = build_memory(&config, store.clone(), vectors);
    let state_store: Arc<brain_state_memory::MemoryStore> =
        Arc::new(brain_state_memory::MemoryStore::new());
    let turn = build_turn(&config, bus.clone(), store.clone(), state_store.clone());

    let schedules = Arc::new(ScheduleManager::new(store.clone(), bus.clone()));
    schedules.start().await?;

    let events = JobEvents::new();
    spawn_status_tracker(&bus, store.clone(), events.clone()).await?;
    tokio::spawn(brain_dispatch::run_reaper(store.clone(), events.clone()));

    let transfer = Arc::new(brain_transfer::TransferCoordinator::new(
        store.clone(),
        bus.clone(),
        config.instance_id.clone(),
        config.version.clone(),
    ));
    match transfer.join().await {
        Ok(outcome) => tracing::info!(?outcome, "brain: transfer join complete, now active"),
        Err(err) => tracing::warn!(error = %err, "brain: transfer handshake failed, serving anyway"),
    }
    spawn_handoff_listener(&bus, transfer).await?;

    let state = brain_http::AppState::new(
        store,
        memory,
        turn,
        state_store,
        schedules,
        config.http_token.clone(),
        &config.secrets_key,
        std::collections::HashMap::new(),
    );
    let app = brain_http::router(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .map_err(BrainError::Bind)?;
    tracing::info!(addr = %config.http_addr, "brain: http surface listening");
    axum::serve(listener, app).await.map_err(BrainError::Bind)?;

    Ok(())
}

fn build_memory(config: &Config, store: Store, vectors: VectorStore) -> MemoryService {
    let embedder = Box::new(HttpEmbedder::new(
        config.embedding_api_url.clone(),
        config.embedding_model.clone(),
    ));
    let observer = build_observer(config);
    MemoryService::new(
        store,
        vectors,
        embedder,
        observer,
        config.memory_obs_threshold,
        config.memory_ref_threshold,
    )
}

/// An `Observer` needs its own `Provider`, independent of the agent
/// loop's — memory extraction runs on `MemoryService::on_turn`, outside
/// any particular turn. Ollama needs no key; the hosted providers do, and
/// `Config::from_env` already validated one is present for the selected
/// kind.
fn build_observer(config: &Config) -> Option<Box<dyn Observer>> {
    match config.provider {
        ProviderKind::Anthropic => {
            let key = config.provider_api_key.clone()?;
            Some(Box::new(ProviderObserver::new(
                brain_provider_anthropic::AnthropicProvider::new(key),
                config.model.clone(),
            )))
        }
        ProviderKind::OpenAi => {
            let key = config.provider_api_key.clone()?;
            Some(Box::new(ProviderObserver::new(
                brain_provider_openai::OpenAIProvider::new(key),
                config.model.clone(),
            )))
        }
        ProviderKind::Ollama => Some(Box::new(ProviderObserver::new(
            brain_provider_ollama::OllamaProvider::new(),
            config.model.clone(),
        ))),
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
    let hooks = build_hooks();
    let state_reader: Arc<dyn StateReader> = state_store;

    let react_config = ReactConfig {
        default_model: config.model.clone(),
        ..ReactConfig::default()
    };

    match config.provider {
        ProviderKind::Anthropic => Arc::new(ReactTurn::new(
            brain_provider_anthropic::AnthropicProvider::new(
                config.provider_api_key.clone().unwrap_or_default(),
            ),
            tools,
            context_strategy,
            hooks,
            state_reader,
            react_config,
        )),
        ProviderKind::OpenAi => Arc::new(ReactTurn::new(
            brain_provider_openai::OpenAIProvider::new(
                config.provider_api_key.clone().unwrap_or_default(),
            ),
            tools,
            context_strategy,
            hooks,
            state_reader,
            react_config,
        )),
        ProviderKind::Ollama => Arc::new(ReactTurn::new(
            brain_provider_ollama::OllamaProvider::new(),
            tools,
            context_strategy,
            hooks,
            state_reader,
            react_config,
        )),
    }
}

/// Composes the built-ins behind a [`brain_tool::UnifiedRegistry`] (per
/// SPEC_FULL.md §4.4's precedence ordering), then flattens it into the
/// plain [`brain_tool::ToolRegistry`] `ReactTurn` is generic over —
/// `UnifiedRegistry` only matters for its registration-order precedence,
/// not for the shape the agent loop looks tools up through.
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

fn build_hooks() -> HookRegistry {
    let mut hooks = HookRegistry::new();
    hooks.add(Arc::new(RedactionHook::new()));
    hooks.add(Arc::new(ExfilGuardHook::new()));
    hooks
}

/// Watch for a successor instance announcing itself and hand off (spec
/// §4.8 step 2 onward). `brain-transfer` exposes `join`/`serve_handoff`
/// but leaves the `transfer.ready` subscription to the caller, since
/// only the caller knows when it's safe to stop accepting new requests.
///
/// The drain here is a fixed grace period rather than a true in-flight
/// request count — `brain-http` doesn't currently expose one, so this
/// is an approximation of the "finish in-flight requests" step.
async fn spawn_handoff_listener(
    bus: &BusClient,
    transfer: Arc<brain_transfer::TransferCoordinator>,
) -> Result<(), BrainError> {
    let stream = bus
        .ensure_stream(
            "transfer",
            vec![
                brain_bus::subjects::TRANSFER_READY.to_string(),
                brain_bus::subjects::TRANSFER_CLEAR.to_string(),
                brain_bus::subjects::TRANSFER_ACK.to_string(),
                brain_bus::subjects::TRANSFER_ABORT.to_string(),
            ],
        )
        .await?;
    let consumer = bus
        .durable_consumer(
            &stream,
            "brain-handoff-listener",
            brain_bus::subjects::TRANSFER_READY,
            std::time::Duration::from_secs(30),
            5,
        )
        .await
        .ok();
    let Some(consumer) = consumer else {
        tracing::warn!("brain: could not subscribe to transfer.ready, zero-drop handoff disabled");
        return Ok(());
    };

    tokio::spawn(async move {
        loop {
            match consumer.next::<brain_proto::bus::TransferReady>().await {
                Ok(delivered) => {
                    delivered.ack().await.ok();
                    if transfer.state() != brain_transfer::TransferState::Active {
                        continue;
                    }
                    tracing::info!(joiner = %delivered.payload.id, "brain: successor announced, draining");
                    let drain = tokio::time::sleep(std::time::Duration::from_secs(5));
                    if let Err(err) = transfer
                        .serve_handoff(brain_transfer::DRAIN_TIMEOUT, drain, &[], &[])
                        .await
                    {
                        tracing::error!(error = %err, "brain: handoff failed, staying up");
                        continue;
                    }
                    tracing::info!("brain: handoff complete, shutting down");
                    std::process::exit(0);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "brain: transfer listener read failed, retrying");
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                }
            }
        }
    });
    Ok(())
}

async fn spawn_status_tracker(bus: &BusClient, store: Store, events: JobEvents) -> Result<(), BrainError> {
    let stream = bus
        .ensure_stream(
            "jobs",
            vec![
                brain_bus::subjects::JOBS_DISPATCH.to_string(),
                brain_bus::subjects::JOBS_STATUS_WILDCARD.to_string(),
            ],
        )
        .await?;
    let consumer = brain_dispatch::subscribe(bus, &stream, "brain-status-tracker").await?;
    tokio::spawn(brain_dispatch::run_status_tracker(consumer, store, events));
    Ok(())
}
