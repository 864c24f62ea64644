//! HTTP server command implementation.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::signal;
use tracing::{info, warn};

use proctrack::build_info;
use proctrack::config::{self, Config, StoreBackend};
use proctrack::server::{self, AppState};
use proctrack::store::file::FileDocumentStore;
use proctrack::store::memory::{MemoryLogStore, MemoryProcessStore};
use proctrack::store::{LogStore, ProcessStore};

pub async fn run(
    config_path: &str,
    host_override: Option<IpAddr>,
    port_override: Option<u16>,
    data_dir_override: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load(config_path)
        .await
        .with_context(|| format!("loading config from {config_path}"))?;

    // Environment overrides config file, CLI overrides both
    config.apply_env_overrides()?;
    if let Some(host) = host_override {
        config.server.host = host.to_string();
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }
    if let Some(dir) = data_dir_override {
        config.database.path = dir.to_path_buf();
    }

    if config.scheduler.tick_interval_ms == 0 {
        bail!("scheduler.tick_interval_ms must be greater than zero");
    }
    let tick_interval = config.scheduler.tick_interval();

    let (processes, logs) = open_stores(Path::new(config_path), &config).await?;

    let state = AppState::new(processes, logs, tick_interval);
    let registry = state.registry.clone();
    let app = server::build_app(state);

    let ip: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host '{}'", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(version = %build_info::version_string(), "Starting proctrack");
    info!(
        addr = %addr,
        tick_interval_ms = config.scheduler.tick_interval_ms,
        "Server running on port {}",
        config.server.port
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Stop every tick loop, letting in-flight appends finish
    let active = registry.len();
    registry.shutdown().await;
    info!(processes = active, "Tick loops stopped");

    info!("Server stopped");
    Ok(())
}

/// Open the configured backend. Failure to open the file store is fatal.
async fn open_stores(
    config_path: &Path,
    config: &Config,
) -> Result<(Arc<dyn ProcessStore>, Arc<dyn LogStore>)> {
    match config.database.backend {
        StoreBackend::File => {
            let data_dir: PathBuf = config::resolve_path(config_path, &config.database.path);
            let store = FileDocumentStore::open(&data_dir, &config.database.name)
                .await
                .with_context(|| {
                    format!(
                        "opening database '{}' under {}",
                        config.database.name,
                        data_dir.display()
                    )
                })?;
            info!(path = %store.root().display(), "Connected to database");
            let processes: Arc<dyn ProcessStore> = store.processes();
            let logs: Arc<dyn LogStore> = store.logs();
            Ok((processes, logs))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; processes and logs are lost on exit");
            let processes: Arc<dyn ProcessStore> = Arc::new(MemoryProcessStore::new());
            let logs: Arc<dyn LogStore> = Arc::new(MemoryLogStore::new());
            Ok((processes, logs))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
