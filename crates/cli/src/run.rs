//! Composition root: wires the core collaborators together, spawns the
//! inbox scheduler, and serves the Control API until shutdown. A signal
//! handler cancels a shared [`CancellationToken`] on first SIGTERM/SIGINT.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use fleet_core::log_reader::LogReader;
use fleet_core::multiplexer::{MultiplexerClient, TmuxMultiplexer};
use fleet_core::provider_manager::ProviderManager;
use fleet_core::store::MetadataStore;
use fleet_core::terminal_service::TerminalService;
use fleet_core::inbox_scheduler::InboxScheduler;

use crate::config::Config;
use crate::http::{build_router, AppState};

/// Build every collaborator, spawn the scheduler and signal handler, and
/// serve the Control API on `config.host:config.port` until shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = Arc::new(MetadataStore::open(config.store_path())?);
    let providers = Arc::new(ProviderManager::new(store.clone()));
    let log_reader = Arc::new(LogReader::new(config.log_root(), config.to_core_config().line_buffer_capacity));
    let mux: Arc<dyn MultiplexerClient> = match config.tmux_socket.clone() {
        Some(socket) => Arc::new(TmuxMultiplexer::with_socket(socket)),
        None => Arc::new(TmuxMultiplexer::new()),
    };
    let terminals =
        Arc::new(TerminalService::new(mux, store.clone(), providers.clone(), log_reader.clone(), config.to_core_config()));

    let shutdown = CancellationToken::new();

    let scheduler = InboxScheduler::new(
        config.log_root(),
        store.clone(),
        providers,
        log_reader,
        terminals.clone(),
        config.to_core_config(),
    )
    .with_poll_interval(std::time::Duration::from_secs(config.scheduler_poll_secs));
    let scheduler_shutdown = shutdown.clone();
    tokio::spawn(async move {
        scheduler.run(scheduler_shutdown).await;
    });

    let state = Arc::new(AppState { terminals, store });
    let router = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "fleetd listening");

    spawn_signal_handler(shutdown.clone());

    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => info!("received SIGTERM"),
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => info!("received SIGINT"),
        }

        shutdown.cancel();
    });
}
