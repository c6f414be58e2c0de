//! Inbox Scheduler: delivers queued messages to idle recipients,
//! fired by filesystem events rather than polling.
//!
//! Grounded in `driver/log_watch.rs`'s `notify` + polling-fallback watcher
//! loop, generalized from "one session's JSONL log" to "every terminal's
//! `<id>.log` under one log root," and from "forward new lines" to
//! "re-evaluate delivery for the terminal whose log changed."

use crate::config::CoreConfig;
use crate::log_reader::LogReader;
use crate::provider::ProviderStatus;
use crate::provider_manager::ProviderManager;
use crate::store::MetadataStore;
use crate::terminal_service::TerminalService;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub struct InboxScheduler {
    log_root: PathBuf,
    store: Arc<MetadataStore>,
    providers: Arc<ProviderManager>,
    log_reader: Arc<LogReader>,
    terminals: Arc<TerminalService>,
    config: CoreConfig,
    poll_interval: Duration,
}

impl InboxScheduler {
    pub fn new(
        log_root: impl Into<PathBuf>,
        store: Arc<MetadataStore>,
        providers: Arc<ProviderManager>,
        log_reader: Arc<LogReader>,
        terminals: Arc<TerminalService>,
        config: CoreConfig,
    ) -> Self {
        Self { log_root: log_root.into(), store, providers, log_reader, terminals, config, poll_interval: Duration::from_secs(5) }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Runs until `shutdown` is cancelled. A terminal whose log has not
    /// changed does not get re-evaluated; the poll interval is only a
    /// fallback for missed filesystem events.
    pub async fn run(self, shutdown: CancellationToken) {
        let (wake_tx, mut wake_rx) = mpsc::channel::<String>(64);
        let _watcher = self.setup_notify_watcher(wake_tx);

        let mut fallback = tokio::time::interval(self.poll_interval);

        loop {
            let woken_id = tokio::select! {
                _ = shutdown.cancelled() => break,
                id = wake_rx.recv() => id,
                _ = fallback.tick() => None,
            };

            match woken_id {
                Some(id) => self.evaluate(&id).await,
                None => self.evaluate_all().await,
            }
        }
    }

    fn setup_notify_watcher(&self, wake_tx: mpsc::Sender<String>) -> Option<notify::RecommendedWatcher> {
        use notify::{RecursiveMode, Watcher};

        let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
            let Ok(event) = event else { return };
            for path in event.paths {
                if let Some(id) = terminal_id_from_log_path(&path) {
                    let _ = wake_tx.try_send(id);
                }
            }
        })
        .ok()?;

        std::fs::create_dir_all(&self.log_root).ok()?;
        watcher.watch(&self.log_root, RecursiveMode::NonRecursive).ok()?;
        Some(watcher)
    }

    async fn evaluate_all(&self) {
        for terminal in self.store.list_terminals() {
            self.evaluate(&terminal.id).await;
        }
    }

    /// One scheduling pass for a single terminal-id.
    async fn evaluate(&self, id: &str) {
        let Some(message) = self.store.oldest_pending(id) else {
            return;
        };

        let handle = match self.providers.get_provider(id) {
            Ok(handle) => handle,
            Err(_) => return,
        };

        let idle_pattern = { handle.lock().await.idle_pattern().clone() };

        let synced = match self.log_reader.sync_and_check(id, &idle_pattern) {
            Ok(synced) => synced,
            Err(e) => {
                warn!(terminal_id = id, error = %e, "log reader I/O failure during scheduling");
                return;
            }
        };
        let Some(_buffer) = synced else {
            return;
        };

        let status_tail_lines = self.config.scheduler_tail_floor;
        let scrollback = match self.terminals.get_output(id, crate::model::OutputMode::Full).await {
            Ok(s) => s,
            Err(_) => return,
        };
        let status = { handle.lock().await.get_status(&scrollback, Some(status_tail_lines)) };
        if !matches!(status, ProviderStatus::Idle | ProviderStatus::Completed) {
            return;
        }

        match self.terminals.send_input(id, &message.body).await {
            Ok(()) => {
                if let Err(e) = self.store.try_mark_delivered(&message.id) {
                    error!(terminal_id = id, message_id = %message.id, error = %e, "failed to record delivery");
                }
                info!(terminal_id = id, message_id = %message.id, "message delivered");
            }
            Err(e) => {
                let delivery_err = crate::error::CoreError::DeliveryFailure {
                    message_id: message.id.clone(),
                    reason: e.to_string(),
                };
                error!(terminal_id = id, error = %delivery_err, "delivery failed");
                let _ = self.store.try_mark_failed(&message.id);
            }
        }
    }
}

/// `<log_root>/<id>.log` -> `id`.
fn terminal_id_from_log_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if path.extension().and_then(|e| e.to_str()) == Some("log") {
        Some(stem.to_string())
    } else {
        None
    }
}

#[cfg(test)]
#[path = "inbox_scheduler_tests.rs"]
mod tests;
