//! Terminal Service: the lifecycle contract callers drive a fleet
//! through. Holds its collaborators as `Arc`s and sequences fallible
//! steps with explicit rollback on failure, so a terminal is either
//! fully registered or leaves no trace.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::log_reader::LogReader;
use crate::model::{OutputMode, ProviderKind, Terminal};
use crate::multiplexer::MultiplexerClient;
use crate::provider_manager::ProviderManager;
use crate::store::MetadataStore;
use std::sync::Arc;
use tracing::{info, warn};

pub struct TerminalService {
    mux: Arc<dyn MultiplexerClient>,
    store: Arc<MetadataStore>,
    providers: Arc<ProviderManager>,
    log_reader: Arc<LogReader>,
    config: CoreConfig,
}

impl TerminalService {
    pub fn new(
        mux: Arc<dyn MultiplexerClient>,
        store: Arc<MetadataStore>,
        providers: Arc<ProviderManager>,
        log_reader: Arc<LogReader>,
        config: CoreConfig,
    ) -> Self {
        Self { mux, store, providers, log_reader, config }
    }

    /// Allocate a terminal: a multiplexer window, persisted metadata, and
    /// an initialized provider. Either the terminal is fully registered, or
    /// no trace remains.
    pub async fn create_terminal(
        &self,
        provider_kind: ProviderKind,
        agent_profile: Option<String>,
        session_name: Option<String>,
    ) -> CoreResult<Terminal> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = session_name.unwrap_or_else(|| format!("fleet-{}", &id[..8]));
        let window = format!("w-{}", &id[..8]);

        self.mux.create_window(&session, &window).await?;

        let terminal = Terminal {
            id: id.clone(),
            session: session.clone(),
            window: window.clone(),
            provider_kind: provider_kind.clone(),
            agent_profile,
            created_at: chrono::Utc::now(),
        };

        if let Err(e) = self.store.insert_terminal(terminal.clone()) {
            warn!(terminal_id = %id, "rolling back window after metadata persistence failure");
            let _ = self.mux.destroy_window(&session, &window).await;
            return Err(e);
        }

        let mut provider = self.providers.new_provider(&provider_kind);
        if let Err(e) = provider.initialize(self.mux.as_ref(), &session, &window, &self.config).await {
            warn!(terminal_id = %id, error = %e, "rolling back terminal after provider init failure");
            let _ = self.store.remove_terminal(&id);
            let _ = self.mux.destroy_window(&session, &window).await;
            return Err(e);
        }

        self.providers.create_provider(&id, provider);
        info!(terminal_id = %id, session = %session, window = %window, "terminal created");
        Ok(terminal)
    }

    /// Order: provider cleanup, multiplexer window destroy, metadata
    /// removal, log reader reset. `graceful` additionally sends the
    /// provider's `exit_cli()` command before any teardown.
    pub async fn destroy_terminal(&self, id: &str, graceful: bool) -> CoreResult<()> {
        let terminal = self.store.get_terminal(id)?;

        if graceful {
            if let Ok(handle) = self.providers.get_provider(id) {
                let exit_command = handle.lock().await.exit_cli().to_string();
                let _ = self.mux.send_keys(&terminal.session, &terminal.window, &exit_command).await;
            }
        }

        self.providers.cleanup_provider(id).await;
        self.mux.destroy_window(&terminal.session, &terminal.window).await?;
        self.store.remove_terminal(id)?;
        self.log_reader.reset_terminal(id);
        info!(terminal_id = %id, "terminal destroyed");
        Ok(())
    }

    /// Looks up the provider (implicitly ensures the terminal exists) then
    /// forwards keystrokes. No state-machine gating here — the
    /// scheduler is the only caller expected to gate on provider status.
    pub async fn send_input(&self, id: &str, text: &str) -> CoreResult<()> {
        let terminal = self.store.get_terminal(id)?;
        self.mux.send_keys(&terminal.session, &terminal.window, text).await
    }

    pub async fn get_output(&self, id: &str, mode: OutputMode) -> CoreResult<String> {
        let terminal = self.store.get_terminal(id)?;
        match mode {
            OutputMode::Full => self.mux.get_history(&terminal.session, &terminal.window, None).await,
            OutputMode::Recent => {
                self.mux
                    .get_history(&terminal.session, &terminal.window, Some(self.config.status_tail_lines))
                    .await
            }
            OutputMode::Last => {
                let scrollback = self.mux.get_history(&terminal.session, &terminal.window, None).await?;
                let handle = self.providers.get_provider(id)?;
                let result = handle.lock().await.extract_last_message_from_script(&scrollback);
                result
            }
        }
    }

    pub fn list_terminals(&self) -> Vec<Terminal> {
        self.store.list_terminals()
    }

    pub fn list_sessions(&self) -> Vec<String> {
        self.store.list_sessions()
    }

    pub fn list_session_terminals(&self, session: &str) -> Vec<Terminal> {
        self.store.list_session_terminals(session)
    }

    pub fn get_terminal(&self, id: &str) -> CoreResult<Terminal> {
        self.store.get_terminal(id)
    }
}

#[cfg(test)]
#[path = "terminal_service_tests.rs"]
mod tests;
