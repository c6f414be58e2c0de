//! Provider state machine.
//!
//! Classification is a pure function from a scrollback snapshot to a
//! status enum: normalized lines are scanned against signal phrases in a
//! fixed priority order (fatal marker, approval prompt, marker position).

mod droid;
mod generic;
mod normalize;

pub use droid::DroidProvider;
pub use generic::GenericMarkerProvider;

use crate::error::{CoreError, CoreResult};
use crate::model::ProviderKind;
use crate::multiplexer::MultiplexerClient;
use crate::CoreConfig;
use regex::Regex;
use std::time::Instant;

/// Computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Idle,
    Processing,
    WaitingUserAnswer,
    Completed,
    Error,
}

impl ProviderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Processing => "PROCESSING",
            Self::WaitingUserAnswer => "WAITING_USER_ANSWER",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
        }
    }

    /// Whether the scheduler is allowed to deliver to a recipient in this
    /// state.
    pub fn is_deliverable(&self) -> bool {
        matches!(self, Self::Idle | Self::Completed)
    }
}

/// Shared capability interface every agent kind implements. No inheritance hierarchy.
#[async_trait::async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> &ProviderKind;

    /// Wait for a usable shell, launch the agent, and poll until IDLE.
    /// Idempotent only while `is_initialized()` is false.
    async fn initialize(
        &mut self,
        mux: &dyn MultiplexerClient,
        session: &str,
        window: &str,
        cfg: &CoreConfig,
    ) -> CoreResult<()>;

    fn is_initialized(&self) -> bool;

    /// Force the initialized flag without driving the multiplexer. Used
    /// only by [`rehydrate_provider`] to rebuild a provider from persisted
    /// metadata.
    fn set_initialized(&mut self, value: bool);

    /// Pure function of `scrollback`; never mutates state.
    fn get_status(&self, scrollback: &str, tail_lines: Option<usize>) -> ProviderStatus;

    /// Isolate the agent's most recent final reply from a scrollback dump.
    fn extract_last_message_from_script(&self, text: &str) -> CoreResult<String>;

    /// The textual command that cleanly exits the agent.
    fn exit_cli(&self) -> &str;

    /// Regex matching the agent's ready-for-input prompt.
    fn idle_pattern(&self) -> &Regex;

    /// Resets `initialized`.
    fn cleanup(&mut self);
}

/// Build an uninitialized provider for `kind`. `Custom` kinds fall back to the generic marker provider with a
/// conservative default prompt, since no provider-specific parsing rules
/// exist for an unregistered kind.
pub fn build_provider(kind: &ProviderKind) -> Box<dyn Provider> {
    match kind {
        ProviderKind::Droid => Box::new(DroidProvider::new()),
        ProviderKind::QCli => Box::new(GenericMarkerProvider::q_cli()),
        ProviderKind::KiroCli => Box::new(GenericMarkerProvider::kiro_cli()),
        ProviderKind::ClaudeCode => Box::new(GenericMarkerProvider::claude_code()),
        ProviderKind::Codex => Box::new(GenericMarkerProvider::codex()),
        ProviderKind::OpenAutoglm => Box::new(GenericMarkerProvider::open_autoglm()),
        ProviderKind::Custom(name) => Box::new(GenericMarkerProvider::custom(name.clone())),
    }
}

/// Build a provider already marked initialized, for Provider Manager
/// rehydration from persisted metadata: this never
/// touches the multiplexer.
pub fn rehydrate_provider(kind: &ProviderKind) -> Box<dyn Provider> {
    let mut provider = build_provider(kind);
    provider.set_initialized(true);
    provider
}

/// Shared polling loop used by every provider's `initialize()`: wait for a
/// usable shell, send the launch command, then poll `get_status` at 1 Hz
/// until IDLE.
pub(crate) async fn drive_initialize(
    mux: &dyn MultiplexerClient,
    session: &str,
    window: &str,
    launch_command: &str,
    cfg: &CoreConfig,
    get_status: impl Fn(&str) -> ProviderStatus,
) -> CoreResult<()> {
    wait_for_shell(mux, session, window, cfg).await?;
    mux.send_keys(session, window, launch_command).await?;
    wait_until_idle(mux, session, window, cfg, get_status).await
}

async fn wait_for_shell(mux: &dyn MultiplexerClient, session: &str, window: &str, cfg: &CoreConfig) -> CoreResult<()> {
    let deadline = Instant::now() + cfg.shell_wait_timeout;
    loop {
        if mux.has_window(session, window).await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(CoreError::Timeout(format!("shell not ready in {session}:{window}")));
        }
        tokio::time::sleep(cfg.init_poll_interval).await;
    }
}

async fn wait_until_idle(
    mux: &dyn MultiplexerClient,
    session: &str,
    window: &str,
    cfg: &CoreConfig,
    get_status: impl Fn(&str) -> ProviderStatus,
) -> CoreResult<()> {
    let deadline = Instant::now() + cfg.init_timeout;
    loop {
        let scrollback = mux.get_history(session, window, None).await?;
        if get_status(&scrollback) == ProviderStatus::Idle {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(CoreError::Timeout(format!("{session}:{window} never reached IDLE")));
        }
        tokio::time::sleep(cfg.init_poll_interval).await;
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
