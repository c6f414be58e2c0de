//! Multiplexer Client: thin capability surface over an external
//! terminal multiplexer, able to manage many short-lived windows on
//! demand rather than attaching to one session for the process lifetime.

use crate::error::{CoreError, CoreResult};
use std::process::Stdio;

/// Capability surface the rest of the core consumes. Implementations are
/// expected to be cheap to clone — session/window addressing is by name,
/// not by held handle.
#[async_trait::async_trait]
pub trait MultiplexerClient: Send + Sync {
    async fn create_window(&self, session: &str, window: &str) -> CoreResult<()>;
    async fn destroy_window(&self, session: &str, window: &str) -> CoreResult<()>;
    /// Fire-and-forget; appends a newline after `text`.
    async fn send_keys(&self, session: &str, window: &str, text: &str) -> CoreResult<()>;
    /// Returns scrollback decorated with escape sequences — never pre-cleaned.
    async fn get_history(&self, session: &str, window: &str, tail_lines: Option<usize>) -> CoreResult<String>;
    async fn has_window(&self, session: &str, window: &str) -> CoreResult<bool>;
}

/// Real implementation shelling out to the `tmux` binary.
///
/// Every invocation is independent (no long-lived child process held open).
/// A transient `tmux` failure surfaces as
/// [`CoreError::MultiplexerUnavailable`] and the caller (Terminal Service)
/// decides whether to retry.
#[derive(Debug, Clone, Default)]
pub struct TmuxMultiplexer {
    /// Optional `-S <path>` socket passed to every `tmux` invocation.
    socket: Option<std::path::PathBuf>,
}

impl TmuxMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_socket(socket: std::path::PathBuf) -> Self {
        Self { socket: Some(socket) }
    }

    fn cmd(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("tmux");
        if let Some(ref s) = self.socket {
            cmd.arg("-S").arg(s);
        }
        cmd
    }

    /// `session:window` target string tmux expects.
    fn target(session: &str, window: &str) -> String {
        format!("{session}:{window}")
    }
}

#[async_trait::async_trait]
impl MultiplexerClient for TmuxMultiplexer {
    async fn create_window(&self, session: &str, window: &str) -> CoreResult<()> {
        let has_session = self
            .cmd()
            .args(["has-session", "-t", session])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| CoreError::MultiplexerUnavailable(e.to_string()))?
            .success();

        let status = if has_session {
            self.cmd()
                .args(["new-window", "-d", "-t", session, "-n", window])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
        } else {
            self.cmd()
                .args(["new-session", "-d", "-s", session, "-n", window])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
        };

        let status = status.map_err(|e| CoreError::MultiplexerUnavailable(e.to_string()))?;
        if !status.success() {
            return Err(CoreError::MultiplexerUnavailable(format!(
                "tmux failed to create window {}",
                Self::target(session, window)
            )));
        }
        Ok(())
    }

    async fn destroy_window(&self, session: &str, window: &str) -> CoreResult<()> {
        let _ = self
            .cmd()
            .args(["kill-window", "-t", &Self::target(session, window)])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| CoreError::MultiplexerUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn send_keys(&self, session: &str, window: &str, text: &str) -> CoreResult<()> {
        let target = Self::target(session, window);
        let status = self
            .cmd()
            .args(["send-keys", "-l", "-t", &target, text])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| CoreError::MultiplexerUnavailable(e.to_string()))?;
        if !status.success() {
            return Err(CoreError::MultiplexerUnavailable(format!("tmux send-keys failed for {target}")));
        }

        let status = self
            .cmd()
            .args(["send-keys", "-t", &target, "Enter"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| CoreError::MultiplexerUnavailable(e.to_string()))?;
        if !status.success() {
            return Err(CoreError::MultiplexerUnavailable(format!("tmux send-keys (Enter) failed for {target}")));
        }
        Ok(())
    }

    async fn get_history(&self, session: &str, window: &str, tail_lines: Option<usize>) -> CoreResult<String> {
        let mut cmd = self.cmd();
        cmd.args(["capture-pane", "-p", "-e", "-t", &Self::target(session, window)]);
        if let Some(n) = tail_lines {
            cmd.args(["-S", &format!("-{n}")]);
        }
        let output = cmd
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| CoreError::MultiplexerUnavailable(e.to_string()))?;
        if !output.status.success() {
            return Err(CoreError::MultiplexerUnavailable(format!(
                "tmux capture-pane failed for {}",
                Self::target(session, window)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn has_window(&self, session: &str, window: &str) -> CoreResult<bool> {
        let status = self
            .cmd()
            .args(["has-session", "-t", &Self::target(session, window)])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| CoreError::MultiplexerUnavailable(e.to_string()))?;
        Ok(status.success())
    }
}

#[cfg(test)]
#[path = "multiplexer_tests.rs"]
mod tests;
