//! In-memory fakes shared across unit tests. Not compiled into release
//! builds.

use crate::error::{CoreError, CoreResult};
use crate::multiplexer::MultiplexerClient;
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory multiplexer used by tests that would otherwise need a real
/// `tmux` binary on PATH.
#[derive(Default)]
pub struct FakeMultiplexer {
    windows: Mutex<HashMap<(String, String), String>>,
    pub fail_create: bool,
    /// When set, every `send_keys` appends this line after the echoed
    /// input, simulating an agent that immediately reprints its prompt.
    pub echo_after_send: Option<String>,
}

impl FakeMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_history(&self, session: &str, window: &str, text: &str) {
        self.windows.lock().insert((session.to_string(), window.to_string()), text.to_string());
    }

    pub fn with_echo_after_send(mut self, line: impl Into<String>) -> Self {
        self.echo_after_send = Some(line.into());
        self
    }
}

#[async_trait::async_trait]
impl MultiplexerClient for FakeMultiplexer {
    async fn create_window(&self, session: &str, window: &str) -> CoreResult<()> {
        if self.fail_create {
            return Err(CoreError::MultiplexerUnavailable("injected failure".to_string()));
        }
        self.windows.lock().entry((session.to_string(), window.to_string())).or_default();
        Ok(())
    }

    async fn destroy_window(&self, session: &str, window: &str) -> CoreResult<()> {
        self.windows.lock().remove(&(session.to_string(), window.to_string()));
        Ok(())
    }

    async fn send_keys(&self, session: &str, window: &str, text: &str) -> CoreResult<()> {
        let mut windows = self.windows.lock();
        let entry = windows
            .get_mut(&(session.to_string(), window.to_string()))
            .ok_or_else(|| CoreError::MultiplexerUnavailable("no such window".to_string()))?;
        entry.push_str(text);
        entry.push('\n');
        if let Some(ref echo) = self.echo_after_send {
            entry.push_str(echo);
            entry.push('\n');
        }
        Ok(())
    }

    async fn get_history(&self, session: &str, window: &str, _tail_lines: Option<usize>) -> CoreResult<String> {
        Ok(self.windows.lock().get(&(session.to_string(), window.to_string())).cloned().unwrap_or_default())
    }

    async fn has_window(&self, session: &str, window: &str) -> CoreResult<bool> {
        Ok(self.windows.lock().contains_key(&(session.to_string(), window.to_string())))
    }
}
