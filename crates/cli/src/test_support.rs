//! In-memory multiplexer fake for HTTP-layer tests. `fleet_core::test_support`
//! is `#[cfg(test)]`-gated in its own crate and not visible here, so this
//! duplicates the shape of its `FakeMultiplexer` rather than reusing it.

use fleet_core::error::{CoreError, CoreResult};
use fleet_core::multiplexer::MultiplexerClient;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct FakeMultiplexer {
    windows: Mutex<HashMap<(String, String), String>>,
    /// Appended after every `send_keys`, so a provider's post-launch idle
    /// poll observes an idle prompt on its very first check.
    echo_after_send: Option<String>,
}

impl FakeMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_echo_after_send(mut self, line: impl Into<String>) -> Self {
        self.echo_after_send = Some(line.into());
        self
    }
}

#[async_trait::async_trait]
impl MultiplexerClient for FakeMultiplexer {
    async fn create_window(&self, session: &str, window: &str) -> CoreResult<()> {
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
