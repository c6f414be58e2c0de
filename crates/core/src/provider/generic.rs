//! Generic assistant-marker provider: one
//! implementation parameterized by marker strings, fatal strings, and the
//! idle prompt regex, shared by every variant whose state is governed by
//! the marker-based rule rather than the multi-prompt heuristic.

use super::normalize::{classify_marker_based, has_approval_prompt, has_fatal_marker, normalize_tail};
use super::{drive_initialize, Provider, ProviderStatus};
use crate::error::{CoreError, CoreResult};
use crate::model::ProviderKind;
use crate::multiplexer::MultiplexerClient;
use crate::CoreConfig;
use regex::Regex;

/// Per-kind vocabulary the marker-based rule is evaluated against.
#[derive(Debug)]
struct MarkerSpec {
    kind: ProviderKind,
    launch_command: String,
    exit_command: &'static str,
    user_marker: &'static str,
    assistant_marker: &'static str,
    fatal_markers: Vec<&'static str>,
    idle_pattern: Regex,
}

#[derive(Debug)]
pub struct GenericMarkerProvider {
    spec: MarkerSpec,
    initialized: bool,
}

impl GenericMarkerProvider {
    pub fn q_cli() -> Self {
        Self::from_spec(MarkerSpec {
            kind: ProviderKind::QCli,
            launch_command: "q chat".to_string(),
            exit_command: "/quit",
            user_marker: "You ",
            assistant_marker: "assistant:",
            fatal_markers: vec![],
            idle_pattern: Regex::new(r"^>\s*$").expect("static regex"),
        })
    }

    pub fn kiro_cli() -> Self {
        Self::from_spec(MarkerSpec {
            kind: ProviderKind::KiroCli,
            launch_command: "kiro chat".to_string(),
            exit_command: "/exit",
            user_marker: "You ",
            assistant_marker: "assistant:",
            fatal_markers: vec![],
            idle_pattern: Regex::new(r"^>\s*$").expect("static regex"),
        })
    }

    pub fn claude_code() -> Self {
        Self::from_spec(MarkerSpec {
            kind: ProviderKind::ClaudeCode,
            launch_command: "claude".to_string(),
            exit_command: "/exit",
            user_marker: "You ",
            assistant_marker: "assistant:",
            fatal_markers: vec![],
            idle_pattern: Regex::new(r"\u{276f}\s*$").expect("static regex"),
        })
    }

    pub fn codex() -> Self {
        Self::from_spec(MarkerSpec {
            kind: ProviderKind::Codex,
            launch_command: "codex".to_string(),
            exit_command: "/exit",
            user_marker: "You ",
            assistant_marker: "codex:",
            fatal_markers: vec![],
            idle_pattern: Regex::new(r"\u{276f}\s*$").expect("static regex"),
        })
    }

    pub fn open_autoglm() -> Self {
        Self::from_spec(MarkerSpec {
            kind: ProviderKind::OpenAutoglm,
            launch_command: "open-autoglm".to_string(),
            exit_command: "quit",
            user_marker: "You ",
            assistant_marker: "agent:",
            fatal_markers: vec![],
            idle_pattern: Regex::new(r"^>\s*$").expect("static regex"),
        })
    }

    /// Fallback for an unregistered `Custom` kind — conservative defaults until a real
    /// variant is registered.
    pub fn custom(name: String) -> Self {
        Self::from_spec(MarkerSpec {
            kind: ProviderKind::Custom(name),
            launch_command: String::new(),
            exit_command: "/exit",
            user_marker: "You ",
            assistant_marker: "assistant:",
            fatal_markers: vec![],
            idle_pattern: Regex::new(r"^>\s*$").expect("static regex"),
        })
    }

    fn from_spec(spec: MarkerSpec) -> Self {
        Self { spec, initialized: false }
    }
}

#[async_trait::async_trait]
impl Provider for GenericMarkerProvider {
    fn kind(&self) -> &ProviderKind {
        &self.spec.kind
    }

    async fn initialize(
        &mut self,
        mux: &dyn MultiplexerClient,
        session: &str,
        window: &str,
        cfg: &CoreConfig,
    ) -> CoreResult<()> {
        if self.initialized {
            return Ok(());
        }
        let status_tail_lines = cfg.status_tail_lines;
        let idle_pattern = self.spec.idle_pattern.clone();
        let user_marker = self.spec.user_marker;
        let assistant_marker = self.spec.assistant_marker;
        let fatal_markers = self.spec.fatal_markers.clone();

        drive_initialize(mux, session, window, &self.spec.launch_command, cfg, move |scrollback| {
            classify(scrollback, status_tail_lines, &idle_pattern, user_marker, assistant_marker, &fatal_markers)
        })
        .await?;
        self.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn set_initialized(&mut self, value: bool) {
        self.initialized = value;
    }

    fn get_status(&self, scrollback: &str, tail_lines: Option<usize>) -> ProviderStatus {
        let tail_lines = tail_lines.unwrap_or(25);
        classify(
            scrollback,
            tail_lines,
            &self.spec.idle_pattern,
            self.spec.user_marker,
            self.spec.assistant_marker,
            &self.spec.fatal_markers,
        )
    }

    fn extract_last_message_from_script(&self, text: &str) -> CoreResult<String> {
        let normalized = super::normalize::strip_ansi(text);
        let assistant_pos = normalized.rfind(self.spec.assistant_marker).ok_or(CoreError::ParseNoResponse)?;
        let after_marker = &normalized[assistant_pos + self.spec.assistant_marker.len()..];

        let end = self.spec.idle_pattern.find(after_marker).map(|m| m.start()).unwrap_or(after_marker.len());
        let reply = after_marker[..end].trim();
        if reply.is_empty() {
            return Err(CoreError::ParseEmptyResponse);
        }
        Ok(reply.to_string())
    }

    fn exit_cli(&self) -> &str {
        self.spec.exit_command
    }

    fn idle_pattern(&self) -> &Regex {
        &self.spec.idle_pattern
    }

    fn cleanup(&mut self) {
        self.initialized = false;
    }
}

fn classify(
    scrollback: &str,
    tail_lines: usize,
    idle_pattern: &Regex,
    user_marker: &str,
    assistant_marker: &str,
    extra_fatal_markers: &[&str],
) -> ProviderStatus {
    if scrollback.trim().is_empty() {
        return ProviderStatus::Error;
    }
    let tail = normalize_tail(scrollback, tail_lines, false);

    if has_fatal_marker(&tail, extra_fatal_markers) {
        return ProviderStatus::Error;
    }
    if has_approval_prompt(&tail) {
        return ProviderStatus::WaitingUserAnswer;
    }
    classify_marker_based(&tail, idle_pattern, user_marker, assistant_marker)
}

#[cfg(test)]
#[path = "generic_tests.rs"]
mod tests;
