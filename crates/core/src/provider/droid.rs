//! Droid provider: the secondary "multi-prompt" heuristic for
//! agents whose prompt is an undecorated `>` indistinguishable from a shell
//! prompt, framed in box-drawing characters. Grounded in the same
//! tail-scanning style as [`super::generic::GenericMarkerProvider`] but
//! counting prompt occurrences instead of marker positions.

use super::normalize::{has_approval_prompt, has_fatal_marker, normalize_tail};
use super::{drive_initialize, Provider, ProviderStatus};
use crate::error::{CoreError, CoreResult};
use crate::model::ProviderKind;
use crate::multiplexer::MultiplexerClient;
use crate::CoreConfig;
use regex::Regex;

const DROID_FATAL_MARKERS: &[&str] = &["droid: fatal:"];
const LAUNCH_COMMAND: &str = "droid";
const EXIT_COMMAND: &str = "/quit";

#[derive(Debug)]
pub struct DroidProvider {
    kind: ProviderKind,
    idle_pattern: Regex,
    initialized: bool,
}

impl DroidProvider {
    pub fn new() -> Self {
        Self { kind: ProviderKind::Droid, idle_pattern: Regex::new(r"^>\s*$").expect("static regex"), initialized: false }
    }
}

impl Default for DroidProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Provider for DroidProvider {
    fn kind(&self) -> &ProviderKind {
        &self.kind
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
        let idle_pattern = self.idle_pattern.clone();

        drive_initialize(mux, session, window, LAUNCH_COMMAND, cfg, move |scrollback| {
            classify(scrollback, status_tail_lines, &idle_pattern)
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
        classify(scrollback, tail_lines.unwrap_or(25), &self.idle_pattern)
    }

    /// Extracts the text between the penultimate and last prompt, stripped
    /// of box-drawing characters.
    fn extract_last_message_from_script(&self, text: &str) -> CoreResult<String> {
        let normalized = super::normalize::strip_box_drawing(&super::normalize::strip_ansi(text));

        // idle_pattern is line-anchored (`^...$`), so match it per line and
        // track each matching line's byte span within `normalized` rather
        // than running it over the whole multi-line string at once.
        let mut prompt_line_ends = Vec::new();
        let mut prompt_line_starts = Vec::new();
        let mut offset = 0usize;
        for line in normalized.split_inclusive('\n') {
            let trimmed = line.trim_end_matches('\n');
            if self.idle_pattern.is_match(trimmed) {
                prompt_line_starts.push(offset);
                prompt_line_ends.push(offset + trimmed.len());
            }
            offset += line.len();
        }

        if prompt_line_ends.len() < 2 {
            return Err(CoreError::ParseNoResponse);
        }
        let penultimate_end = prompt_line_ends[prompt_line_ends.len() - 2];
        let last_start = prompt_line_starts[prompt_line_starts.len() - 1];
        let reply = normalized[penultimate_end..last_start].trim();
        if reply.is_empty() {
            return Err(CoreError::ParseEmptyResponse);
        }
        Ok(reply.to_string())
    }

    fn exit_cli(&self) -> &str {
        EXIT_COMMAND
    }

    fn idle_pattern(&self) -> &Regex {
        &self.idle_pattern
    }

    fn cleanup(&mut self) {
        self.initialized = false;
    }
}

fn classify(scrollback: &str, tail_lines: usize, idle_pattern: &Regex) -> ProviderStatus {
    if scrollback.trim().is_empty() {
        return ProviderStatus::Error;
    }
    let tail = normalize_tail(scrollback, tail_lines, true);

    if has_fatal_marker(&tail, DROID_FATAL_MARKERS) {
        return ProviderStatus::Error;
    }
    if has_approval_prompt(&tail) {
        return ProviderStatus::WaitingUserAnswer;
    }

    match super::normalize::count_prompt_occurrences(&tail, idle_pattern) {
        0 => ProviderStatus::Processing,
        1 => ProviderStatus::Idle,
        _ => ProviderStatus::Completed,
    }
}

#[cfg(test)]
#[path = "droid_tests.rs"]
mod tests;
