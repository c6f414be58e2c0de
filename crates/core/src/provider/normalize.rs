//! Shared scrollback normalization and the state decision rules every
//! provider variant evaluates in the same priority order.

use regex::Regex;
use std::sync::OnceLock;

use super::ProviderStatus;

/// `\x1b\[[0-9;]*m` — SGR-style ANSI CSI sequences.
fn ansi_csi() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("static regex"))
}

/// Permission/approval prompt of the form `(Approve|Allow)...(y/n|yes/no)`.
fn approval_prompt() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(approve|allow).*?(y/n|yes/no)").expect("static regex"))
}

/// Line-anchored fatal markers common to every provider.
/// Provider-specific fatal strings are appended by callers.
pub const COMMON_FATAL_MARKERS: &[&str] =
    &["Error:", "ERROR:", "Traceback (most recent call last):", "panic:"];

/// Strip ANSI CSI color/style sequences.
pub fn strip_ansi(text: &str) -> String {
    ansi_csi().replace_all(text, "").into_owned()
}

/// Strip Unicode box-drawing characters (U+2500..U+257F), used by providers
/// that render a framed prompt.
pub fn strip_box_drawing(text: &str) -> String {
    text.chars().filter(|c| !('\u{2500}'..='\u{257F}').contains(c)).collect()
}

/// Normalize raw scrollback: strip ANSI, optionally strip box-drawing, then
/// keep only the last `tail_lines` non-empty lines.
pub fn normalize_tail(raw: &str, tail_lines: usize, strip_box: bool) -> Vec<String> {
    let mut text = strip_ansi(raw);
    if strip_box {
        text = strip_box_drawing(&text);
    }
    let lines: Vec<String> = text.lines().map(|l| l.to_string()).collect();
    let start = lines.len().saturating_sub(tail_lines);
    lines[start..].to_vec()
}

/// Rule 1: a tail line begins with a fatal marker. `failed` alone must
/// never force ERROR.
pub fn has_fatal_marker(tail: &[String], extra_markers: &[&str]) -> bool {
    tail.iter().any(|line| {
        let trimmed = line.trim_start();
        COMMON_FATAL_MARKERS.iter().any(|m| trimmed.starts_with(m))
            || extra_markers.iter().any(|m| trimmed.starts_with(m))
    })
}

/// Rule 2: an approval/permission prompt is visible anywhere in the tail.
pub fn has_approval_prompt(tail: &[String]) -> bool {
    tail.iter().any(|line| approval_prompt().is_match(line))
}

/// Index of the prompt regex's last match within `tail`, if the match is
/// anchored at the very end of the captured output.
pub fn prompt_at_end(tail: &[String], idle_pattern: &Regex) -> bool {
    match tail.iter().rev().find(|line| !line.trim().is_empty()) {
        Some(last) => idle_pattern.is_match(last),
        None => false,
    }
}

/// Index of the last line matching `marker_prefix` (case-sensitive prefix
/// match after trimming), scanning from the end.
pub fn last_index_with_prefix(tail: &[String], marker_prefix: &str) -> Option<usize> {
    tail.iter().rposition(|line| line.trim_start().starts_with(marker_prefix))
}

/// Resolve rules 3/4/5 once ERROR and WAITING_USER_ANSWER have been ruled
/// out: COMPLETED if the prompt sits at the end of output *and* an
/// assistant-marker line occurs after the most recent user-marker line;
/// IDLE if the prompt is at the end but no fresh reply has been emitted;
/// PROCESSING if there is no end-of-output prompt at all.
pub fn classify_marker_based(
    tail: &[String],
    idle_pattern: &Regex,
    user_marker: &str,
    assistant_marker: &str,
) -> ProviderStatus {
    if !prompt_at_end(tail, idle_pattern) {
        return ProviderStatus::Processing;
    }

    let last_user = last_index_with_prefix(tail, user_marker);
    let last_assistant = last_index_with_prefix(tail, assistant_marker);

    let replied_since_last_input = match (last_user, last_assistant) {
        (Some(u), Some(a)) => a > u,
        (None, Some(_)) => true,
        _ => false,
    };

    if replied_since_last_input {
        ProviderStatus::Completed
    } else {
        ProviderStatus::Idle
    }
}

/// Count occurrences of `prompt_pattern` across the tail, for the
/// multi-prompt heuristic.
pub fn count_prompt_occurrences(tail: &[String], prompt_pattern: &Regex) -> usize {
    tail.iter().filter(|line| prompt_pattern.is_match(line)).count()
}
