//! Data model: Terminal, Provider kind, Inbox Message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known agent kinds a [`crate::provider::Provider`] can be built for.
///
/// `Custom` is the extension point for a variant implementing the provider
/// contract without a dedicated enum case (`q_cli`, `kiro_cli`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    QCli,
    KiroCli,
    ClaudeCode,
    Codex,
    Droid,
    OpenAutoglm,
    Custom(String),
}

impl ProviderKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::QCli => "q_cli",
            Self::KiroCli => "kiro_cli",
            Self::ClaudeCode => "claude_code",
            Self::Codex => "codex",
            Self::Droid => "droid",
            Self::OpenAutoglm => "open_autoglm",
            Self::Custom(name) => name.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "q_cli" => Self::QCli,
            "kiro_cli" => Self::KiroCli,
            "claude_code" => Self::ClaudeCode,
            "codex" => Self::Codex,
            "droid" => Self::Droid,
            "open_autoglm" => Self::OpenAutoglm,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity + static attributes of one terminal.
///
/// Mutated never after creation, except for the computed provider state,
/// which is never part of this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terminal {
    pub id: String,
    pub session: String,
    pub window: String,
    pub provider_kind: ProviderKind,
    pub agent_profile: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Status of an [`InboxMessage`]. `Pending` is the only
/// non-terminal state; once `Delivered`/`Failed` is recorded it never
/// changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageStatus {
    Pending,
    Delivered,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Delivered => "DELIVERED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Requested shape of captured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Entire available scrollback.
    Full,
    /// The tail window used for status classification.
    Recent,
    /// The agent's most recently extracted reply.
    Last,
}

/// A single queued message between two terminals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub body: String,
    pub status: MessageStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub delivered_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl InboxMessage {
    pub fn new(sender_id: impl Into<String>, receiver_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            body: body.into(),
            status: MessageStatus::Pending,
            created_at: chrono::Utc::now(),
            delivered_at: None,
        }
    }
}
