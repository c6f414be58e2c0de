//! Metadata Store.
//!
//! Durability follows an append-before-apply write-ahead log: every
//! mutation is written as one JSON line before it is applied in memory,
//! and the whole log is replayed on startup to rebuild the index. There
//! is no separate snapshot/compaction stage — the table sizes this
//! process manages do not warrant one.

use crate::error::{CoreError, CoreResult};
use crate::model::{InboxMessage, MessageStatus, Terminal};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// One durable mutation. Appended to the log before the in-memory index is
/// updated; replayed in order to rebuild the index on startup.
#[derive(Debug, Serialize, Deserialize)]
enum StoreEvent {
    TerminalCreated(Terminal),
    TerminalDeleted { id: String },
    MessageEnqueued(InboxMessage),
    MessageDelivered { id: String, delivered_at: chrono::DateTime<chrono::Utc> },
    MessageFailed { id: String },
}

struct Index {
    terminals: HashMap<String, Terminal>,
    messages: HashMap<String, InboxMessage>,
}

/// Durable mapping terminal-id -> {provider kind, session, window, agent
/// profile} and the inbox message queue.
pub struct MetadataStore {
    log: Mutex<File>,
    index: Mutex<Index>,
}

impl MetadataStore {
    /// Open (creating if absent) the JSONL log at `path` and replay it.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::PersistenceFailure(e.to_string()))?;
        }

        let mut index = Index { terminals: HashMap::new(), messages: HashMap::new() };
        if path.exists() {
            let file = File::open(path).map_err(|e| CoreError::PersistenceFailure(e.to_string()))?;
            for line in BufReader::new(file).lines() {
                let line = line.map_err(|e| CoreError::PersistenceFailure(e.to_string()))?;
                if line.trim().is_empty() {
                    continue;
                }
                let event: StoreEvent = serde_json::from_str(&line)
                    .map_err(|e| CoreError::PersistenceFailure(format!("corrupt store log entry: {e}")))?;
                apply(&mut index, event);
            }
        }

        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| CoreError::PersistenceFailure(e.to_string()))?;

        Ok(Self { log: Mutex::new(log), index: Mutex::new(index) })
    }

    fn append(&self, event: &StoreEvent) -> CoreResult<()> {
        let mut bytes = serde_json::to_vec(event).map_err(|e| CoreError::PersistenceFailure(e.to_string()))?;
        bytes.push(b'\n');
        let mut log = self.log.lock();
        log.write_all(&bytes).map_err(|e| CoreError::PersistenceFailure(e.to_string()))?;
        log.sync_all().map_err(|e| CoreError::PersistenceFailure(e.to_string()))
    }

    pub fn insert_terminal(&self, terminal: Terminal) -> CoreResult<()> {
        self.append(&StoreEvent::TerminalCreated(terminal.clone()))?;
        self.index.lock().terminals.insert(terminal.id.clone(), terminal);
        Ok(())
    }

    pub fn get_terminal(&self, id: &str) -> CoreResult<Terminal> {
        self.index.lock().terminals.get(id).cloned().ok_or_else(|| CoreError::UnknownTerminal(id.to_string()))
    }

    pub fn remove_terminal(&self, id: &str) -> CoreResult<()> {
        self.append(&StoreEvent::TerminalDeleted { id: id.to_string() })?;
        self.index.lock().terminals.remove(id);
        Ok(())
    }

    pub fn list_terminals(&self) -> Vec<Terminal> {
        let mut terminals: Vec<_> = self.index.lock().terminals.values().cloned().collect();
        terminals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        terminals
    }

    pub fn list_sessions(&self) -> Vec<String> {
        let mut sessions: Vec<String> =
            self.index.lock().terminals.values().map(|t| t.session.clone()).collect::<std::collections::BTreeSet<_>>().into_iter().collect();
        sessions.sort();
        sessions
    }

    pub fn list_session_terminals(&self, session: &str) -> Vec<Terminal> {
        let mut terminals: Vec<_> =
            self.index.lock().terminals.values().filter(|t| t.session == session).cloned().collect();
        terminals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        terminals
    }

    pub fn enqueue_message(&self, message: InboxMessage) -> CoreResult<()> {
        self.append(&StoreEvent::MessageEnqueued(message.clone()))?;
        self.index.lock().messages.insert(message.id.clone(), message);
        Ok(())
    }

    /// Oldest PENDING message addressed to `receiver_id`, if any.
    pub fn oldest_pending(&self, receiver_id: &str) -> Option<InboxMessage> {
        self.index
            .lock()
            .messages
            .values()
            .filter(|m| m.receiver_id == receiver_id && m.status == MessageStatus::Pending)
            .min_by_key(|m| m.created_at)
            .cloned()
    }

    pub fn list_messages(&self, terminal_id: &str, status: Option<MessageStatus>, limit: Option<usize>) -> Vec<InboxMessage> {
        let mut messages: Vec<_> = self
            .index
            .lock()
            .messages
            .values()
            .filter(|m| m.receiver_id == terminal_id)
            .filter(|m| status.map(|s| m.status == s).unwrap_or(true))
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        if let Some(limit) = limit {
            messages.truncate(limit);
        }
        messages
    }

    /// Atomic PENDING -> DELIVERED transition. Returns `false` if
    /// the message was not PENDING (already delivered/failed, or unknown).
    pub fn try_mark_delivered(&self, message_id: &str) -> CoreResult<bool> {
        let delivered_at = chrono::Utc::now();
        let mut index = self.index.lock();
        match index.messages.get(message_id) {
            Some(message) if message.status == MessageStatus::Pending => {}
            _ => return Ok(false),
        }
        self.append(&StoreEvent::MessageDelivered { id: message_id.to_string(), delivered_at })?;
        let message = index.messages.get_mut(message_id).expect("checked pending above");
        message.status = MessageStatus::Delivered;
        message.delivered_at = Some(delivered_at);
        Ok(true)
    }

    /// Atomic PENDING -> FAILED transition. Returns `false` under the same
    /// conditions as [`Self::try_mark_delivered`].
    pub fn try_mark_failed(&self, message_id: &str) -> CoreResult<bool> {
        let mut index = self.index.lock();
        match index.messages.get(message_id) {
            Some(message) if message.status == MessageStatus::Pending => {}
            _ => return Ok(false),
        }
        self.append(&StoreEvent::MessageFailed { id: message_id.to_string() })?;
        let message = index.messages.get_mut(message_id).expect("checked pending above");
        message.status = MessageStatus::Failed;
        Ok(true)
    }
}

fn apply(index: &mut Index, event: StoreEvent) {
    match event {
        StoreEvent::TerminalCreated(terminal) => {
            index.terminals.insert(terminal.id.clone(), terminal);
        }
        StoreEvent::TerminalDeleted { id } => {
            index.terminals.remove(&id);
        }
        StoreEvent::MessageEnqueued(message) => {
            index.messages.insert(message.id.clone(), message);
        }
        StoreEvent::MessageDelivered { id, delivered_at } => {
            if let Some(message) = index.messages.get_mut(&id) {
                message.status = MessageStatus::Delivered;
                message.delivered_at = Some(delivered_at);
            }
        }
        StoreEvent::MessageFailed { id } => {
            if let Some(message) = index.messages.get_mut(&id) {
                message.status = MessageStatus::Failed;
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
