//! O(1) Incremental Log Reader.
//!
//! Tracks a monotonic byte offset and a fixed-capacity line buffer per
//! terminal-id, independently locked so unrelated terminals never
//! contend. Detects truncation (offset past EOF) and re-reads from zero.

use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Fixed-capacity FIFO of the most recent non-empty lines for one terminal.
///
/// `push` and `join` are both O(N) in the buffer capacity, independent of
/// how many bytes have ever been appended to the underlying log.
#[derive(Debug, Clone, Default)]
pub struct CircularLineBuffer {
    capacity: usize,
    lines: std::collections::VecDeque<String>,
}

impl CircularLineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), lines: std::collections::VecDeque::with_capacity(capacity) }
    }

    /// Split `text` on newlines, discard empty lines, and append the rest,
    /// evicting the oldest lines beyond `capacity`.
    pub fn push_text(&mut self, text: &str) {
        for line in text.split('\n') {
            if line.is_empty() {
                continue;
            }
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(line.to_string());
        }
    }

    pub fn join(&self) -> String {
        self.lines.iter().cloned().collect::<Vec<_>>().join("\n")
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Per-terminal byte offset plus line buffer, guarded by its own mutex so
/// distinct terminal-ids progress independently.
struct TerminalLog {
    pos: u64,
    buf: CircularLineBuffer,
}

/// Tracks file offsets and line buffers for every terminal's log file.
///
/// The position map itself is guarded separately from each entry's contents:
/// inserting a new terminal-id only briefly locks the map, while reads/writes
/// to an existing id's offset+buffer lock only that id's entry.
pub struct LogReader {
    root: PathBuf,
    line_buffer_capacity: usize,
    entries: Mutex<HashMap<String, Arc<Mutex<TerminalLog>>>>,
}

impl LogReader {
    pub fn new(root: impl Into<PathBuf>, line_buffer_capacity: usize) -> Self {
        Self { root: root.into(), line_buffer_capacity, entries: Mutex::new(HashMap::new()) }
    }

    fn log_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.log"))
    }

    fn entry_for(&self, id: &str) -> Arc<Mutex<TerminalLog>> {
        let mut entries = self.entries.lock();
        entries
            .entry(id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(TerminalLog { pos: 0, buf: CircularLineBuffer::new(self.line_buffer_capacity) }))
            })
            .clone()
    }

    /// Read any bytes appended since the last call. Returns `None` if the
    /// log file does not exist yet; returns `Some("")` for an existing but
    /// unchanged/empty file.
    pub fn read_new_content(&self, id: &str) -> std::io::Result<Option<String>> {
        let path = self.log_path(id);
        let mut file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let entry = self.entry_for(id);
        let mut guard = entry.lock();

        let size = file.metadata()?.len();
        if guard.pos > size {
            warn!(terminal_id = id, recorded_pos = guard.pos, size, "log truncated, resetting offset");
            guard.pos = 0;
        }

        file.seek(SeekFrom::Start(guard.pos))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        guard.pos = file.stream_position()?;

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Append `text`'s lines into the terminal's circular buffer.
    pub fn update_buffer(&self, id: &str, text: &str) {
        let entry = self.entry_for(id);
        entry.lock().buf.push_text(text);
    }

    /// Whether the joined buffer contents match `regex`. Never raises: an
    /// invalid regex is treated as "no match".
    pub fn matches_idle_pattern(&self, id: &str, regex: &Regex) -> bool {
        let entry = self.entry_for(id);
        let guard = entry.lock();
        regex.is_match(&guard.buf.join())
    }

    /// Primary scheduler entrypoint: read new
    /// content, fold it into the buffer, then test the idle pattern. Returns
    /// the current buffer contents only when the pattern matches.
    pub fn sync_and_check(&self, id: &str, idle_regex: &Regex) -> std::io::Result<Option<String>> {
        if let Some(text) = self.read_new_content(id)? {
            if !text.is_empty() {
                self.update_buffer(id, &text);
            }
        }

        let entry = self.entry_for(id);
        let guard = entry.lock();
        if idle_regex.is_match(&guard.buf.join()) {
            Ok(Some(guard.buf.join()))
        } else {
            Ok(None)
        }
    }

    /// Current buffer contents without mutating anything (used by providers
    /// reading already-synced state).
    pub fn buffer_contents(&self, id: &str) -> String {
        let entry = self.entry_for(id);
        let result = entry.lock().buf.join();
        result
    }

    /// Forget a terminal's offset and buffer (lifecycle boundary).
    pub fn reset_terminal(&self, id: &str) {
        self.entries.lock().remove(id);
    }

    pub fn clear_all(&self) {
        self.entries.lock().clear();
    }

    /// Directory new terminal logs should be created under.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
#[path = "log_reader_tests.rs"]
mod tests;
