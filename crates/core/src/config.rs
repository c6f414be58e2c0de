//! Tunable timeouts and sizes shared by the log reader, providers, and
//! scheduler — explicit, independently overridable fields rather than
//! hardcoded constants.

use std::time::Duration;

/// Core tuning knobs. The CLI binary exposes these as `clap` flags/env vars
/// (see `fleetd::config::Config`) and passes a `CoreConfig` down at startup.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Max time to wait for a usable shell before launching the agent (T_shell).
    pub shell_wait_timeout: Duration,
    /// Max time to wait for the first IDLE after launch (T_init).
    pub init_timeout: Duration,
    /// Poll interval while waiting for shell readiness / initial IDLE.
    pub init_poll_interval: Duration,
    /// Circular line buffer capacity per terminal.
    pub line_buffer_capacity: usize,
    /// Number of trailing lines examined for status classification.
    pub status_tail_lines: usize,
    /// Floor on tail lines requested by the scheduler's double-check.
    pub scheduler_tail_floor: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            shell_wait_timeout: Duration::from_secs(10),
            init_timeout: Duration::from_secs(45),
            init_poll_interval: Duration::from_secs(1),
            line_buffer_capacity: 100,
            status_tail_lines: 25,
            scheduler_tail_floor: 25,
        }
    }
}
