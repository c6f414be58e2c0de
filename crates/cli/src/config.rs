//! `fleetd` configuration: clap flags/env vars, a `validate()` pass after
//! parsing, and tracing init.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use fleet_core::CoreConfig;

/// Fleet orchestration control plane for interactive CLI agents.
#[derive(Debug, Clone, Parser)]
#[command(name = "fleetd", version, about)]
pub struct Config {
    /// Host address to bind to.
    #[arg(long, env = "FLEET_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port to listen on.
    #[arg(long, env = "FLEET_PORT", default_value = "7420")]
    pub port: u16,

    /// Directory holding the metadata store and terminal log files.
    #[arg(long, env = "FLEET_DATA_DIR", default_value = "./fleet-data")]
    pub data_dir: PathBuf,

    /// Optional tmux `-S` socket path, for isolation from the default server.
    #[arg(long, env = "FLEET_TMUX_SOCKET")]
    pub tmux_socket: Option<PathBuf>,

    /// Log format (json or text).
    #[arg(long, env = "FLEET_LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "FLEET_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Max time to wait for a usable shell before launching the agent.
    #[arg(long, env = "FLEET_SHELL_WAIT_TIMEOUT_SECS", default_value = "10")]
    pub shell_wait_timeout_secs: u64,

    /// Max time to wait for the first IDLE after launch.
    #[arg(long, env = "FLEET_INIT_TIMEOUT_SECS", default_value = "45")]
    pub init_timeout_secs: u64,

    /// Inbox scheduler fallback poll interval, in seconds.
    #[arg(long, env = "FLEET_SCHEDULER_POLL_SECS", default_value = "5")]
    pub scheduler_poll_secs: u64,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            anyhow::bail!("--port must be nonzero");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid --log-format: {other} (expected json or text)"),
        }
        Ok(())
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.jsonl")
    }

    pub fn log_root(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Project the CLI-level flags down into the core's tuning knobs.
    pub fn to_core_config(&self) -> CoreConfig {
        CoreConfig {
            shell_wait_timeout: Duration::from_secs(self.shell_wait_timeout_secs),
            init_timeout: Duration::from_secs(self.init_timeout_secs),
            ..CoreConfig::default()
        }
    }
}

/// Initialize tracing/logging from config. Uses `try_init` so it's safe to
/// call more than once (e.g. from tests).
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = if std::env::var("RUST_LOG").is_err() {
        EnvFilter::new(&config.log_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
