//! `fleetd launch` — create a terminal on a running fleetd server and, by
//! default, attach to its multiplexer session. Uses the async
//! `reqwest::Client` since the binary already runs under `#[tokio::main]`.

use clap::Args;
use serde::Deserialize;

#[derive(Debug, Clone, Args)]
pub struct LaunchArgs {
    /// Base URL of a running fleetd server.
    #[arg(long, env = "FLEET_URL", default_value = "http://127.0.0.1:7420")]
    pub url: String,

    /// Agent profile to launch.
    #[arg(long = "agent")]
    pub agent_profile: String,

    /// Explicit tmux session name. Defaults to a server-generated name.
    #[arg(long)]
    pub session_name: Option<String>,

    /// Provider kind (e.g. codex, claude_code, q_cli). Defaults to the
    /// server's own default when omitted.
    #[arg(long)]
    pub provider: Option<String>,

    /// Create the terminal but don't attach to it.
    #[arg(long)]
    pub headless: bool,
}

#[derive(Debug, Deserialize)]
struct TerminalResponse {
    id: String,
    session_name: String,
}

/// Run the `fleetd launch` subcommand. Returns a process exit code.
pub async fn run(args: LaunchArgs) -> i32 {
    let client = reqwest::Client::new();
    let url = format!("{}/terminals", args.url.trim_end_matches('/'));

    let body = serde_json::json!({
        "agent_profile": args.agent_profile,
        "provider_kind": args.provider,
        "session_name": args.session_name,
    });

    let resp = match client.post(&url).json(&body).send().await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: request to {url} failed: {e}");
            return 1;
        }
    };

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        eprintln!("error: fleetd returned {status}: {text}");
        return 1;
    }

    let terminal: TerminalResponse = match resp.json().await {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: invalid response from fleetd: {e}");
            return 1;
        }
    };

    println!("terminal {} created in session {}", terminal.id, terminal.session_name);

    if args.headless {
        return 0;
    }

    attach(&terminal.session_name)
}

/// Attach to the terminal's tmux session in the foreground, returning its
/// exit code.
fn attach(session: &str) -> i32 {
    match std::process::Command::new("tmux").args(["attach-session", "-t", session]).status() {
        Ok(status) => status.code().unwrap_or(1),
        Err(e) => {
            eprintln!("error: failed to attach via tmux: {e}");
            1
        }
    }
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
