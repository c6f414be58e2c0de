use clap::Parser;
use tracing::error;

use fleetd::config::{init_tracing, Config};

#[derive(Parser)]
#[command(name = "fleetd", version, about = "Fleet orchestration control plane for interactive CLI agents.")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    subcommand: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create a terminal on a running fleetd server and attach to it.
    Launch(fleetd::launch::LaunchArgs),
    /// Copy an agent profile into the local profile store.
    Install(fleetd::install::InstallArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.subcommand {
        Some(Commands::Launch(args)) => {
            std::process::exit(fleetd::launch::run(args).await);
        }
        Some(Commands::Install(args)) => {
            std::process::exit(fleetd::install::run(args));
        }
        None => {
            let config = cli.config;

            if let Err(e) = config.validate() {
                eprintln!("error: {e}");
                std::process::exit(2);
            }

            init_tracing(&config);

            if let Err(e) = fleetd::run::serve(config).await {
                error!("fatal: {e:#}");
                std::process::exit(1);
            }
        }
    }
}
