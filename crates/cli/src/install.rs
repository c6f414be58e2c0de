//! `fleetd install` — copy an agent profile into the local profile store.
//!
//! Deliberately a thin file copy: no agent-profile markdown parsing, no
//! provider-specific config-file emission.

use std::path::{Path, PathBuf};

use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct InstallArgs {
    /// File or directory to install.
    pub source: PathBuf,

    /// Informational only; recorded nowhere yet.
    #[arg(long)]
    pub provider: Option<String>,

    /// Directory profiles are copied into.
    #[arg(long, env = "FLEET_PROFILE_STORE", default_value = "./profiles")]
    pub store: PathBuf,
}

/// Run the `fleetd install` subcommand. Returns a process exit code.
pub fn run(args: InstallArgs) -> i32 {
    let Some(name) = args.source.file_name() else {
        eprintln!("error: {} has no file name", args.source.display());
        return 2;
    };
    let dest = args.store.join(name);

    match copy_into(&args.source, &dest) {
        Ok(()) => {
            println!("installed {} -> {}", args.source.display(), dest.display());
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Copy `source` (file or directory) to `dest`, creating parent directories
/// as needed. Recurses for directories.
fn copy_into(source: &Path, dest: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::fs::create_dir_all(dest)?;
        for entry in std::fs::read_dir(source)? {
            let entry = entry?;
            copy_into(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(source, dest)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
