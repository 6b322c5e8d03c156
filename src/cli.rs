use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed personal task manager.
/// Data lives in one JSON store per user under ~/.taskdeck/.
#[derive(Parser)]
#[command(name = "td", version, about = "Personal task and project manager")]
pub struct Cli {
    /// Path to the JSON store file (overrides --user).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// User whose store to open. Defaults to $USER.
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
