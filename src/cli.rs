use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Personal task list with priorities, due dates and a month calendar.
/// Storage defaults to ~/.kuromi/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "kt", version, about = "Kuromi task list")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
