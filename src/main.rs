//! # kt - Kuromi task list CLI
//!
//! A small command-line front end for the `kuromi_tasks` library: add and edit
//! tasks, filter the list, browse a month calendar and read completion stats.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task due tomorrow morning
//! kt add "Buy groceries" --due "tomorrow 09:00" --priority medium --tag errands
//!
//! # List what is still open
//! kt list --status active
//!
//! # Mark it done
//! kt done "buy groceries"
//!
//! # Month view and statistics
//! kt calendar --next 1
//! kt stats
//! ```
//!
//! ## Key Commands
//!
//! - `kt add <title>` - Create a task with optional metadata
//! - `kt list [query]` - Search and filter tasks
//! - `kt edit <id>` - Change fields, clear dates, add or remove tags
//! - `kt done <id>` / `kt priority <id>` - Toggle completion / cycle priority
//! - `kt move <id> <pos>` / `kt reorder <ids..>` - Change list order
//! - `kt calendar` / `kt day <date>` - Calendar views
//! - `kt stats` - Completion analytics
//!
//! Data is stored locally in `~/.kuromi/tasks.json`. Set `RUST_LOG=debug` to
//! see storage activity.

use anyhow::{bail, Context, Result};
use clap::Parser;

use kuromi_tasks::clock::SystemClock;
use kuromi_tasks::repository::TaskRepository;
use kuromi_tasks::store::FileStore;

mod cli;
mod cmd;
mod config;
mod render;
mod util;

use cli::Cli;
use cmd::{cmd_completions, dispatch, Commands};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    config::install_tracing();
    let cli = Cli::parse();

    // Completions never touch the task file.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let db_path = config::resolve_db_path(cli.db)?;
    let mut repo = TaskRepository::open(FileStore::new(db_path.clone()), SystemClock)
        .with_context(|| format!("failed to open task file {}", db_path.display()))?;

    if repo.writes_suspended() && cli.command.mutates() {
        bail!(
            "{} could not be read; refusing to change it (fix or move the file first)",
            db_path.display()
        );
    }

    let result = dispatch(&mut repo, cli.command);
    repo.flush();
    result
}
