//! Runtime configuration: where the task file lives and how logs are emitted.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Directory under `$HOME` holding the default task file.
pub const DATA_DIR: &str = ".kuromi";

/// Use `--db` when given, otherwise `$HOME/.kuromi/tasks.json` (creating the directory).
pub fn resolve_db_path(db: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = db {
        return Ok(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let path = default_db_path(Path::new(&home));
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
    }
    Ok(path)
}

pub fn default_db_path(home: &Path) -> PathBuf {
    home.join(DATA_DIR).join("tasks.json")
}

/// Log to stderr. `RUST_LOG` overrides the default `warn` level.
pub fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = PathBuf::from("/tmp/elsewhere/list.json");
        let resolved = resolve_db_path(Some(path.clone())).unwrap_or_else(|e| panic!("resolve: {e}"));
        assert_eq!(resolved, path);
    }

    #[test]
    fn default_lives_under_home() {
        assert_eq!(
            default_db_path(Path::new("/home/someone")),
            PathBuf::from("/home/someone/.kuromi/tasks.json")
        );
    }
}
