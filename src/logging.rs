use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the tracing subscriber. Logging is opt-in via `RUST_LOG`; the
/// terminal belongs to the TUI, so records go to a file instead of stderr.
/// Without `log_file` the default directory is only looked up once a filter is
/// set, so an unknown data dir never blocks startup.
pub fn init(
    log_file: Option<&Path>,
    default_dir: impl FnOnce() -> anyhow::Result<PathBuf>,
) -> anyhow::Result<()> {
    init_with(env_filter(), log_file, default_dir)
}

fn init_with(
    filter: Option<EnvFilter>,
    log_file: Option<&Path>,
    default_dir: impl FnOnce() -> anyhow::Result<PathBuf>,
) -> anyhow::Result<()> {
    let Some(filter) = filter else {
        return Ok(());
    };
    let log_file = match log_file {
        Some(path) => path.to_path_buf(),
        None => default_dir()?.join("yaru.log"),
    };
    let log_file = log_file.as_path();

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

/// Ignore empty, oversized or unparsable filters rather than failing startup.
fn env_filter() -> Option<EnvFilter> {
    let raw = std::env::var("RUST_LOG").ok()?;
    parse_filter(&raw)
}

fn parse_filter(raw: &str) -> Option<EnvFilter> {
    let raw = raw.trim();
    if raw.is_empty() || raw.len() > 4096 {
        return None;
    }
    EnvFilter::try_new(raw).ok()
}
