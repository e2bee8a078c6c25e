use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing::Level;
use tracing_subscriber::fmt;

/// Parse a level name from the config, falling back to INFO.
pub fn parse_level(name: &str) -> Level {
    name.parse::<Level>().unwrap_or(Level::INFO)
}

/// Send log events to `path`. The terminal belongs to the editor, so logs
/// never go to stdout or stderr.
pub fn init(path: &Path, level: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    let format = fmt::format()
        .with_level(true)
        .with_line_number(true)
        .with_ansi(false)
        .compact();

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_max_level(parse_level(level))
        .event_format(format)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    Ok(())
}
