//! Log setup. The terminal belongs to the TUI, so records go to a file.

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Log file name under the git directory when `--log-file` is not given.
pub const LOG_FILE: &str = "gitsync.log";

/// Default filter directive; `RUST_LOG` overrides it.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "gitsync=debug"
    } else {
        "gitsync=info"
    }
}

/// Install the global subscriber, appending to `log_file`.
///
/// If the file cannot be opened, records are discarded and the open error is
/// returned. Installing twice fails; the first subscriber stays in place.
pub fn init_logging(verbose: bool, log_file: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false);

    let (installed, opened) = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => (builder.with_writer(Mutex::new(file)).try_init(), Ok(())),
        Err(e) => (builder.with_writer(io::sink).try_init(), Err(e)),
    };

    opened.with_context(|| format!("Failed to open log file {}", log_file.display()))?;
    installed.map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
