//! Tracing configuration and log routing.
//!
//! Console logs go to stderr so that stdout stays reserved for rendered summaries (plain text or
//! JSON). When a log file is configured, a second non-blocking layer appends the same events to
//! that path without ANSI colouring.
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const QUIET_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "hn_summarizer=debug,info";

/// Configure tracing subscribers for stderr and optional file logging.
///
/// - Respects `RUST_LOG` for filtering; otherwise `warn`, or crate-level `debug` when `verbose`.
/// - Uses a global guard to keep the non‑blocking file writer alive for the process lifetime.
pub fn init_tracing(verbose: bool, log_file: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    if let Some(writer) = log_file.and_then(configure_file_writer) {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        let _ = registry.with(file_layer).try_init();
    } else {
        let _ = registry.try_init();
    }
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose { VERBOSE_FILTER } else { QUIET_FILTER }
}

/// Build a non‑blocking writer appending to `path`.
///
/// Returns `None` when the file cannot be opened.
fn configure_file_writer(path: &Path) -> Option<NonBlocking> {
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}
