//! Tracing configuration and log routing.
//!
//! Logs go to stdout in compact form and are mirrored to a file: `SME_DOCS_LOG_FILE` when set,
//! otherwise `logs/smedocs.log`. Directory rebuilds log once per document, so the file layer
//! writes through a non-blocking worker.
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "SME_DOCS_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "smedocs.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where the file layer writes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    /// Explicit file, opened in append mode.
    File(PathBuf),
    /// File inside a directory created on demand.
    Directory { dir: PathBuf, file: String },
}

impl LogTarget {
    fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(LOG_FILE_ENV).filter(|value| !value.trim().is_empty()) {
            Some(path) => Self::File(PathBuf::from(path)),
            None => Self::Directory {
                dir: PathBuf::from(DEFAULT_LOG_DIR),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }

    fn display_path(&self) -> PathBuf {
        match self {
            Self::File(path) => path.clone(),
            Self::Directory { dir, file } => dir.join(file),
        }
    }

    fn open(&self) -> io::Result<NonBlocking> {
        let (writer, guard) = match self {
            Self::File(path) => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                tracing_appender::non_blocking(file)
            }
            Self::Directory { dir, file } => {
                std::fs::create_dir_all(dir)?;
                tracing_appender::non_blocking(tracing_appender::rolling::never(
                    dir,
                    Path::new(file),
                ))
            }
        };
        let _ = LOG_GUARD.set(guard);
        Ok(writer)
    }
}

/// Configure tracing subscribers for stdout and file logging.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Falls back to stdout only when the log file cannot be opened.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    let target = LogTarget::resolve(|key| std::env::var(key).ok());
    match target.open() {
        Ok(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        Err(err) => {
            eprintln!(
                "Failed to open log file {}: {err}",
                target.display_path().display()
            );
            registry.init();
        }
    }
}
