//! Diagnostic logging via `tracing`.
//!
//! The CLI prints its own user-facing lines; `tracing` output goes to a log
//! file under the XDG state dir so it never interleaves with aria2c's progress.
//! If the file cannot be opened, [`init_logging_stderr`] keeps warnings visible.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used for the log file when `RUST_LOG` is unset.
const FILE_FILTER: &str = "info,dlfast_core=debug,dlfast=debug";
/// Filter used for stderr when `RUST_LOG` is unset. stderr is shared with aria2c.
const STDERR_FILTER: &str = "warn";

/// `~/.local/state/dlfast/dlfast.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlfast")?;
    Ok(xdg_dirs.get_state_home().join("dlfast").join("dlfast.log"))
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Hands each event a clone of the log file handle, or stderr if cloning fails.
struct LogFile(File);

enum LogSink {
    File(File),
    Stderr(io::Stderr),
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr(e) => e.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => LogSink::File(f),
            Err(_) => LogSink::Stderr(io::stderr()),
        }
    }
}

/// Installs the global subscriber writing to [`log_file_path`].
///
/// Errors if the state dir or file cannot be created, or a subscriber is
/// already installed; the caller then falls back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter_or(FILE_FILTER))
        .with_writer(LogFile(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {}", e))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), log = %path.display(), "dlfast starting");
    Ok(())
}

/// Stderr-only logging, warnings and above unless `RUST_LOG` says otherwise.
/// A no-op if a subscriber is already installed.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or(STDERR_FILTER))
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
