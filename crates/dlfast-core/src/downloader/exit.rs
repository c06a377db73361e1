//! Map downloader exit statuses to per-item failure reasons.
//!
//! Codes follow aria2c's documented exit status table.

use std::process::ExitStatus;

/// Why one item did not download. Cloneable so it can travel in events and reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadFailure {
    #[error("access denied or not found")]
    AccessDeniedOrNotFound,
    #[error("not enough disk space available")]
    InsufficientDiskSpace,
    #[error("network timeout or connection refused")]
    NetworkUnavailable,
    #[error("downloader failed with exit code {0}")]
    ExitCode(i32),
    #[error("downloader terminated by signal {0}")]
    Signaled(i32),
    #[error("failed to launch downloader: {0}")]
    Spawn(String),
    #[error("failed waiting for downloader: {0}")]
    Wait(String),
    #[error("worker stopped before reporting: {0}")]
    WorkerAborted(String),
}

/// Failure reason for a non-zero exit code.
pub fn failure_for_exit_code(code: i32) -> DownloadFailure {
    match code {
        3 => DownloadFailure::AccessDeniedOrNotFound,
        9 => DownloadFailure::InsufficientDiskSpace,
        28 => DownloadFailure::NetworkUnavailable,
        other => DownloadFailure::ExitCode(other),
    }
}

/// `Ok` for a zero exit, otherwise the classified failure.
pub fn classify_exit_status(status: ExitStatus) -> Result<(), DownloadFailure> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(failure_for_exit_code(code));
    }
    Err(signal_failure(status))
}

#[cfg(unix)]
fn signal_failure(status: ExitStatus) -> DownloadFailure {
    use std::os::unix::process::ExitStatusExt;
    DownloadFailure::Signaled(status.signal().unwrap_or_default())
}

#[cfg(not(unix))]
fn signal_failure(_status: ExitStatus) -> DownloadFailure {
    DownloadFailure::ExitCode(-1)
}
