//! Single-item executor: resolve the filename, run aria2c, classify the result.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::config::DownloadConfig;
use crate::item::{DownloadItem, ItemOutcome};
use crate::resolver;

use super::args::build_downloader_args;
use super::exit::{classify_exit_status, DownloadFailure};
use super::DownloaderBinary;

/// How long a signalled downloader gets to exit before it is killed outright.
pub const TERMINATION_GRACE: Duration = Duration::from_secs(5);

/// Downloads one item.
///
/// The filename is resolved first (probe, then URL fallback) and recorded on
/// `item`. The downloader runs in its own process group so cancellation can
/// signal aria2c together with anything it spawned. Its stdout is shown unless
/// `cfg.quiet`; stderr is always passed through.
pub async fn download_item(
    item: &mut DownloadItem,
    target_dir: &Path,
    cfg: &DownloadConfig,
    downloader: &DownloaderBinary,
    cancel: &CancellationToken,
) -> ItemOutcome {
    if cancel.is_cancelled() {
        return ItemOutcome::Cancelled;
    }

    let opts = resolver::probe_options(cfg);
    let resolved = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ItemOutcome::Cancelled,
        resolved = resolver::resolve_filename(item.url(), &opts, cancel) => resolved,
    };
    tracing::debug!(
        url = %item.url(),
        filename = %resolved.filename,
        source = ?resolved.source,
        "resolved filename"
    );
    let args = build_downloader_args(target_dir, &resolved.filename, item.url(), cfg);
    item.record_resolution(target_dir, resolved.filename);

    // Probe may have taken a while; do not start a process for a cancelled batch.
    if cancel.is_cancelled() {
        return ItemOutcome::Cancelled;
    }

    let mut cmd = Command::new(&downloader.path);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(if cfg.quiet {
            Stdio::null()
        } else {
            Stdio::inherit()
        })
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::error!(url = %item.url(), "spawn {}: {}", downloader.path.display(), e);
            return ItemOutcome::Failed(DownloadFailure::Spawn(e.to_string()));
        }
    };
    tracing::debug!(url = %item.url(), pid = ?child.id(), "downloader started");

    let waited = tokio::select! {
        status = child.wait() => Some(status),
        _ = cancel.cancelled() => None,
    };
    let Some(status) = waited else {
        terminate(&mut child, TERMINATION_GRACE).await;
        tracing::info!(url = %item.url(), "download cancelled");
        return ItemOutcome::Cancelled;
    };

    match status {
        Err(e) => ItemOutcome::Failed(DownloadFailure::Wait(e.to_string())),
        Ok(status) => match classify_exit_status(status) {
            Ok(()) => {
                tracing::info!(url = %item.url(), path = ?item.file_path(), "download finished");
                ItemOutcome::Succeeded
            }
            // Exited on its own while the batch was being torn down.
            Err(_) if cancel.is_cancelled() => ItemOutcome::Cancelled,
            Err(failure) => {
                tracing::warn!(url = %item.url(), ?status, "download failed: {}", failure);
                ItemOutcome::Failed(failure)
            }
        },
    }
}

/// Sends SIGTERM to the child's process group, waits up to `grace`, then
/// SIGKILLs the whole group so no descendant of the downloader survives.
async fn terminate(child: &mut Child, grace: Duration) {
    // Read before waiting: the id is gone once the child is reaped.
    let pgid = child.id();
    signal_group(child, pgid, false);
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => tracing::debug!(?status, "downloader exited after termination request"),
        Ok(Err(e)) => tracing::warn!("waiting for terminated downloader: {}", e),
        Err(_) => {
            tracing::warn!("downloader ignored termination request, killing its process group");
            signal_group(child, pgid, true);
            if let Err(e) = child.kill().await {
                tracing::warn!("kill downloader: {}", e);
            }
        }
    }
}

/// SIGTERM (or SIGKILL with `force`) to the group led by `pgid`. Falls back to
/// the child alone if the group cannot be signalled.
#[cfg(unix)]
fn signal_group(child: &mut Child, pgid: Option<u32>, force: bool) {
    let Some(pgid) = pgid else {
        return;
    };
    let signal = if force { libc::SIGKILL } else { libc::SIGTERM };
    // The child leads its own group (process_group(0) at spawn), so pgid == pid.
    let rc = unsafe { libc::killpg(pgid as libc::pid_t, signal) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        tracing::debug!(pgid, "killpg failed ({}), signalling child only", err);
        let _ = child.start_kill();
    }
}

#[cfg(not(unix))]
fn signal_group(child: &mut Child, _pgid: Option<u32>, _force: bool) {
    let _ = child.start_kill();
}
