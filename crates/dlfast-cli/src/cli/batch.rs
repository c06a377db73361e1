//! Run a pre-flighted batch: wire signals, print per-item lines, summarize.

use anyhow::Result;
use dlfast_core::config::DownloadConfig;
use dlfast_core::control;
use dlfast_core::item::ItemOutcome;
use dlfast_core::scheduler::{self, BatchError, BatchEvent, BatchReport, Preflight};
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;
use tokio_util::sync::CancellationToken;

use super::console::Console;

pub(super) async fn run_downloads(
    preflight: Preflight,
    cfg: DownloadConfig,
    console: Console,
) -> Result<()> {
    let total = preflight.targets.len();
    if total == 1 {
        console.info("Starting download...");
    } else {
        console.info(&format!("Starting batch download of {} files...", total));
    }

    let cancel = CancellationToken::new();
    let listener = control::spawn_signal_listener(cancel.clone(), move || {
        console.warning("Received interrupt signal, cancelling downloads...");
    });

    let (events_tx, mut events_rx) = mpsc::channel::<BatchEvent>(total.max(1) * 2);
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            print_event(&console, &event, total);
        }
    });

    let report = scheduler::run_batch(
        preflight.targets,
        preflight.target_dir,
        Arc::new(cfg),
        Arc::new(preflight.downloader),
        cancel,
        Some(events_tx),
    )
    .await;

    if let Err(e) = printer.await {
        tracing::warn!("event printer: {}", e);
    }
    listener.abort();

    let status = report.status();
    print_summary(&console, &report, &status);
    status.map_err(anyhow::Error::from)
}

fn print_event(console: &Console, event: &BatchEvent, total: usize) {
    if console.is_quiet() {
        return;
    }
    match event {
        BatchEvent::Started { url, .. } => console.info(&started_line(event.index(), total, url)),
        BatchEvent::Finished {
            url,
            file_path,
            outcome,
            ..
        } => match outcome {
            ItemOutcome::Succeeded => {
                let shown = file_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| url.to_string());
                console.success(&format!("Downloaded: {}", shown));
            }
            ItemOutcome::Failed(reason) => console.error(&format!("Failed: {} - {}", url, reason)),
            ItemOutcome::Cancelled => console.warning(&format!("Cancelled: {}", url)),
        },
    }
}

/// `Downloading [2/5]: <url>`; a single-item batch gets no counter.
fn started_line(index: usize, total: usize, url: &Url) -> String {
    if total > 1 {
        format!("Downloading [{}/{}]: {}", index + 1, total, url)
    } else {
        format!("Downloading: {}", url)
    }
}

fn print_summary(console: &Console, report: &BatchReport, status: &Result<(), BatchError>) {
    match status {
        Ok(()) if report.total() == 1 => console.success("Download completed successfully!"),
        Ok(()) => console.success("All downloads completed successfully!"),
        Err(BatchError::Cancelled) => console.error("Downloads cancelled by user"),
        Err(err @ BatchError::ItemsFailed { failures, .. }) => {
            console.error(&format!("{}:", err));
            for failure in failures {
                console.error(&format!("  {}", failure));
            }
        }
    }
}
