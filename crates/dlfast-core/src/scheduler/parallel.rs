//! Bounded worker pool: one task per item, at most `parallel` downloaders at once.
//!
//! Every item gets its own task up front. A task waits for a semaphore permit
//! before resolving its filename and launching the downloader, and returns the
//! permit when the downloader exits. Results go through a channel sized to the
//! batch so a finishing worker never waits on the collector.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::DownloadConfig;
use crate::downloader::{self, DownloadFailure, DownloaderBinary};
use crate::item::{DownloadItem, ItemOutcome};

use super::progress::BatchEvent;
use super::report::{BatchReport, ItemReport};

/// Read-only state shared by all workers of one batch.
struct WorkerContext {
    target_dir: PathBuf,
    cfg: Arc<DownloadConfig>,
    downloader: Arc<DownloaderBinary>,
    cancel: CancellationToken,
    permits: Arc<Semaphore>,
    events: Option<mpsc::Sender<BatchEvent>>,
}

impl WorkerContext {
    async fn emit(&self, event: BatchEvent) {
        if let Some(tx) = &self.events {
            // A receiver that went away only loses live feedback.
            let _ = tx.send(event).await;
        }
    }
}

/// Downloads every target into `target_dir` and returns the outcomes in input order.
///
/// Never fails as a whole: per-item problems are recorded in the report and
/// [`BatchReport::status`] turns them into the batch verdict. Once `cancel`
/// fires, items still waiting for a permit are marked cancelled without
/// launching anything and running downloaders are terminated.
///
/// If `events` is `Some`, the receiver must be drained concurrently.
pub async fn run_batch(
    targets: Vec<Url>,
    target_dir: PathBuf,
    cfg: Arc<DownloadConfig>,
    downloader: Arc<DownloaderBinary>,
    cancel: CancellationToken,
    events: Option<mpsc::Sender<BatchEvent>>,
) -> BatchReport {
    let total = targets.len();
    let parallel = cfg.parallel.max(1);
    tracing::info!(total, parallel, dir = %target_dir.display(), "starting batch");

    let ctx = Arc::new(WorkerContext {
        target_dir,
        cfg,
        downloader,
        cancel,
        permits: Arc::new(Semaphore::new(parallel)),
        events,
    });
    let (results_tx, mut results_rx) = mpsc::channel::<ItemReport>(total.max(1));

    let mut join_set = JoinSet::new();
    for (index, url) in targets.iter().enumerate() {
        let item = DownloadItem::new(url.clone());
        let ctx = Arc::clone(&ctx);
        let results = results_tx.clone();
        join_set.spawn(run_worker(index, item, ctx, results));
    }
    drop(results_tx);

    let mut join_errors = Vec::new();
    while let Some(res) = join_set.join_next().await {
        if let Err(e) = res {
            tracing::error!("download worker join: {}", e);
            join_errors.push(e.to_string());
        }
    }

    let mut slots: Vec<Option<ItemReport>> = vec![None; total];
    while let Some(report) = results_rx.recv().await {
        let index = report.index;
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(report);
        }
    }

    let items: Vec<ItemReport> = slots
        .into_iter()
        .zip(targets)
        .enumerate()
        .map(|(index, (slot, url))| {
            slot.unwrap_or_else(|| {
                let reason = join_errors
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "no result reported".to_string());
                ItemReport {
                    index,
                    item: DownloadItem::new(url),
                    outcome: ItemOutcome::Failed(DownloadFailure::WorkerAborted(reason)),
                }
            })
        })
        .collect();

    let report = BatchReport {
        items,
        cancelled: ctx.cancel.is_cancelled(),
    };
    tracing::info!(
        total,
        succeeded = report.succeeded(),
        failed = report.failures().len(),
        cancelled = report.cancelled,
        "batch finished"
    );
    report
}

async fn run_worker(
    index: usize,
    mut item: DownloadItem,
    ctx: Arc<WorkerContext>,
    results: mpsc::Sender<ItemReport>,
) {
    let permit = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => None,
        permit = Arc::clone(&ctx.permits).acquire_owned() => permit.ok(),
    };

    let outcome = match permit {
        None => ItemOutcome::Cancelled,
        Some(_permit) => {
            ctx.emit(BatchEvent::Started {
                index,
                url: item.url().clone(),
            })
            .await;
            downloader::download_item(
                &mut item,
                &ctx.target_dir,
                &ctx.cfg,
                &ctx.downloader,
                &ctx.cancel,
            )
            .await
        }
    };

    ctx.emit(BatchEvent::Finished {
        index,
        url: item.url().clone(),
        file_path: item.file_path().map(|p| p.to_path_buf()),
        outcome: outcome.clone(),
    })
    .await;

    // Capacity equals the batch size, so this never waits.
    if let Err(e) = results.try_send(ItemReport {
        index,
        item,
        outcome,
    }) {
        tracing::error!(index, "dropping item result: {}", e);
    }
}
