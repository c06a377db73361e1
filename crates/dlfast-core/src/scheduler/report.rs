//! Batch aggregate: per-item outcomes in input order and the final status.

use std::fmt;
use url::Url;

use crate::downloader::DownloadFailure;
use crate::item::{DownloadItem, ItemOutcome};

/// Outcome of one item, keyed by its position in the target list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub index: usize,
    pub item: DownloadItem,
    pub outcome: ItemOutcome,
}

/// One failed item as listed in the final summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub index: usize,
    pub url: Url,
    pub reason: DownloadFailure,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.url, self.reason)
    }
}

/// Batch-level failure. Cancellation wins over item failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("downloads cancelled by user")]
    Cancelled,
    #[error("{} of {total} downloads failed", failures.len())]
    ItemsFailed {
        failures: Vec<ItemFailure>,
        total: usize,
    },
}

impl BatchError {
    /// Process exit code for this failure: 130 for an interrupted run, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            BatchError::Cancelled => 130,
            BatchError::ItemsFailed { .. } => 1,
        }
    }
}

/// Everything a batch run produced. `items` is sorted by input index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|r| r.outcome.is_success()).count()
    }

    /// Failed items in input order. Cancelled items are not failures.
    pub fn failures(&self) -> Vec<ItemFailure> {
        self.items
            .iter()
            .filter_map(|r| match &r.outcome {
                ItemOutcome::Failed(reason) => Some(ItemFailure {
                    index: r.index,
                    url: r.item.url().clone(),
                    reason: reason.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn status(&self) -> Result<(), BatchError> {
        if self.cancelled {
            return Err(BatchError::Cancelled);
        }
        let failures = self.failures();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(BatchError::ItemsFailed {
                failures,
                total: self.total(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<ItemOutcome>, cancelled: bool) -> BatchReport {
        let items = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| ItemReport {
                index,
                item: DownloadItem::new(
                    Url::parse(&format!("https://example.com/{index}.bin")).unwrap(),
                ),
                outcome,
            })
            .collect();
        BatchReport { items, cancelled }
    }

    #[test]
    fn all_succeeded_is_ok() {
        let r = report(vec![ItemOutcome::Succeeded, ItemOutcome::Succeeded], false);
        assert_eq!(r.succeeded(), 2);
        assert!(r.status().is_ok());
    }

    #[test]
    fn failures_listed_in_input_order() {
        let r = report(
            vec![
                ItemOutcome::Failed(DownloadFailure::ExitCode(7)),
                ItemOutcome::Succeeded,
                ItemOutcome::Failed(DownloadFailure::AccessDeniedOrNotFound),
            ],
            false,
        );
        let err = r.status().unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "2 of 3 downloads failed");
        let BatchError::ItemsFailed { failures, total } = err else {
            panic!("expected item failures");
        };
        assert_eq!(total, 3);
        assert_eq!(failures[0].index, 0);
        assert_eq!(failures[1].index, 2);
        assert_eq!(
            failures[1].to_string(),
            "https://example.com/2.bin - access denied or not found"
        );
    }

    #[test]
    fn cancellation_overrides_failures() {
        let r = report(
            vec![
                ItemOutcome::Failed(DownloadFailure::ExitCode(1)),
                ItemOutcome::Cancelled,
            ],
            true,
        );
        let err = r.status().unwrap_err();
        assert_eq!(err, BatchError::Cancelled);
        assert_eq!(err.exit_code(), 130);
    }
}
