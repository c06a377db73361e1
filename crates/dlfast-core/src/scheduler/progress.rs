//! Per-item batch events for live reporting.
//!
//! Sent by workers as items start and finish so the CLI can print feedback
//! immediately rather than waiting for the final report.

use std::path::PathBuf;
use url::Url;

use crate::item::ItemOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// A worker got its permit and is about to resolve and launch.
    Started { index: usize, url: Url },
    /// The item reached a terminal outcome. `file_path` is set once the name was resolved.
    Finished {
        index: usize,
        url: Url,
        file_path: Option<PathBuf>,
        outcome: ItemOutcome,
    },
}

impl BatchEvent {
    /// Position of the item in the original target list.
    pub fn index(&self) -> usize {
        match self {
            BatchEvent::Started { index, .. } | BatchEvent::Finished { index, .. } => *index,
        }
    }
}
