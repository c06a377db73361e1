//! One requested download and its terminal outcome.

use std::path::{Path, PathBuf};
use url::Url;

use crate::downloader::DownloadFailure;

/// A single target in a batch.
///
/// Created before any work starts; the worker that owns it records the
/// resolved filename and path exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadItem {
    url: Url,
    filename: Option<String>,
    file_path: Option<PathBuf>,
}

impl DownloadItem {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            filename: None,
            file_path: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolved local filename; `None` until resolution completes.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// `target_dir` joined with the resolved filename; `None` until resolution completes.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub(crate) fn record_resolution(&mut self, target_dir: &Path, filename: String) {
        debug_assert!(self.filename.is_none(), "item resolved twice");
        self.file_path = Some(target_dir.join(&filename));
        self.filename = Some(filename);
    }
}

/// Terminal state of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Succeeded,
    Failed(DownloadFailure),
    Cancelled,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Succeeded)
    }
}
