//! External downloader (aria2c) integration.
//!
//! Locates the binary, builds its argument vector, runs one process per item
//! and turns its exit status into an item outcome. Transfer, retry and resume
//! are left entirely to aria2c.

mod args;
mod exit;
mod run;

use std::path::PathBuf;

pub use args::{build_downloader_args, MAX_CONNECTIONS_PER_SERVER};
pub use exit::{classify_exit_status, failure_for_exit_code, DownloadFailure};
pub use run::{download_item, TERMINATION_GRACE};

/// A downloader executable resolved on PATH (or given as a path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderBinary {
    /// Name as configured, e.g. `aria2c`.
    pub name: String,
    pub path: PathBuf,
}

impl DownloaderBinary {
    /// Finds `name` the way a shell would. Paths containing a separator are checked directly.
    pub fn locate(name: &str) -> Result<Self, which::Error> {
        let path = which::which(name)?;
        tracing::debug!(name, path = %path.display(), "located downloader");
        Ok(Self {
            name: name.to_string(),
            path,
        })
    }
}
