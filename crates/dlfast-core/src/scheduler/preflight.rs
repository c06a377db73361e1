//! All-or-nothing checks that run before any worker starts.
//!
//! Order: configuration, targets, downloader lookup, destination. The first
//! failure aborts the batch; nothing is probed or launched.

use std::path::PathBuf;
use url::Url;

use crate::config::{ConfigError, DownloadConfig};
use crate::destination::{resolve_destination, DestinationError};
use crate::downloader::DownloaderBinary;
use crate::url_model::{validate_targets, InvalidTarget};

/// A batch that passed every pre-flight check.
#[derive(Debug, Clone)]
pub struct Preflight {
    pub targets: Vec<Url>,
    pub target_dir: PathBuf,
    pub downloader: DownloaderBinary,
}

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no URLs given")]
    NoTargets,
    #[error(transparent)]
    InvalidTarget(#[from] InvalidTarget),
    #[error("{name} not found in PATH; please install it first")]
    DownloaderNotFound {
        name: String,
        #[source]
        source: which::Error,
    },
    #[error(transparent)]
    Destination(#[from] DestinationError),
}

pub fn preflight<S: AsRef<str>>(
    targets: &[S],
    cfg: &DownloadConfig,
    downloader: &str,
) -> Result<Preflight, PreflightError> {
    cfg.validate()?;
    if targets.is_empty() {
        return Err(PreflightError::NoTargets);
    }
    let targets = validate_targets(targets)?;
    let downloader =
        DownloaderBinary::locate(downloader).map_err(|source| PreflightError::DownloaderNotFound {
            name: downloader.to_string(),
            source,
        })?;
    let target_dir = resolve_destination(&cfg.destination)?;
    tracing::debug!(
        targets = targets.len(),
        dir = %target_dir.display(),
        downloader = %downloader.path.display(),
        "pre-flight passed"
    );
    Ok(Preflight {
        targets,
        target_dir,
        downloader,
    })
}
