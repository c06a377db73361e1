//! Filename resolution for one target: HEAD probe first, URL-derived name otherwise.
//!
//! Probe failures are never fatal; they only change where the name comes from.

use chrono::Local;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::DownloadConfig;
use crate::fetch_head::{self, ProbeOptions, MAX_REDIRECTS};
use crate::url_model;

pub use crate::url_model::{NameSource, ResolvedName};

/// Probe settings for an invocation: the connect timeout bounds the whole HEAD request.
pub fn probe_options(cfg: &DownloadConfig) -> ProbeOptions {
    ProbeOptions {
        user_agent: cfg.probe_user_agent().to_string(),
        timeout: Duration::from_secs(u64::from(cfg.connect_timeout_secs)),
        max_redirects: MAX_REDIRECTS,
    }
}

/// Determines the local filename for `url` without fetching its body.
///
/// The probe stops early once `cancel` fires; the URL-derived name is returned then.
pub async fn resolve_filename(
    url: &Url,
    opts: &ProbeOptions,
    cancel: &CancellationToken,
) -> ResolvedName {
    let disposition = match fetch_head::probe_async(url.as_str(), opts, cancel).await {
        Ok(head) => {
            tracing::debug!(
                url = %url,
                size = ?head.content_length,
                content_type = ?head.content_type,
                "metadata probe succeeded"
            );
            head.content_disposition
        }
        Err(e) => {
            tracing::debug!(url = %url, "metadata probe failed, naming from URL: {}", e);
            None
        }
    };
    url_model::derive_filename(url, disposition.as_deref(), &Local::now())
}
