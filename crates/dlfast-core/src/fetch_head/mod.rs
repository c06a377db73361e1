//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to fetch response headers without a body,
//! chiefly to read `Content-Disposition` before the download starts.

mod parse;
#[cfg(test)]
pub(crate) mod test_server;

use std::str;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use parse::parse_headers;

/// Redirect hops followed before the probe gives up.
pub const MAX_REDIRECTS: u32 = 10;

/// Headers of the final response that matter for naming the download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
    /// `Content-Disposition` value if present (filename hint).
    pub content_disposition: Option<String>,
}

/// Request parameters for one probe.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub user_agent: String,
    /// Bounds the whole request, connect included.
    pub timeout: Duration,
    pub max_redirects: u32,
}

/// Why a probe produced no metadata. Callers fall back to URL-derived names.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("more than {0} redirects")]
    TooManyRedirects(u32),
    #[error("HEAD request failed: {0}")]
    Transport(#[source] curl::Error),
    #[error("HEAD returned HTTP {0}")]
    HttpStatus(u32),
    #[error("probe cancelled")]
    Cancelled,
    #[error("probe task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<curl::Error> for ProbeError {
    fn from(e: curl::Error) -> Self {
        ProbeError::Transport(e)
    }
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows up to `opts.max_redirects` redirects; only the headers of the
/// final response are parsed. Runs in the current thread; use [`probe_async`]
/// from async code.
///
/// libcurl polls `cancel` from its progress callback (at least about once a
/// second, even while a server stays silent) and aborts the transfer once it fires.
pub fn probe(
    url: &str,
    opts: &ProbeOptions,
    cancel: &CancellationToken,
) -> Result<HeadResult, ProbeError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirects)?;
    easy.connect_timeout(opts.timeout)?;
    easy.timeout(opts.timeout)?;
    easy.useragent(&opts.user_agent)?;
    easy.progress(true)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                let line = s.trim_end();
                // A new status line starts the next response in a redirect chain.
                if line.starts_with("HTTP/") {
                    headers.clear();
                }
                headers.push(line.to_string());
            }
            true
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
        transfer.perform().map_err(|e| {
            if e.is_aborted_by_callback() {
                ProbeError::Cancelled
            } else if e.is_too_many_redirects() {
                ProbeError::TooManyRedirects(opts.max_redirects)
            } else {
                ProbeError::Transport(e)
            }
        })?;
    }

    let code = easy.response_code()?;
    // FTP probes report FTP reply codes; only HTTP status is checked.
    if url.starts_with("http") && !(200..300).contains(&code) {
        return Err(ProbeError::HttpStatus(code));
    }

    Ok(parse_headers(&headers))
}

/// Runs [`probe`] on the blocking pool. The blocking task ends soon after
/// `cancel` fires, so it never holds up runtime shutdown.
pub async fn probe_async(
    url: &str,
    opts: &ProbeOptions,
    cancel: &CancellationToken,
) -> Result<HeadResult, ProbeError> {
    let url = url.to_string();
    let opts = opts.clone();
    let cancel = cancel.clone();
    tokio::task::spawn_blocking(move || probe(&url, &opts, &cancel)).await?
}
