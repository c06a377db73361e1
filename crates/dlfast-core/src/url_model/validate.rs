//! Pre-flight validation of download targets.

use url::Url;

/// Schemes the external downloader is asked to handle.
pub const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Why a single target was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("URL cannot be empty")]
    Empty,
    #[error("invalid URL format: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported URL scheme: {0} (supported: http, https, ftp)")]
    UnsupportedScheme(String),
    #[error("URL must contain a host")]
    MissingHost,
}

/// A rejected target together with the raw input that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid URL '{target}': {source}")]
pub struct InvalidTarget {
    /// Zero-based position in the input list.
    pub index: usize,
    pub target: String,
    #[source]
    pub source: TargetError,
}

/// Parses and checks one target: non-empty, valid URL, allowed scheme, has a host.
pub fn validate_target(raw: &str) -> Result<Url, TargetError> {
    if raw.trim().is_empty() {
        return Err(TargetError::Empty);
    }
    let url = Url::parse(raw)?;
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(TargetError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(TargetError::MissingHost);
    }
    Ok(url)
}

/// Validates every target before any work starts. The first invalid target
/// rejects the whole list.
pub fn validate_targets<S: AsRef<str>>(targets: &[S]) -> Result<Vec<Url>, InvalidTarget> {
    targets
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            validate_target(raw.as_ref()).map_err(|source| InvalidTarget {
                index,
                target: raw.as_ref().to_string(),
                source,
            })
        })
        .collect()
}
