//! URL modeling and filename derivation.
//!
//! Validates download targets and derives safe local filenames from the
//! Content-Disposition header or the URL itself.

mod content_disposition;
mod path;
mod sanitize;
mod validate;

use chrono::{DateTime, Local};
use url::Url;

pub use content_disposition::parse_content_disposition_filename;
pub use path::filename_from_url_path;
pub use sanitize::{is_reserved_name, sanitize_filename};
pub use validate::{validate_target, validate_targets, InvalidTarget, TargetError, ALLOWED_SCHEMES};

/// Where a resolved filename came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// Server-suggested `Content-Disposition` filename.
    Disposition,
    /// URL path, host, or timestamp fallback.
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// Sanitized, ready to join onto the destination directory.
    pub filename: String,
    pub source: NameSource,
}

/// Derives a safe filename for saving a download.
///
/// Prefers the filename from `content_disposition` (if present and parseable),
/// otherwise falls back to [`filename_from_url`]. Timestamps in fallback names
/// come from `now`.
///
/// # Examples
///
/// - `https://example.com/archive.zip`, no header → `"archive.zip"`
/// - `https://example.com/`, `attachment; filename="report.pdf"` → `"report.pdf"`
pub fn derive_filename(
    url: &Url,
    content_disposition: Option<&str>,
    now: &DateTime<Local>,
) -> ResolvedName {
    match content_disposition.and_then(parse_content_disposition_filename) {
        Some(name) => ResolvedName {
            filename: sanitize_filename(&name, now),
            source: NameSource::Disposition,
        },
        None => ResolvedName {
            filename: filename_from_url(url, now),
            source: NameSource::Url,
        },
    }
}

/// Filename derived from the URL alone.
///
/// Uses the last path segment when there is one; otherwise
/// `download_from_<host>_<HHMMSS>`, or `downloaded_file_<YYYYmmdd_HHMMSS>`
/// when the URL has no host either.
pub fn filename_from_url(url: &Url, now: &DateTime<Local>) -> String {
    if let Some(segment) = filename_from_url_path(url) {
        return sanitize_filename(&segment, now);
    }
    match url.host_str().filter(|h| !h.is_empty()) {
        Some(host) => format!(
            "download_from_{}_{}",
            sanitize_filename(host, now),
            now.format("%H%M%S")
        ),
        None => format!("downloaded_file_{}", now.format("%Y%m%d_%H%M%S")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn derive_filename_from_url_path() {
        assert_eq!(derive_filename(&url("https://example.com/archive.zip"), None, &now()).filename, "archive.zip");
        assert_eq!(
            derive_filename(&url("https://cdn.example.com/path/to/debian-12.iso"), None, &now()).filename,
            "debian-12.iso"
        );
    }

    #[test]
    fn derive_filename_from_content_disposition() {
        assert_eq!(
            derive_filename(
                &url("https://example.com/"),
                Some("attachment; filename=\"report final.pdf\""),
                &now()
            )
            .filename,
            "report final.pdf"
        );
    }

    #[test]
    fn derive_filename_content_disposition_overrides_url() {
        assert_eq!(
            derive_filename(
                &url("https://example.com/archive.zip"),
                Some("attachment; filename=\"real-name.tar.gz\""),
                &now()
            )
            .filename,
            "real-name.tar.gz"
        );
    }

    #[test]
    fn derive_filename_sanitizes_header_value() {
        assert_eq!(
            derive_filename(
                &url("https://example.com/x"),
                Some("attachment; filename=\"../../etc/passwd\""),
                &now()
            )
            .filename,
            "_.._etc_passwd"
        );
    }

    #[test]
    fn header_without_filename_uses_url() {
        assert_eq!(
            derive_filename(&url("https://example.com/a.bin"), Some("inline"), &now()).filename,
            "a.bin"
        );
    }

    #[test]
    fn trailing_slash_falls_back_to_host() {
        assert_eq!(
            derive_filename(&url("https://example.com/archive/"), None, &now()).filename,
            "download_from_example.com_140507"
        );
        assert_eq!(
            filename_from_url(&url("https://example.com"), &now()),
            "download_from_example.com_140507"
        );
    }

    #[test]
    fn ipv6_host_is_sanitized() {
        assert_eq!(
            filename_from_url(&url("http://[::1]:8080/"), &now()),
            "download_from_[__1]_140507"
        );
    }

    #[test]
    fn reserved_segment_becomes_generic() {
        assert_eq!(filename_from_url(&url("https://example.com/nul"), &now()), "download_20240309_140507");
    }

    #[test]
    fn same_header_resolves_to_same_name() {
        let header = Some("attachment; filename*=UTF-8''q%3F%20%2A.txt");
        let a = derive_filename(&url("https://example.com/"), header, &now());
        let b = derive_filename(&url("https://example.com/"), header, &now());
        assert_eq!(a, b);
        assert_eq!(a.filename, "q_ _.txt");
        assert_eq!(a.source, NameSource::Disposition);
    }
}
