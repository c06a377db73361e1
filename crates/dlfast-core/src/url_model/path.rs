//! Filename extraction from URL path.

use url::Url;

use super::content_disposition::percent_decode;

/// Extracts the last path segment from a URL for use as a filename hint.
///
/// The segment is percent-decoded. Returns `None` when the path is empty,
/// the root, ends with `/` (a directory listing, not a file), or the last
/// segment is `.` or `..`.
pub fn filename_from_url_path(url: &Url) -> Option<String> {
    let path = url.path();
    if path.is_empty() || path.ends_with('/') {
        return None;
    }
    let segment = path.rsplit('/').next()?;
    let decoded = percent_decode(segment);
    if decoded.is_empty() || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded)
}
