//! Portable filename sanitization.

use chrono::{DateTime, Local};

/// Characters rejected by at least one common filesystem.
const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names Windows refuses as file names, compared case-insensitively.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Linux NAME_MAX, in bytes.
const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename so it is safe on Linux and Windows alike.
///
/// - Replaces `<>:"/\|?*` and control characters with `_`
/// - Trims leading/trailing spaces and dots
/// - Limits length to 255 bytes
/// - Replaces an empty result or a reserved device name (`CON`, `COM1`, ...)
///   with `download_<YYYYmmdd_HHMMSS>` taken from `now`
pub fn sanitize_filename(name: &str, now: &DateTime<Local>) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if ILLEGAL_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = trim_spaces_and_dots(&replaced);
    let limited = if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trim_spaces_and_dots(&trimmed[..take])
    } else {
        trimmed
    };

    if limited.is_empty() || is_reserved_name(limited) {
        generic_filename(now)
    } else {
        limited.to_string()
    }
}

/// True if `name` is a reserved device name, ignoring case.
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| name.eq_ignore_ascii_case(r))
}

/// Timestamped name used when nothing better is available.
pub(super) fn generic_filename(now: &DateTime<Local>) -> String {
    format!("download_{}", now.format("%Y%m%d_%H%M%S"))
}

fn trim_spaces_and_dots(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '.')
}
