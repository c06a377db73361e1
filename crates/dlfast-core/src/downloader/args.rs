//! aria2c argument vector.

use std::path::Path;
use url::Url;

use crate::config::DownloadConfig;

/// Connections aria2c may open to one server for a single file.
pub const MAX_CONNECTIONS_PER_SERVER: u32 = 8;

/// Fixed tuning applied to every download. Not exposed on the CLI.
const SPLIT_TUNING: [&str; 4] = [
    "--continue=true",
    "--split=32",
    "--min-split-size=1M",
    "--file-allocation=falloc",
];

const SESSION_TUNING: [&str; 11] = [
    "--max-file-not-found=3",
    "--summary-interval=1",
    "--console-log-level=warn",
    "--auto-file-renaming=false",
    "--allow-overwrite=true",
    "--conditional-get=true",
    "--check-integrity=true",
    "--disk-cache=128M",
    "--async-dns=true",
    "--http-accept-gzip=true",
    "--remote-time=true",
];

/// Builds the full argument vector for one download. The URL is always last.
pub fn build_downloader_args(
    target_dir: &Path,
    filename: &str,
    url: &Url,
    cfg: &DownloadConfig,
) -> Vec<String> {
    let mut args = vec![
        format!("--dir={}", target_dir.display()),
        format!("--out={}", filename),
        format!("--max-connection-per-server={}", MAX_CONNECTIONS_PER_SERVER),
    ];
    args.extend(SPLIT_TUNING.iter().map(|s| s.to_string()));
    args.push(format!("--max-tries={}", cfg.max_tries));
    args.push(format!("--retry-wait={}", cfg.retry_wait_secs));
    args.push(format!("--connect-timeout={}", cfg.connect_timeout_secs));
    args.push(format!("--timeout={}", cfg.timeout_secs));
    args.extend(SESSION_TUNING.iter().map(|s| s.to_string()));

    if let Some(speed) = cfg.max_speed.as_deref().filter(|s| !s.is_empty()) {
        args.push(format!("--max-download-limit={}", speed));
    }
    if let Some(ua) = cfg.user_agent.as_deref().filter(|s| !s.is_empty()) {
        args.push(format!("--user-agent={}", ua));
    }

    args.push(url.to_string());
    args
}
