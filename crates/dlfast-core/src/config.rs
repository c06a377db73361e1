use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default external downloader binary.
pub const DEFAULT_DOWNLOADER: &str = "aria2c";

/// Persistent defaults loaded from `~/.config/dlfast/config.toml`.
///
/// Every field is optional in the file; anything missing takes the built-in default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DlfastConfig {
    /// Overall network timeout handed to the downloader, in seconds.
    pub timeout_secs: u32,
    /// Connect timeout in seconds. Also bounds the HEAD probe.
    pub connect_timeout_secs: u32,
    /// Maximum attempts per download (0 lets the downloader retry forever).
    pub max_tries: u32,
    /// Seconds between retries.
    pub retry_wait_secs: u32,
    /// Maximum number of downloader processes running at once.
    pub parallel: usize,
    /// User-Agent override for both the probe and the downloader.
    pub user_agent: Option<String>,
    /// Bandwidth cap per download, e.g. "1M" or "500K".
    pub max_speed: Option<String>,
    /// Name or path of the external downloader.
    pub downloader: String,
}

impl Default for DlfastConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            connect_timeout_secs: 30,
            max_tries: 5,
            retry_wait_secs: 10,
            parallel: 2,
            user_agent: None,
            max_speed: None,
            downloader: DEFAULT_DOWNLOADER.to_string(),
        }
    }
}

impl DlfastConfig {
    /// Starting point for one invocation; the CLI overlays its flags on top.
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            destination: String::new(),
            max_speed: self.max_speed.clone(),
            timeout_secs: self.timeout_secs,
            connect_timeout_secs: self.connect_timeout_secs,
            max_tries: self.max_tries,
            retry_wait_secs: self.retry_wait_secs,
            user_agent: self.user_agent.clone(),
            parallel: self.parallel,
            quiet: false,
        }
    }
}

/// Immutable configuration for one invocation, shared read-only by every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Raw destination as typed by the user; empty means the current directory.
    pub destination: String,
    pub max_speed: Option<String>,
    pub timeout_secs: u32,
    pub connect_timeout_secs: u32,
    pub max_tries: u32,
    pub retry_wait_secs: u32,
    pub user_agent: Option<String>,
    pub parallel: usize,
    pub quiet: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        DlfastConfig::default().download_config()
    }
}

/// Rejected invocation configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("parallel downloads must be at least 1")]
    ZeroParallelism,
    #[error("{name} must be greater than 0 seconds")]
    ZeroTimeout { name: &'static str },
    #[error("invalid max speed '{0}' (expected e.g. 500K, 1M or 1048576)")]
    InvalidSpeedLimit(String),
}

impl DownloadConfig {
    /// Checks the invariants every later stage relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout { name: "timeout" });
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                name: "connect timeout",
            });
        }
        if let Some(speed) = &self.max_speed {
            if !is_speed_limit(speed) {
                return Err(ConfigError::InvalidSpeedLimit(speed.clone()));
            }
        }
        Ok(())
    }

    /// User agent used for the HEAD probe when no override is configured.
    pub fn probe_user_agent(&self) -> &str {
        self.user_agent
            .as_deref()
            .filter(|ua| !ua.is_empty())
            .unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// User agent sent by the metadata probe unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("dlfast/", env!("CARGO_PKG_VERSION"));

/// aria2c speed syntax: digits with an optional K or M suffix.
fn is_speed_limit(s: &str) -> bool {
    let digits = s
        .strip_suffix(|c: char| matches!(c, 'K' | 'k' | 'M' | 'm'))
        .unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlfast")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DlfastConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DlfastConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<DlfastConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: DlfastConfig = toml::from_str(&data)?;
    Ok(cfg)
}
