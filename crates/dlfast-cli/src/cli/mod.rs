//! CLI for dlfast: download many URLs in parallel through aria2c.

mod batch;
pub mod console;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use dlfast_core::config::{self, DlfastConfig, DownloadConfig};
use dlfast_core::scheduler;
use std::io;
use std::path::PathBuf;

use console::Console;

/// Top-level CLI for dlfast.
#[derive(Debug, Parser)]
#[command(name = "dlfast", version)]
#[command(about = "dlfast: fast parallel downloads using aria2c", long_about = None)]
pub struct Cli {
    /// URLs to download (http, https or ftp).
    #[arg(value_name = "URL", required_unless_present_any = ["completions", "man"])]
    pub urls: Vec<String>,

    /// Destination directory (default: current directory). End it with '/' to create it.
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<String>,

    /// Maximum download speed per file, e.g. 1M or 500K.
    #[arg(long, value_name = "SPEED")]
    pub max_speed: Option<String>,

    /// Network timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u32>,

    /// Connection timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u32>,

    /// Maximum attempts per download (0 = unlimited).
    #[arg(long, value_name = "N")]
    pub max_tries: Option<u32>,

    /// Seconds to wait between retries.
    #[arg(long, value_name = "SECS")]
    pub retry_wait: Option<u32>,

    /// Custom User-Agent for the probe and the download.
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Number of files downloaded at the same time.
    #[arg(short = 'p', long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Hide downloader progress and informational messages.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Read defaults from this file instead of ~/.config/dlfast/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,

    /// Print the man page (roff) and exit.
    #[arg(long, exclusive = true)]
    pub man: bool,
}

impl Cli {
    pub async fn run(self, console: Console) -> Result<()> {
        if let Some(shell) = self.completions {
            clap_complete::generate(shell, &mut Cli::command(), "dlfast", &mut io::stdout());
            return Ok(());
        }
        if self.man {
            clap_mangen::Man::new(Cli::command())
                .render(&mut io::stdout())
                .context("render man page")?;
            return Ok(());
        }

        let file_cfg = self.load_file_config()?;
        tracing::debug!("loaded config: {:?}", file_cfg);
        let cfg = self.download_config(&file_cfg);

        let preflight = scheduler::preflight(&self.urls, &cfg, &file_cfg.downloader)?;
        batch::run_downloads(preflight, cfg, console).await
    }

    /// An explicit `--config` must load; the default file only falls back to built-ins.
    fn load_file_config(&self) -> Result<DlfastConfig> {
        match &self.config {
            Some(path) => config::load_from_path(path)
                .with_context(|| format!("load config {}", path.display())),
            None => Ok(config::load_or_init().unwrap_or_else(|e| {
                tracing::warn!("using built-in defaults, config unavailable: {:#}", e);
                DlfastConfig::default()
            })),
        }
    }

    /// File defaults with every flag given on the command line laid over them.
    pub fn download_config(&self, file_cfg: &DlfastConfig) -> DownloadConfig {
        let mut cfg = file_cfg.download_config();
        if let Some(dir) = &self.dir {
            cfg.destination = dir.clone();
        }
        if let Some(speed) = &self.max_speed {
            cfg.max_speed = Some(speed.clone());
        }
        if let Some(secs) = self.timeout {
            cfg.timeout_secs = secs;
        }
        if let Some(secs) = self.connect_timeout {
            cfg.connect_timeout_secs = secs;
        }
        if let Some(n) = self.max_tries {
            cfg.max_tries = n;
        }
        if let Some(secs) = self.retry_wait {
            cfg.retry_wait_secs = secs;
        }
        if let Some(ua) = &self.user_agent {
            cfg.user_agent = Some(ua.clone());
        }
        if let Some(n) = self.parallel {
            cfg.parallel = n;
        }
        cfg.quiet = self.quiet;
        cfg
    }
}
