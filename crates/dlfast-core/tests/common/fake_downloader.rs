//! A POSIX shell script standing in for aria2c.
//!
//! It reads `--dir=` and `--out=`, takes the URL as its last argument and
//! appends `start <url>` / `end <url>` lines to a log. URLs containing
//! `exit3` exit with code 3, URLs containing `hang` block until SIGTERM
//! (logging `term <url>`), everything else creates the output file.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use dlfast_core::downloader::DownloaderBinary;

pub struct FakeDownloader {
    pub binary: DownloaderBinary,
    pub log: PathBuf,
}

const SCRIPT: &str = r#"#!/bin/sh
log="@LOG@"
dir=""
out=""
url=""
for arg in "$@"; do
  case "$arg" in
    --dir=*) dir="${arg#--dir=}" ;;
    --out=*) out="${arg#--out=}" ;;
  esac
  url="$arg"
done
echo "start $url" >> "$log"
echo "fake-stdout $url"
echo "fake-stderr $url" >&2
case "$url" in
  *hang*)
    trap 'echo "term $url" >> "$log"; exit 143' TERM
    sleep 30 &
    echo "child $url $!" >> "$log"
    wait $!
    exit 0
    ;;
esac
sleep @SLEEP@
case "$url" in
  *exit3*)
    echo "end $url" >> "$log"
    exit 3
    ;;
esac
touch "$dir/$out"
echo "end $url" >> "$log"
exit 0
"#;

/// Writes the script into `dir`. Each normal download sleeps `sleep_secs` first.
pub fn install(dir: &Path, sleep_secs: &str) -> FakeDownloader {
    let log = dir.join("downloader.log");
    let path = dir.join("fake-aria2c");
    let script = SCRIPT
        .replace("@LOG@", &log.display().to_string())
        .replace("@SLEEP@", sleep_secs);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    FakeDownloader {
        binary: DownloaderBinary {
            name: "fake-aria2c".to_string(),
            path,
        },
        log,
    }
}

impl FakeDownloader {
    /// Log lines so far (empty if the script never ran).
    pub fn lines(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.lines()
            .iter()
            .filter(|l| l.starts_with(prefix))
            .count()
    }

    /// Pids of the background processes started by `hang` runs.
    pub fn child_pids(&self) -> Vec<i32> {
        self.lines()
            .iter()
            .filter(|l| l.starts_with("child "))
            .filter_map(|l| l.rsplit(' ').next()?.parse().ok())
            .collect()
    }

    /// Highest number of scripts that had logged `start` but not yet `end`.
    pub fn max_concurrent(&self) -> usize {
        let mut running = 0usize;
        let mut max = 0usize;
        for line in self.lines() {
            if line.starts_with("start ") {
                running += 1;
                max = max.max(running);
            } else if line.starts_with("end ") || line.starts_with("term ") {
                running = running.saturating_sub(1);
            }
        }
        max
    }
}

/// True once `pid` no longer exists or is only an unreaped zombie.
pub fn process_gone(pid: i32) -> bool {
    if unsafe { libc::kill(pid, 0) } != 0 {
        return true;
    }
    fs::read_to_string(format!("/proc/{pid}/stat"))
        .map(|stat| {
            stat.rsplit(')')
                .next()
                .is_some_and(|rest| rest.trim_start().starts_with('Z'))
        })
        .unwrap_or(true)
}
