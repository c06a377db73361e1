//! Destination directory resolution and the one-time write check.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Prefix of the marker file created (and removed) by the write check.
const WRITE_CHECK_PREFIX: &str = ".dlfast-write-check-";

#[derive(Debug, thiserror::Error)]
pub enum DestinationError {
    #[error("getting current directory: {0}")]
    CurrentDir(#[source] io::Error),
    #[error("destination must be a directory, got: {0}")]
    NotADirectory(String),
    #[error("creating directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("directory '{path}' is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Turns the user-supplied destination into an existing, writable, absolute directory.
///
/// - Empty input resolves to the current directory.
/// - An existing directory is used as is; an existing non-directory is rejected.
/// - A missing path is created (with parents) only when the raw input ends with
///   a path separator; otherwise it is rejected as ambiguous.
///
/// A marker file is created and removed to prove the directory is writable,
/// so workers never repeat the check.
pub fn resolve_destination(raw: &str) -> Result<PathBuf, DestinationError> {
    let target_dir = if raw.is_empty() {
        env::current_dir().map_err(DestinationError::CurrentDir)?
    } else {
        let abs = absolute(raw)?;
        match fs::metadata(&abs) {
            Ok(meta) if meta.is_dir() => abs,
            Ok(_) => return Err(DestinationError::NotADirectory(raw.to_string())),
            Err(_) if names_directory(raw) => abs,
            Err(_) => return Err(DestinationError::NotADirectory(raw.to_string())),
        }
    };

    fs::create_dir_all(&target_dir).map_err(|source| DestinationError::Create {
        path: target_dir.clone(),
        source,
    })?;
    check_writable(&target_dir)?;

    tracing::debug!(dir = %target_dir.display(), "destination ready");
    Ok(target_dir)
}

/// Absolute form of `raw` with `.` components and trailing separators removed.
fn absolute(raw: &str) -> Result<PathBuf, DestinationError> {
    let path = Path::new(raw);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map_err(DestinationError::CurrentDir)?
            .join(path)
    };
    Ok(joined.components().collect())
}

fn names_directory(raw: &str) -> bool {
    raw.ends_with(MAIN_SEPARATOR) || raw.ends_with('/')
}

fn check_writable(dir: &Path) -> Result<(), DestinationError> {
    let marker = tempfile::Builder::new()
        .prefix(WRITE_CHECK_PREFIX)
        .tempfile_in(dir)
        .map_err(|source| DestinationError::NotWritable {
            path: dir.to_path_buf(),
            source,
        })?;
    if let Err(e) = marker.close() {
        tracing::warn!(dir = %dir.display(), "could not remove write-check file: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_str(p: &Path) -> &str {
        p.to_str().unwrap()
    }

    #[test]
    fn empty_is_current_dir() {
        let dir = resolve_destination("").unwrap();
        assert_eq!(dir, env::current_dir().unwrap());
    }

    #[test]
    fn existing_directory_is_accepted_with_or_without_separator() {
        let tmp = tempfile::tempdir().unwrap();
        let plain = resolve_destination(as_str(tmp.path())).unwrap();
        assert_eq!(plain, tmp.path());
        let slashed = resolve_destination(&format!("{}/", as_str(tmp.path()))).unwrap();
        assert_eq!(slashed, tmp.path());
    }

    #[test]
    fn existing_file_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("notes.txt");
        fs::write(&file, b"x").unwrap();
        let err = resolve_destination(as_str(&file)).unwrap_err();
        assert!(matches!(err, DestinationError::NotADirectory(_)), "{err}");
        let err = resolve_destination(&format!("{}/", as_str(&file))).unwrap_err();
        assert!(matches!(err, DestinationError::NotADirectory(_)), "{err}");
    }

    #[test]
    fn missing_path_without_separator_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("downloads");
        let err = resolve_destination(as_str(&missing)).unwrap_err();
        assert!(matches!(err, DestinationError::NotADirectory(_)));
        assert!(!missing.exists());
    }

    #[test]
    fn missing_path_with_separator_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        let dir = resolve_destination(&format!("{}/", as_str(&nested))).unwrap();
        assert_eq!(dir, nested);
        assert!(nested.is_dir());
    }

    #[test]
    fn write_check_leaves_no_marker() {
        let tmp = tempfile::tempdir().unwrap();
        resolve_destination(as_str(tmp.path())).unwrap();
        let leftovers: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn read_only_directory_is_not_writable() {
        use std::os::unix::fs::PermissionsExt;

        // Root bypasses permission bits.
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        let ro = tmp.path().join("ro");
        fs::create_dir(&ro).unwrap();
        fs::set_permissions(&ro, fs::Permissions::from_mode(0o555)).unwrap();
        let err = resolve_destination(as_str(&ro)).unwrap_err();
        fs::set_permissions(&ro, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(err, DestinationError::NotWritable { .. }), "{err}");
    }
}
