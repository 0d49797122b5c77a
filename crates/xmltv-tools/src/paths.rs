//! Resolving the output and log file locations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// File name used when the output is a directory.
pub const DEFAULT_OUTPUT: &str = "xmltv.out";

/// Where to write the processed listing.
///
/// Without an explicit output, `xmltv.out` goes next to the input. An output
/// that names a directory (an existing one, or a path ending in `/`, `.` or
/// `..`) gets `xmltv.out` appended.
pub fn resolve_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    let Some(output) = output else {
        let dir = input.parent().unwrap_or_else(|| Path::new(""));
        return dir.join(DEFAULT_OUTPUT);
    };

    if names_directory(output) {
        output.join(DEFAULT_OUTPUT)
    } else {
        output.to_path_buf()
    }
}

fn names_directory(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().ends_with('/')
        || path.file_name().is_none()
        || path.is_dir()
}

/// The log file of an input: `<input>.log`.
pub fn log_path(input: &Path) -> PathBuf {
    with_suffix(input, ".log")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Move an existing log to `<log>.old` and create a new, empty one.
pub fn rotate_log(log: &Path) -> io::Result<fs::File> {
    if log.exists() {
        let old = with_suffix(log, ".old");
        if let Err(e) = fs::rename(log, &old) {
            warn!(log = %log.display(), error = %e, "Could not keep the previous log");
        }
    }
    fs::File::create(log)
}

/// Create the parent directory of `path` when it does not exist yet.
///
/// Returns whether a directory was created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<bool> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}
