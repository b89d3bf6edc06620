use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

/// A file is finished once it has not been modified for `threshold`.
///
/// The boundary is inclusive. Files dated in the future are never finished.
pub fn is_quiescent(modified: SystemTime, now: SystemTime, threshold: Duration) -> bool {
    match now.duration_since(modified) {
        Ok(age) => age >= threshold,
        Err(_) => false,
    }
}

/// Lists finished recordings under `root` matching `pattern`.
///
/// `skip` (the processed directory) is never descended into. Unreadable
/// entries are logged and left out; a missing root simply yields nothing.
/// Only an invalid pattern is an error.
pub fn discover(
    root: &Path,
    pattern: &str,
    skip: &Path,
    threshold: Duration,
    now: SystemTime,
) -> Result<Vec<PathBuf>, glob::PatternError> {
    let root_pattern = glob::Pattern::escape(&root.to_string_lossy());
    let full = format!("{}/{}", root_pattern.trim_end_matches('/'), pattern);

    let mut found = Vec::new();
    for entry in glob::glob(&full)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(path = %e.path().display(), "skipping unreadable entry: {}", e.error());
                continue;
            }
        };
        if path.starts_with(skip) {
            continue;
        }
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), "failed to stat recording: {e}");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                warn!(path = %path.display(), "failed to read modification time: {e}");
                continue;
            }
        };
        if is_quiescent(modified, now, threshold) {
            found.push(path);
        } else {
            debug!(path = %path.display(), "recording still being written");
        }
    }
    found.sort();
    Ok(found)
}
