use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Expands a glob pattern against `dir` and returns the matching regular
/// files as paths relative to `dir`, in traversal order. No matches is an
/// empty list, not an error; a malformed pattern is an error. Read-only
/// directory traversal, nothing else.
pub fn expand_pattern(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, glob::PatternError> {
    let full_pattern = dir.join(pattern);
    debug!(pattern = %full_pattern.display(), "Expanding glob pattern");

    let mut files = Vec::new();
    for entry in glob::glob(&full_pattern.to_string_lossy())? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    // Report paths relative to the working directory; an
                    // absolute pattern bypasses `dir` and stays absolute.
                    let relative = path
                        .strip_prefix(dir)
                        .map(Path::to_path_buf)
                        .unwrap_or(path);
                    files.push(relative);
                }
            }
            Err(e) => warn!(error = %e, "Skipping unreadable glob entry"),
        }
    }
    debug!(matched = files.len(), "Glob expansion finished");
    Ok(files)
}
