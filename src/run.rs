//! Orchestration of one action run: resolve inputs, resolve the effective
//! working directory, expand the pattern, forward files to the upload
//! client, and accumulate the confirmed uploads.
//!
//! The flow is linear and fail-fast: a configuration or upload error aborts
//! the remaining steps. The one tolerated failure is working-directory
//! resolution, which logs an error and continues against the unchanged
//! directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::dropbox::DropboxClient;
use crate::expand::expand_pattern;
use crate::github::WorkflowLog;
use crate::uploader::{
    join_remote, BatchOptions, FileSpec, ProgressEvent, UploadRequest, Uploader,
};

/// Resolves inputs from the environment, builds the Dropbox client and runs
/// the flow. Returns the uploaded relative paths, in upload order.
pub async fn run(log: &impl WorkflowLog) -> Result<Vec<String>> {
    let config = Config::from_env().context("resolving action inputs")?;
    let client = DropboxClient::new(&config.access_token)?;
    execute(&config, &client, log).await
}

/// The flow proper, generic over the upload client so tests can drive it
/// with a mock.
pub async fn execute<U: Uploader>(
    config: &Config,
    client: &U,
    log: &impl WorkflowLog,
) -> Result<Vec<String>> {
    info!("Starting upload run");

    log.start_group("input args");
    log.info(&format!("pattern {}", display_opt(config.pattern.as_deref())));
    log.info(&format!("file {}", display_opt(config.file.as_deref())));
    log.info(&format!("destination {}", config.destination));
    log.info(&format!("displayProgress {}", config.display_progress));
    log.info(&format!("partSizeBytes {}", config.part_size_bytes));
    log.info(&format!(
        "workingDirectory {}",
        config.working_directory.display()
    ));
    log.end_group();

    let workdir = resolve_working_directory(&config.working_directory, log);

    let mut uploaded: Vec<String> = Vec::new();

    if let Some(pattern) = &config.pattern {
        log.start_group(&format!("uploading batch {pattern}"));
        let outcome = upload_batch(config, client, log, &workdir, pattern).await;
        log.end_group();
        uploaded.append(&mut outcome?);
    }

    if let Some(file) = &config.file {
        let destination = join_remote(&config.destination, file);
        let local = workdir.join(file);
        client
            .upload(UploadRequest {
                file: &local,
                destination: &destination,
            })
            .await
            .with_context(|| format!("uploading `{file}` to `{destination}`"))?;
        log.info(&format!("Uploaded: {file}"));
        uploaded.push(file.clone());
    }

    info!(uploaded = uploaded.len(), "Upload run finished");
    Ok(uploaded)
}

/// Expands the pattern and drives the batch upload, draining progress events
/// on the same task. Returns the files whose progress reached 100%.
async fn upload_batch<U: Uploader>(
    config: &Config,
    client: &U,
    log: &impl WorkflowLog,
    workdir: &Path,
    pattern: &str,
) -> Result<Vec<String>> {
    let files = expand_pattern(workdir, pattern)
        .with_context(|| format!("expanding pattern `{pattern}`"))?;
    log.info(&format!("File list: {}", file_list(&files)));

    let specs: Vec<FileSpec> = files
        .iter()
        .map(|relative| FileSpec {
            path: workdir.join(relative),
            name: relative.to_string_lossy().into_owned(),
        })
        .collect();

    let (tx, rx) = mpsc::unbounded_channel();
    let options = BatchOptions {
        part_size_bytes: config.part_size_bytes,
        progress: Some(tx),
    };
    // Two futures, one task: the upload owns the sender, so the drain ends
    // as soon as the upload future resolves and drops it.
    let (result, completed) = tokio::join!(
        client.upload_files(&specs, &config.destination, options),
        drain_progress(rx, config.display_progress, log),
    );
    result.with_context(|| format!("uploading batch `{pattern}`"))?;
    Ok(completed)
}

/// Narrates progress and collects each file whose progress reached 100%.
/// Completion always appends, whatever the narration style.
async fn drain_progress(
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    display_progress: bool,
    log: &impl WorkflowLog,
) -> Vec<String> {
    let mut completed = Vec::new();
    while let Some(event) = rx.recv().await {
        let percent = percent(event.current, event.total);
        if percent == 100 {
            if display_progress {
                log.info(&format!("Uploading 100%: {}", event.file));
            } else {
                log.info(&format!("Uploaded: {}", event.file));
            }
            completed.push(event.file);
        } else if display_progress {
            log.info(&format!("Uploading {percent}%: {}", event.file));
        }
    }
    completed
}

/// Truncating percentage, so 100 means the transfer actually finished; an
/// empty file is complete by definition.
fn percent(current: u64, total: u64) -> u64 {
    if total == 0 {
        100
    } else {
        ((current as u128 * 100) / total as u128) as u64
    }
}

/// Canonicalizes the requested working directory. A path that is missing or
/// not a directory logs an error and leaves the run in the process's
/// current directory.
fn resolve_working_directory(requested: &Path, log: &impl WorkflowLog) -> PathBuf {
    log.start_group("working directory");
    let current = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    log.info(&format!("Starting directory: {}", current.display()));
    let resolved = match std::fs::canonicalize(requested) {
        Ok(dir) if dir.is_dir() => {
            log.info(&format!("New directory: {}", dir.display()));
            dir
        }
        Ok(other) => {
            log.error(&format!(
                "working directory {} is not a directory",
                other.display()
            ));
            current
        }
        Err(e) => {
            log.error(&format!(
                "working directory {}: {e}",
                requested.display()
            ));
            current
        }
    };
    log.end_group();
    resolved
}

fn display_opt(value: Option<&str>) -> &str {
    value.unwrap_or("<unset>")
}

fn file_list(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_truncates_until_complete() {
        assert_eq!(percent(0, 1000), 0);
        assert_eq!(percent(999, 1000), 99);
        assert_eq!(percent(1000, 1000), 100);
    }

    #[test]
    fn percent_of_empty_total_is_complete() {
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn file_list_joins_with_commas() {
        let files = vec![PathBuf::from("a.png"), PathBuf::from("b.png")];
        assert_eq!(file_list(&files), "a.png,b.png");
    }
}
