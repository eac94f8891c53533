//! Upload contract: the [`Uploader`] trait and its supporting types.
//!
//! The trait is implemented by the real Dropbox client and by test mocks.
//! All methods are async and return typed errors; any retry, backoff or
//! resumption behavior belongs to the implementor, not to callers.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Failure surfaced by an [`Uploader`] implementation. Fatal to the run.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("transport error talking to the upload API: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upload API returned status {status}: {summary}")]
    Api { status: u16, summary: String },
    #[error("reading local file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single-file upload: one local file to one exact remote path.
pub struct UploadRequest<'a> {
    /// Resolved local path of the file to read.
    pub file: &'a Path,
    /// Full remote path, including the file name.
    pub destination: &'a str,
}

/// One entry of a batch upload.
#[derive(Debug, Clone)]
pub struct FileSpec {
    /// Resolved local path of the file to read.
    pub path: PathBuf,
    /// Working-directory-relative name; used for the remote path and echoed
    /// in progress events and the result set.
    pub name: String,
}

/// Batch tuning and progress delivery.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Size of each transfer chunk for the provider's resumable upload.
    pub part_size_bytes: u64,
    /// Where progress events are sent, if anywhere.
    pub progress: Option<UnboundedSender<ProgressEvent>>,
}

/// How many bytes of a file have been recorded so far, out of its total.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub current: u64,
    pub total: u64,
    pub file: String,
}

/// The subset of the provider's file metadata this tool surfaces.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub id: Option<String>,
    pub path_display: Option<String>,
    pub size: Option<u64>,
}

/// Trait for uploading local files to a remote store.
///
/// Implementors own transport, authentication and chunking; callers see only
/// the two operations below plus the progress channel.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload exactly one file to the given remote path.
    async fn upload<'a>(&self, req: UploadRequest<'a>) -> Result<FileMetadata, UploadError>;

    /// Upload each file in `files` under `destination`, strictly in order.
    ///
    /// Sends a [`ProgressEvent`] on `options.progress` after each recorded
    /// chunk, and exactly one event with `current == total` per file once
    /// that file is confirmed stored. The first failing file aborts the
    /// remainder of the batch.
    async fn upload_files<'a>(
        &self,
        files: &'a [FileSpec],
        destination: &'a str,
        options: BatchOptions,
    ) -> Result<Vec<FileMetadata>, UploadError>;
}

/// Joins a remote directory and a relative name with `/` separators,
/// tolerating a trailing slash on the directory and a leading slash on the
/// name.
pub fn join_remote(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
