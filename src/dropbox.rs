//! Dropbox implementation of the [`Uploader`] contract.
//!
//! Talks to the content endpoints: `files/upload` for the single-file
//! operation, and an `upload_session/start` → `append_v2` → `finish`
//! sequence with `part_size_bytes`-sized chunks for batches. No retry or
//! backoff here; every failure maps to an [`UploadError`] and is fatal.

use std::path::Path;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{debug, error};

use crate::uploader::{
    join_remote, BatchOptions, FileMetadata, FileSpec, ProgressEvent, UploadError, UploadRequest,
    Uploader,
};

const CONTENT_BASE: &str = "https://content.dropboxapi.com/2";

#[derive(Debug, serde::Deserialize)]
struct SessionStart {
    session_id: String,
}

/// Credential-authenticated Dropbox client. Constructed once per run; the
/// inner `reqwest::Client` is reused across all requests.
pub struct DropboxClient {
    http: reqwest::Client,
    access_token: String,
}

impl DropboxClient {
    pub fn new(access_token: impl Into<String>) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder().build()?;
        Ok(DropboxClient {
            http,
            access_token: access_token.into(),
        })
    }

    async fn content_request(
        &self,
        endpoint: &str,
        arg: &serde_json::Value,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, UploadError> {
        let url = format!("{CONTENT_BASE}/{endpoint}");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .header("Dropbox-API-Arg", header_json(arg))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let summary = response.text().await.unwrap_or_default();
            error!(endpoint, status = status.as_u16(), %summary, "API call failed");
            Err(UploadError::Api {
                status: status.as_u16(),
                summary,
            })
        }
    }

    async fn session_start(&self) -> Result<String, UploadError> {
        let arg = json!({ "close": false });
        let response = self
            .content_request("files/upload_session/start", &arg, Vec::new())
            .await?;
        let body: SessionStart = response.json().await?;
        debug!(session_id = %body.session_id, "Opened upload session");
        Ok(body.session_id)
    }

    async fn session_append(
        &self,
        session_id: &str,
        offset: u64,
        chunk: &[u8],
    ) -> Result<(), UploadError> {
        let arg = json!({
            "cursor": { "session_id": session_id, "offset": offset },
            "close": false,
        });
        self.content_request("files/upload_session/append_v2", &arg, chunk.to_vec())
            .await?;
        Ok(())
    }

    async fn session_finish(
        &self,
        session_id: &str,
        offset: u64,
        remote: &str,
    ) -> Result<FileMetadata, UploadError> {
        let arg = json!({
            "cursor": { "session_id": session_id, "offset": offset },
            "commit": { "path": api_path(remote), "mode": "overwrite", "mute": true },
        });
        let response = self
            .content_request("files/upload_session/finish", &arg, Vec::new())
            .await?;
        Ok(response.json().await?)
    }

    /// Chunked transfer of one batch entry. Emits a progress event after
    /// every appended chunk and exactly one completion event once the
    /// session is committed.
    async fn upload_in_session(
        &self,
        spec: &FileSpec,
        remote: &str,
        options: &BatchOptions,
    ) -> Result<FileMetadata, UploadError> {
        let total = tokio::fs::metadata(&spec.path)
            .await
            .map_err(|source| io_error(&spec.path, source))?
            .len();
        let mut file = tokio::fs::File::open(&spec.path)
            .await
            .map_err(|source| io_error(&spec.path, source))?;

        debug!(file = %spec.path.display(), remote, total, "Starting chunked upload");
        let session_id = self.session_start().await?;

        // A zero part size would never drain the file.
        let part_size = options.part_size_bytes.max(1) as usize;
        let mut buffer = vec![0u8; part_size];
        let mut offset: u64 = 0;
        loop {
            let read = file
                .read(&mut buffer)
                .await
                .map_err(|source| io_error(&spec.path, source))?;
            if read == 0 {
                break;
            }
            self.session_append(&session_id, offset, &buffer[..read])
                .await?;
            offset += read as u64;
            if offset < total {
                send_progress(options, offset, total, &spec.name);
            }
        }

        let metadata = self.session_finish(&session_id, offset, remote).await?;
        // The single completion event for this file; current == total even
        // when the file changed size since it was stat'd.
        send_progress(options, offset, offset, &spec.name);
        Ok(metadata)
    }
}

#[async_trait]
impl Uploader for DropboxClient {
    async fn upload<'a>(&self, req: UploadRequest<'a>) -> Result<FileMetadata, UploadError> {
        let bytes = tokio::fs::read(req.file)
            .await
            .map_err(|source| io_error(req.file, source))?;
        debug!(
            file = %req.file.display(),
            destination = req.destination,
            size = bytes.len(),
            "Uploading single file"
        );
        let arg = json!({ "path": api_path(req.destination), "mode": "overwrite", "mute": true });
        let response = self.content_request("files/upload", &arg, bytes).await?;
        Ok(response.json().await?)
    }

    async fn upload_files<'a>(
        &self,
        files: &'a [FileSpec],
        destination: &'a str,
        options: BatchOptions,
    ) -> Result<Vec<FileMetadata>, UploadError> {
        let mut uploaded = Vec::with_capacity(files.len());
        for spec in files {
            let remote = join_remote(destination, &spec.name);
            let metadata = self.upload_in_session(spec, &remote, &options).await?;
            uploaded.push(metadata);
        }
        Ok(uploaded)
    }
}

fn send_progress(options: &BatchOptions, current: u64, total: u64, file: &str) {
    if let Some(tx) = &options.progress {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(ProgressEvent {
            current,
            total,
            file: file.to_string(),
        });
    }
}

fn io_error(path: &Path, source: std::io::Error) -> UploadError {
    UploadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Remote paths in API arguments must be rooted.
fn api_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// `Dropbox-API-Arg` is an HTTP header, so any non-ASCII character in the
/// JSON has to be `\uXXXX`-escaped.
fn header_json(arg: &serde_json::Value) -> String {
    let raw = arg.to_string();
    let mut out = String::with_capacity(raw.len());
    let mut units = [0u16; 2];
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_path_roots_relative_destinations() {
        assert_eq!(api_path("out/a.txt"), "/out/a.txt");
        assert_eq!(api_path("/out/a.txt"), "/out/a.txt");
    }

    #[test]
    fn header_json_escapes_non_ascii() {
        let arg = json!({ "path": "/übung.txt" });
        let header = header_json(&arg);
        assert!(header.is_ascii());
        assert!(header.contains("\\u00fc"));
    }

    #[test]
    fn header_json_escapes_astral_chars_as_surrogate_pairs() {
        let arg = json!({ "path": "/📦.bin" });
        let header = header_json(&arg);
        assert!(header.contains("\\ud83d\\udce6"));
    }
}
