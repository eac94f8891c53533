//! dropbox-upload: CI action glue that uploads local files to Dropbox.
//!
//! Resolves action inputs from the environment, expands an optional glob
//! pattern against an effective working directory, forwards the matching
//! files (and an optional explicitly named file) to Dropbox's upload API,
//! and reports the uploaded paths back to the workflow as a step output.

pub mod config;
pub mod dropbox;
pub mod expand;
pub mod github;
pub mod run;
pub mod uploader;

pub use config::{Config, ConfigError};
pub use dropbox::DropboxClient;
pub use github::{GithubWorkflow, WorkflowLog};
pub use run::{execute, run};
pub use uploader::{
    BatchOptions, FileMetadata, FileSpec, ProgressEvent, UploadError, UploadRequest, Uploader,
};
