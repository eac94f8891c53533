use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

/// Raised while resolving action inputs from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("input `{0}` is required but was not supplied")]
    Missing(String),
    #[error("input `{name}` has invalid value `{value}`: expected {expected}")]
    Invalid {
        name: String,
        value: String,
        expected: &'static str,
    },
}

pub const DEFAULT_PART_SIZE_BYTES: u64 = 1024;

/// Immutable run configuration, resolved once from the environment at startup
/// and owned by the orchestrator for the duration of the run.
#[derive(Debug, Clone)]
pub struct Config {
    pub access_token: String,
    pub file: Option<String>,
    pub destination: String,
    pub pattern: Option<String>,
    pub display_progress: bool,
    pub part_size_bytes: u64,
    pub working_directory: PathBuf,
}

impl Config {
    /// Reads every recognized input from the environment, applying defaults
    /// for absent optional values. Fails on a missing required input or a
    /// present value that does not convert to its declared type. Reads
    /// environment state only; no other side effects.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config {
            access_token: required("accessToken")?,
            pattern: optional("pattern"),
            file: optional("file"),
            destination: required("destination")?,
            display_progress: optional_bool("displayProgress")?.unwrap_or(false),
            part_size_bytes: optional_u64("partSizeBytes")?.unwrap_or(DEFAULT_PART_SIZE_BYTES),
            working_directory: optional("workingDirectory")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        debug!(
            destination = %config.destination,
            pattern = ?config.pattern,
            file = ?config.file,
            part_size_bytes = config.part_size_bytes,
            working_directory = %config.working_directory.display(),
            "Resolved action inputs"
        );
        Ok(config)
    }
}

/// Maps an action input name to the variable the workflow runner exports for
/// it, e.g. `partSizeBytes` becomes `INPUT_PARTSIZEBYTES`.
fn input_var(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// The runner exports empty strings for inputs the workflow left out, so an
/// empty value counts as absent.
fn raw(name: &str) -> Option<String> {
    env::var(input_var(name)).ok().filter(|v| !v.is_empty())
}

fn required(name: &str) -> Result<String, ConfigError> {
    raw(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    raw(name)
}

fn optional_bool(name: &str) -> Result<Option<bool>, ConfigError> {
    match raw(name) {
        None => Ok(None),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid {
                name: name.to_string(),
                value,
                expected: "`true` or `false`",
            }),
        },
    }
}

fn optional_u64(name: &str) -> Result<Option<u64>, ConfigError> {
    match raw(name) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(ConfigError::Invalid {
                name: name.to_string(),
                value,
                expected: "a non-negative integer",
            }),
        },
    }
}
