//! Host-environment reporting: GitHub workflow commands on stdout and step
//! outputs via the `GITHUB_OUTPUT` env file.

use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};

use mockall::automock;

/// The four-severity logging surface plus grouped-output markers the
/// workflow runner understands. Diagnostic narration only; nothing here
/// affects control flow.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait WorkflowLog: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn start_group(&self, name: &str);
    fn end_group(&self);
}

/// Emits workflow commands the way the runner expects them.
#[derive(Debug, Default)]
pub struct GithubWorkflow;

impl GithubWorkflow {
    pub fn new() -> Self {
        Self
    }

    /// Publishes a step output. Appends a heredoc record to the file named
    /// by `GITHUB_OUTPUT`, falling back to the legacy command on runners
    /// that do not provide one.
    pub fn set_output(&self, name: &str, value: &str) -> io::Result<()> {
        match env::var("GITHUB_OUTPUT") {
            Ok(path) if !path.is_empty() => {
                let delimiter = format!("ghadelim-{}", uuid::Uuid::new_v4());
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{name}<<{delimiter}")?;
                writeln!(file, "{value}")?;
                writeln!(file, "{delimiter}")?;
                Ok(())
            }
            _ => {
                println!("::set-output name={}::{}", name, escape_data(value));
                Ok(())
            }
        }
    }

    /// Error annotation for a fatal failure. The caller owns the exit
    /// status.
    pub fn set_failed(&self, message: &str) {
        self.error(message);
    }
}

impl WorkflowLog for GithubWorkflow {
    fn debug(&self, message: &str) {
        println!("::debug::{}", escape_data(message));
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn warn(&self, message: &str) {
        println!("::warning::{}", escape_data(message));
    }

    fn error(&self, message: &str) {
        println!("::error::{}", escape_data(message));
    }

    fn start_group(&self, name: &str) {
        println!("::group::{}", escape_data(name));
    }

    fn end_group(&self) {
        println!("::endgroup::");
    }
}

/// Workflow command data must not carry raw `%`, CR or LF.
fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
