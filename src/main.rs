use clap::Parser;
use tracing_subscriber::EnvFilter;

use dropbox_upload::{GithubWorkflow, WorkflowLog};

/// CI glue binary: all functional configuration arrives via `INPUT_*`
/// environment variables, the way the workflow runner exports action inputs.
#[derive(Parser)]
#[clap(
    name = "dropbox-upload",
    version,
    about = "Upload files matching a glob pattern to Dropbox from a CI workflow"
)]
struct Cli {}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let _cli = Cli::parse();

    let workflow = GithubWorkflow::new();
    match dropbox_upload::run(&workflow).await {
        Ok(files) => {
            let encoded = serde_json::to_string(&files).unwrap_or_else(|_| "[]".to_string());
            workflow.info(&format!("Success {encoded}"));
            if let Err(e) = workflow.set_output("files", &encoded) {
                workflow.set_failed(&format!("setting `files` output: {e}"));
                std::process::exit(1);
            }
        }
        Err(e) => {
            workflow.set_failed(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}
