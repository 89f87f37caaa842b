use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use functions_host::{host, NodeLoader};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr only; stdout and the pipe must stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().collect();
    let loader = NodeLoader::new();

    match host::run(&argv, &loader, &host::default_code_path()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
