//! Process lifecycle for a single invocation.
//!
//! The whole run is one straight line:
//!
//! 1. Decode the argument vector (failure aborts the process - no pipe
//!    handle exists yet)
//! 2. Open the pre-existing pipe, write-only, exactly once
//! 3. Resolve the handler through the loader boundary
//! 4. Invoke it
//! 5. Write the success response or the classified error
//! 6. Flush and close the pipe - on every path, so the reader never blocks
//!    indefinitely

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::args::{parse_args, ParsedArgs};
use crate::error::Result;
use crate::invoker::invoke;
use crate::reporter::write_error;
use crate::runtime::{ModuleLoader, USER_CODE_FILE};
use crate::wire::write_response;

/// Conventional user code path, resolved against the working directory.
pub fn default_code_path() -> PathBuf {
    std::env::current_dir()
        .map(|dir| dir.join(USER_CODE_FILE))
        .unwrap_or_else(|_| PathBuf::from(USER_CODE_FILE))
}

/// Run one invocation end to end.
///
/// `argv` is the full argument vector, program name included. Every failure
/// from module load onward is written to the pipe as an HTTP 500; only
/// argument violations and pipe I/O errors surface as
/// [`HostError`](crate::error::HostError) and abort the process.
pub async fn run(argv: &[String], loader: &dyn ModuleLoader, code_path: &Path) -> Result<()> {
    let ParsedArgs {
        pipe_path,
        invocation,
    } = parse_args(argv)?;

    // write(true) without create: the pipe must already exist, even if it
    // vanished between the existence check and this open.
    let mut pipe = OpenOptions::new().write(true).open(&pipe_path).await?;

    debug!(kind = %invocation.kind(), target = invocation.target(), "dispatching invocation");

    let outcome = match loader.resolve(code_path, invocation.kind()).await {
        Ok(mut handler) => invoke(handler.as_mut(), &invocation).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(response) => {
            debug!(status = response.status(), "writing handler response");
            write_response(&mut pipe, response).await?;
        }
        Err(e) => {
            error!(code = %e.code(), "invocation failed: {e}");
            write_error(&mut pipe, &e).await?;
        }
    }

    pipe.shutdown().await?;
    Ok(())
}
