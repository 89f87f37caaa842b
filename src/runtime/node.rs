//! `node` subprocess engine.
//!
//! Spawns one `node` child per invocation, running the embedded bootstrap
//! module. The module path and invocation kind travel via environment
//! variables; everything else is the stdio envelope described in
//! [`envelope`](super::envelope). stderr is inherited so user logs land on
//! the host's stderr without touching the pipe.

use std::path::Path;
use std::process::Stdio;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use super::envelope::{CallEvent, CallRequest, ResolveEvent, ResponseHead};
use super::{
    import_failure, missing_export, unexpected, BoxFuture, CallOutcome, Handler, ModuleLoader,
    ReturnValue, Thrown,
};
use crate::args::InvocationKind;
use crate::error::{ErrorCode, FunctionsError};
use crate::response::{Body, HandlerResponse};

/// Bootstrap program shipped inside the host binary and handed to `node -e`.
const BOOTSTRAP: &str = include_str!("bootstrap.mjs");

/// Environment variable overriding the node command (default `node`).
pub const NODE_COMMAND_ENV: &str = "FUNCTIONS_HOST_NODE";

const MODULE_ENV: &str = "FUNCTIONS_HOST_MODULE";
const KIND_ENV: &str = "FUNCTIONS_HOST_KIND";

/// Module loader that delegates user-code execution to a `node` child.
pub struct NodeLoader {
    command: String,
}

impl NodeLoader {
    /// Loader using the command from [`NODE_COMMAND_ENV`], or `node`.
    pub fn new() -> Self {
        let command =
            std::env::var(NODE_COMMAND_ENV).unwrap_or_else(|_| "node".to_string());
        Self { command }
    }

    /// Loader using a specific node command.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn spawn(&self, code_path: &Path, kind: InvocationKind) -> std::io::Result<Child> {
        debug!(command = %self.command, kind = %kind, "spawning runtime child");

        Command::new(&self.command)
            .arg("--input-type=module")
            .arg("-e")
            .arg(BOOTSTRAP)
            .env(MODULE_ENV, code_path)
            .env(KIND_ENV, kind.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
    }
}

impl Default for NodeLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for NodeLoader {
    fn resolve(
        &self,
        code_path: &Path,
        kind: InvocationKind,
    ) -> BoxFuture<'_, Result<Box<dyn Handler>, FunctionsError>> {
        let code_path = code_path.to_path_buf();

        Box::pin(async move {
            let mut child = self
                .spawn(&code_path, kind)
                .map_err(|e| unexpected(format!("spawn {}: {e}", self.command)))?;

            let stdin = child
                .stdin
                .take()
                .ok_or_else(|| unexpected("runtime child stdin not captured"))?;
            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| unexpected("runtime child stdout not captured"))?;
            let mut stdout = BufReader::new(stdout);

            let mut line = String::new();
            let read = stdout
                .read_line(&mut line)
                .await
                .map_err(|e| unexpected(format!("read resolve event: {e}")))?;
            if read == 0 {
                return Err(unexpected("runtime exited before resolving user code"));
            }

            let event: ResolveEvent = serde_json::from_str(line.trim_end())
                .map_err(|e| unexpected(format!("malformed resolve event: {e}")))?;

            match event {
                ResolveEvent::Resolved => Ok(Box::new(NodeHandler {
                    _child: child,
                    stdin: Some(stdin),
                    stdout: Some(stdout),
                }) as Box<dyn Handler>),
                ResolveEvent::ImportError { reason } => Err(import_failure(&code_path, &reason)),
                ResolveEvent::MissingExport => Err(missing_export(&code_path, kind)),
            }
        })
    }
}

/// A resolved handler backed by a running `node` child.
///
/// The child is kept alive past the call: a streamed response body reads
/// from its stdout until EOF.
struct NodeHandler {
    _child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
}

impl Handler for NodeHandler {
    fn call(&mut self, target: &str, input: &Value) -> BoxFuture<'_, CallOutcome> {
        let request = serde_json::to_string(&CallRequest { target, input })
            .expect("JSON serialization should not fail");

        Box::pin(async move {
            let mut stdin = self
                .stdin
                .take()
                .ok_or_else(|| Thrown::Message(Some("handler already called".to_string())))?;
            let mut stdout = self
                .stdout
                .take()
                .ok_or_else(|| Thrown::Message(Some("handler already called".to_string())))?;

            stdin.write_all(request.as_bytes()).await.map_err(io_thrown)?;
            stdin.write_all(b"\n").await.map_err(io_thrown)?;
            stdin.shutdown().await.map_err(io_thrown)?;
            drop(stdin);

            let mut line = String::new();
            let read = stdout.read_line(&mut line).await.map_err(io_thrown)?;
            if read == 0 {
                return Err(Thrown::Message(Some(
                    "runtime exited before reporting a call outcome".to_string(),
                )));
            }

            let event: CallEvent = serde_json::from_str(line.trim_end())
                .map_err(|e| Thrown::Message(Some(format!("malformed call outcome: {e}"))))?;

            Ok(match event {
                CallEvent::Response(head) => {
                    ReturnValue::Response(build_response(head, stdout))
                }
                CallEvent::Thrown { message } => {
                    return Err(Thrown::Message(message.filter(|m| !m.is_empty())));
                }
                CallEvent::FunctionsError {
                    code,
                    message,
                    cause,
                } => return Err(pass_through(code, message, cause)),
                CallEvent::InvalidResult { type_name } => ReturnValue::Other(type_name),
            })
        })
    }
}

fn io_thrown(e: std::io::Error) -> Thrown {
    Thrown::Message(Some(format!("runtime I/O failed: {e}")))
}

/// Rebuild a structured error that crossed the envelope.
///
/// The child serializes the message with the wire code suffix already
/// appended; strip it so the host does not append it twice. An unknown code
/// falls back to plain thrown classification.
fn pass_through(code: String, message: String, cause: Option<String>) -> Thrown {
    let Some(code) = ErrorCode::from_wire(&code) else {
        return Thrown::Message(Some(message));
    };

    let suffix = format!(" ({})", code.as_str());
    let message = message
        .strip_suffix(suffix.as_str())
        .unwrap_or(message.as_str())
        .to_string();

    let mut error = FunctionsError::new(code, message);
    if let Some(cause) = cause {
        error = error.with_cause(cause);
    }
    Thrown::Functions(error)
}

fn build_response(head: ResponseHead, stdout: BufReader<ChildStdout>) -> HandlerResponse {
    let mut response = HandlerResponse::new()
        .with_status(head.status)
        .with_status_text(head.status_text);

    for (key, value) in head.headers {
        response = response.header(key, value);
    }

    if head.has_body {
        response = response.with_body(Body::Stream(Box::pin(stdout)));
    }

    response
}
