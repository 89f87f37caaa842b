//! Module-loading boundary.
//!
//! User code never executes inside this process. The [`ModuleLoader`] trait
//! models the single capability the host needs - resolve a callable given a
//! code path and an invocation kind - so the underlying execution
//! technology is swappable without touching the framing logic. The
//! production implementation, [`NodeLoader`], delegates to a `node`
//! subprocess running an embedded bootstrap module.
//!
//! Handler outcomes stay deliberately untyped at this boundary: the value a
//! handler returned ([`ReturnValue`]) and the way it failed ([`Thrown`]) are
//! both carried raw, and the invoker classifies them into a single
//! [`FunctionsError`].

mod envelope;
mod node;

pub use node::{NodeLoader, NODE_COMMAND_ENV};

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use serde_json::Value;

use crate::args::InvocationKind;
use crate::error::{ErrorCode, FunctionsError};
use crate::response::HandlerResponse;

/// Conventional user code filename, resolved against the working directory.
pub const USER_CODE_FILE: &str = "functions.js";

/// Boxed future returned by loader and handler calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler call produced when it did not fail.
#[derive(Debug)]
pub enum ReturnValue {
    /// A Response-shaped value.
    Response(HandlerResponse),
    /// Anything else. Carries the runtime type name for diagnostics.
    Other(String),
}

/// How a handler call failed, before classification.
#[derive(Debug)]
pub enum Thrown {
    /// A structured error raised deliberately by deeper logic. Passes
    /// through classification unchanged, never double-wrapped.
    Functions(FunctionsError),
    /// A response used as a non-local exit. Treated as success.
    Response(HandlerResponse),
    /// Any other failure. The message is used verbatim when present.
    Message(Option<String>),
}

/// Outcome of a single handler call.
pub type CallOutcome = Result<ReturnValue, Thrown>;

/// A resolved user handler.
///
/// `call` consumes the handler's single shot: each invocation runs in its
/// own process, so a handler is never called twice.
pub trait Handler: Send {
    /// Call the handler with the tool name or resource URI and its input.
    fn call(&mut self, target: &str, input: &Value) -> BoxFuture<'_, CallOutcome>;
}

/// Resolves a callable from a user code module.
pub trait ModuleLoader: Send + Sync {
    /// Load the module at `code_path` and resolve the handler for `kind`.
    ///
    /// A failure is terminal for the invocation; there are no retries.
    fn resolve(
        &self,
        code_path: &Path,
        kind: InvocationKind,
    ) -> BoxFuture<'_, Result<Box<dyn Handler>, FunctionsError>>;
}

/// Named export a loader resolves for the given kind, with a default-export
/// fallback bound to the default object.
pub fn export_name(kind: InvocationKind) -> &'static str {
    match kind {
        InvocationKind::Tool => "handleToolCall",
        InvocationKind::Resource => "handleResources",
    }
}

/// Filename shown in error messages. Full host paths never leak.
fn display_filename(code_path: &Path) -> String {
    code_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| code_path.display().to_string())
}

/// Canonical classification for a module that could not be imported.
pub fn import_failure(code_path: &Path, reason: &str) -> FunctionsError {
    let filename = display_filename(code_path);
    FunctionsError::new(
        ErrorCode::ImportFailure,
        format!("Unable to import user code: {filename}"),
    )
    .with_cause(format!("Failed to import {filename}: {reason}"))
}

/// Canonical classification for a module without the required export.
pub fn missing_export(code_path: &Path, kind: InvocationKind) -> FunctionsError {
    let filename = display_filename(code_path);
    let export = export_name(kind);
    let (code, message) = match kind {
        InvocationKind::Tool => (ErrorCode::InvalidToolFunc, "Unable to call tool"),
        InvocationKind::Resource => (ErrorCode::InvalidResourceFunc, "Unable to handle resources"),
    };
    FunctionsError::new(code, message)
        .with_cause(format!("{export} function not found in {filename}"))
}

/// Classification for failures of the runtime machinery itself.
fn unexpected(reason: impl Into<String>) -> FunctionsError {
    FunctionsError::new(ErrorCode::Unexpected, "Unexpected error occurred").with_cause(reason)
}
