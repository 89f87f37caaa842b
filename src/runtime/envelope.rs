//! Control envelope spoken between the host and the runtime child.
//!
//! The protocol is one-shot and line-oriented on the child's stdio:
//!
//! 1. The child writes a single JSON control line reporting module
//!    resolution ([`ResolveEvent`]).
//! 2. The host writes a single JSON call request line to the child's stdin
//!    ([`CallRequest`]) and closes it.
//! 3. The child writes a single JSON control line reporting the call
//!    outcome ([`CallEvent`]). A `response` outcome with a body is followed
//!    by the raw body bytes until EOF.
//!
//! stderr is not part of the envelope; it passes through for user logs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Call request written to the child's stdin.
#[derive(Debug, Serialize)]
pub(crate) struct CallRequest<'a> {
    /// Tool name or resource URI.
    pub target: &'a str,
    pub input: &'a Value,
}

/// First control line: outcome of import plus export resolution.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum ResolveEvent {
    /// Module imported and the export is callable.
    Resolved,
    /// Dynamic import failed.
    ImportError { reason: String },
    /// Module imported but the export is missing or not callable.
    MissingExport,
}

/// Second control line: outcome of the handler call.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum CallEvent {
    /// Handler produced a Response-shaped value.
    Response(ResponseHead),
    /// Handler failed with an unstructured value.
    Thrown {
        #[serde(default)]
        message: Option<String>,
    },
    /// Handler raised a structured error deliberately.
    FunctionsError {
        code: String,
        message: String,
        #[serde(default)]
        cause: Option<String>,
    },
    /// Handler returned a value that is not Response-shaped.
    InvalidResult {
        #[serde(rename = "type")]
        type_name: String,
    },
}

/// Status, reason phrase and ordered headers of a child response.
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseHead {
    pub status: u16,
    #[serde(rename = "statusText", default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Whether raw body bytes follow the control line.
    #[serde(rename = "hasBody", default)]
    pub has_body: bool,
}
