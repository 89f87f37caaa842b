//! Command-line contract decoding.
//!
//! The orchestrator spawns the host with two or three positional arguments:
//!
//! 1. Path to a pre-existing named pipe (opened write-only, never created)
//! 2. JSON-encoded invocation payload
//! 3. Optional kind selector, `"tool"` or `"resource"` (default `"tool"`)
//!
//! Decoding happens exactly once, here. Downstream components operate on the
//! resolved [`Invocation`] variant and never re-inspect the raw JSON.
//!
//! Any violation is a [`HostError`]: at this stage no pipe handle exists, so
//! the failure aborts the process instead of being reported as a response.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{HostError, Result};

/// Which kind of handler an invocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    /// An executable action identified by name.
    Tool,
    /// A read of an addressable resource identified by URI.
    Resource,
}

impl InvocationKind {
    /// The selector string as it appears on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Resource => "resource",
        }
    }

    fn from_arg(arg: &str) -> Result<Self> {
        match arg {
            "tool" => Ok(Self::Tool),
            "resource" => Ok(Self::Resource),
            other => Err(HostError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for InvocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded request, discriminated once at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Call the tool named `name` with `input`.
    ToolCall { name: String, input: Value },
    /// Read the resource at `uri` with `input`.
    ResourceRequest { uri: String, input: Value },
}

impl Invocation {
    /// The kind this invocation resolves handlers for.
    pub fn kind(&self) -> InvocationKind {
        match self {
            Self::ToolCall { .. } => InvocationKind::Tool,
            Self::ResourceRequest { .. } => InvocationKind::Resource,
        }
    }

    /// The tool name or resource URI.
    pub fn target(&self) -> &str {
        match self {
            Self::ToolCall { name, .. } => name,
            Self::ResourceRequest { uri, .. } => uri,
        }
    }

    /// The handler input. JSON null when the payload carried none.
    pub fn input(&self) -> &Value {
        match self {
            Self::ToolCall { input, .. } => input,
            Self::ResourceRequest { input, .. } => input,
        }
    }
}

/// Result of decoding the process argument vector.
#[derive(Debug)]
pub struct ParsedArgs {
    /// Path to the pre-existing named pipe.
    pub pipe_path: PathBuf,
    /// The decoded request.
    pub invocation: Invocation,
}

/// Decode and validate the full argument vector, program name included.
///
/// Validation order matters: argument count, pipe existence and the kind
/// selector are checked before the payload is parsed, so a malformed
/// payload never masks a contract violation.
pub fn parse_args(argv: &[String]) -> Result<ParsedArgs> {
    let args = argv.get(1..).unwrap_or_default();

    if args.len() < 2 || args.len() > 3 {
        return Err(HostError::ArgumentCount(args.len()));
    }

    let pipe_path = Path::new(&args[0]);
    if !pipe_path.exists() {
        return Err(HostError::PipeNotFound(args[0].clone()));
    }

    // Absent selector defaults to "tool" for backward compatibility.
    let kind = match args.get(2) {
        Some(arg) => InvocationKind::from_arg(arg)?,
        None => InvocationKind::Tool,
    };

    let payload: Value = serde_json::from_str(&args[1])?;
    let Value::Object(mut object) = payload else {
        return Err(HostError::PayloadNotObject);
    };

    // Extra keys (e.g. an environment map the orchestrator failed to strip)
    // are ignored rather than rejected.
    let input = object.remove("input").unwrap_or(Value::Null);

    let invocation = match kind {
        InvocationKind::Tool => match object.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => Invocation::ToolCall {
                name: name.to_string(),
                input,
            },
            _ => return Err(HostError::MissingToolName),
        },
        InvocationKind::Resource => match object.get("uri").and_then(Value::as_str) {
            Some(uri) if !uri.is_empty() => Invocation::ResourceRequest {
                uri: uri.to_string(),
                input,
            },
            _ => return Err(HostError::MissingResourceUri),
        },
    };

    Ok(ParsedArgs {
        pipe_path: pipe_path.to_path_buf(),
        invocation,
    })
}
