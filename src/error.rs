//! Error types for the execution host.
//!
//! Two failure families live here:
//!
//! - [`FunctionsError`] - the single structured error reported over the pipe.
//!   Every failure from module load onward is caught locally, converted to
//!   exactly one of these, and written as an HTTP 500 response. Constructed
//!   once per failure, never mutated, never retried.
//! - [`HostError`] - pre-protocol failures (bad argument vector, missing
//!   pipe, pipe I/O). There is no channel to report these structurally, so
//!   they surface as a non-zero process exit.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Closed set of failure codes, one per failure site.
///
/// The wire values are stable identifiers the orchestrator branches on
/// without parsing the response body. New failure modes get new codes;
/// a code is never reused for an unrelated condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A failure that escaped every other classification.
    Unexpected,
    /// Tool handler returned a value that is not Response-shaped.
    InvalidToolResult,
    /// Tool handler was called and failed.
    ToolCallFailed,
    /// User code module could not be loaded.
    ImportFailure,
    /// Module loaded but the tool export is missing or not callable.
    InvalidToolFunc,
    /// Resource handler returned a value that is not Response-shaped.
    InvalidResourceResult,
    /// Resource handler was called and failed.
    ResourceRequestFailed,
    /// Module loaded but the resource export is missing or not callable.
    InvalidResourceFunc,
}

impl ErrorCode {
    /// Wire identifier carried by the `Gram-Functions-Error` header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unexpected => "gram_err_000",
            Self::InvalidToolResult => "gram_err_001",
            Self::ToolCallFailed => "gram_err_002",
            Self::ImportFailure => "gram_err_003",
            Self::InvalidToolFunc => "gram_err_004",
            Self::InvalidResourceResult => "gram_err_005",
            Self::ResourceRequestFailed => "gram_err_006",
            Self::InvalidResourceFunc => "gram_err_007",
        }
    }

    /// Parse a wire identifier back into a code.
    ///
    /// Used when a deliberately raised error crosses the runtime boundary
    /// and must pass through classification unchanged.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "gram_err_000" => Some(Self::Unexpected),
            "gram_err_001" => Some(Self::InvalidToolResult),
            "gram_err_002" => Some(Self::ToolCallFailed),
            "gram_err_003" => Some(Self::ImportFailure),
            "gram_err_004" => Some(Self::InvalidToolFunc),
            "gram_err_005" => Some(Self::InvalidResourceResult),
            "gram_err_006" => Some(Self::ResourceRequestFailed),
            "gram_err_007" => Some(Self::InvalidResourceFunc),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error reported over the pipe.
///
/// A plain tagged value: a code, a human-readable message and an optional
/// cause string. Serializes to the JSON body of the failure response, with
/// the wire code appended to the message and `cause` omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionsError {
    code: ErrorCode,
    message: String,
    cause: Option<String>,
}

impl FunctionsError {
    /// Create an error with no cause.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach a cause string.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The failure code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The message as serialized, with the wire code suffix.
    pub fn full_message(&self) -> String {
        format!("{} ({})", self.message, self.code)
    }

    /// The cause, when one was recorded.
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl fmt::Display for FunctionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl Serialize for FunctionsError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = if self.cause.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("FunctionsError", fields)?;
        state.serialize_field("name", "FunctionsError")?;
        state.serialize_field("message", &self.full_message())?;
        if let Some(cause) = &self.cause {
            state.serialize_field("cause", cause)?;
        }
        state.end()
    }
}

/// Pre-protocol failure.
///
/// Raised before a pipe handle exists (or for I/O on the pipe itself), so
/// it aborts the process instead of being reported as a response.
#[derive(Debug, Error)]
pub enum HostError {
    /// Wrong number of positional arguments.
    #[error("expected two or three command-line arguments but got {0}")]
    ArgumentCount(usize),

    /// The pipe path does not reference an existing filesystem entry.
    #[error("named pipe does not exist: {0}")]
    PipeNotFound(String),

    /// The kind selector is neither `tool` nor `resource`.
    #[error("invalid kind argument: expected \"tool\" or \"resource\", got {0:?}")]
    InvalidKind(String),

    /// The request payload is not syntactically valid JSON.
    #[error("request payload is not valid JSON: {0}")]
    PayloadSyntax(#[from] serde_json::Error),

    /// The request payload decoded to something other than an object.
    #[error("request payload must be a JSON object")]
    PayloadNotObject,

    /// Tool payload without a usable `name`.
    #[error("tool request must have a non-empty string 'name' property")]
    MissingToolName,

    /// Resource payload without a usable `uri`.
    #[error("resource request must have a non-empty string 'uri' property")]
    MissingResourceUri,

    /// I/O error on the pipe.
    #[error("pipe I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pre-protocol operations.
pub type Result<T> = std::result::Result<T, HostError>;
