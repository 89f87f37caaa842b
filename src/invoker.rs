//! Handler invocation and failure classification.
//!
//! The single place where raw handler outcomes become typed results: a
//! Response-shaped value passes through, everything else is converted to
//! exactly one [`FunctionsError`]. Structured errors raised deeper in the
//! stack are never double-wrapped.

use crate::args::{Invocation, InvocationKind};
use crate::error::{ErrorCode, FunctionsError};
use crate::response::HandlerResponse;
use crate::runtime::{Handler, ReturnValue, Thrown};

/// Call the resolved handler for `invocation` and classify any failure.
///
/// The handler may perform arbitrary work of its own (network calls
/// included); nothing here inspects or transforms that - only the final
/// result is type-checked.
pub async fn invoke(
    handler: &mut dyn Handler,
    invocation: &Invocation,
) -> Result<HandlerResponse, FunctionsError> {
    let kind = invocation.kind();

    match handler.call(invocation.target(), invocation.input()).await {
        Ok(ReturnValue::Response(response)) => Ok(response),
        Ok(ReturnValue::Other(type_name)) => Err(invalid_result(kind, &type_name)),
        Err(Thrown::Functions(error)) => Err(error),
        Err(Thrown::Response(response)) => Ok(response),
        Err(Thrown::Message(message)) => Err(call_failed(kind, message)),
    }
}

fn invalid_result(kind: InvocationKind, type_name: &str) -> FunctionsError {
    let (code, message) = match kind {
        InvocationKind::Tool => (
            ErrorCode::InvalidToolResult,
            "Tool call did not return a valid response",
        ),
        InvocationKind::Resource => (
            ErrorCode::InvalidResourceResult,
            "Resource request did not return a valid response",
        ),
    };

    FunctionsError::new(code, message)
        .with_cause(format!("Expected a `Response` value but got `{type_name}`"))
}

fn call_failed(kind: InvocationKind, message: Option<String>) -> FunctionsError {
    let (code, fallback) = match kind {
        InvocationKind::Tool => (ErrorCode::ToolCallFailed, "Tool call failed"),
        InvocationKind::Resource => (ErrorCode::ResourceRequestFailed, "Resource access failed"),
    };

    FunctionsError::new(code, message.unwrap_or_else(|| fallback.to_string()))
}
