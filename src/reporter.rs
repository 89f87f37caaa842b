//! Failure reporting over the pipe.
//!
//! The single path by which a [`FunctionsError`] becomes visible to the
//! orchestrator: a fixed 500 response with a JSON body and the
//! [`ERROR_CODE_HEADER`] carrying the machine-readable code, so the reader
//! can branch on the failure kind without parsing the body. This path must
//! not fail itself; the error shape is fixed and controlled, so its
//! serialization is treated as infallible.

use bytes::Bytes;
use tokio::io::AsyncWrite;

use crate::error::FunctionsError;
use crate::response::{Body, HandlerResponse};
use crate::wire::write_response;

/// Header naming the machine-readable failure code. Present only on
/// failure responses.
pub const ERROR_CODE_HEADER: &str = "Gram-Functions-Error";

/// Report `error` on `sink` as a well-formed HTTP 500 response.
pub async fn write_error<W>(sink: &mut W, error: &FunctionsError) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(error).expect("JSON serialization should not fail");

    let response = HandlerResponse::new()
        .with_status(500)
        .header("Content-Type", "application/json")
        .header("Content-Length", body.len().to_string())
        .header(ERROR_CODE_HEADER, error.code().as_str())
        .with_body(Body::Bytes(Bytes::from(body)));

    write_response(sink, response).await
}
