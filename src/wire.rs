//! HTTP/1.1 response serialization.
//!
//! Writes a byte-exact message to the sink: status line, headers in caller
//! order, blank line, body. Ordering is strict - no header byte is written
//! after the first body byte. Streamed bodies are piped chunk by chunk with
//! every write awaited before the next read, so the sink's back-pressure
//! propagates to the source instead of queueing in memory.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::response::{Body, HandlerResponse};

/// Read buffer size for streamed bodies.
const STREAM_BUF_SIZE: usize = 64 * 1024;

/// Write `response` to `sink` as a raw HTTP/1.1 message and flush.
///
/// Headers go out verbatim - no normalization, no deduplication, no
/// case-folding. A `Content-Length` header is appended only when the body
/// is a finite buffer and the caller did not already set one. Body content
/// is never inspected or altered; binary payloads round-trip byte for
/// byte. No chunked transfer framing is applied.
pub async fn write_response<W>(sink: &mut W, response: HandlerResponse) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let needs_length =
        matches!(response.body(), Body::Bytes(_)) && response.header_value("content-length").is_none();

    let (status, status_text, headers, body) = response.into_parts();

    // Status line. An empty reason phrase keeps the separating space.
    sink.write_all(format!("HTTP/1.1 {status} {status_text}\r\n").as_bytes())
        .await?;

    for (key, value) in &headers {
        sink.write_all(format!("{key}: {value}\r\n").as_bytes()).await?;
    }

    if needs_length {
        if let Some(len) = body.len() {
            sink.write_all(format!("Content-Length: {len}\r\n").as_bytes())
                .await?;
        }
    }

    sink.write_all(b"\r\n").await?;

    match body {
        Body::Empty => {}
        Body::Bytes(bytes) => sink.write_all(&bytes).await?,
        Body::Stream(stream) => copy_body(stream, sink).await?,
    }

    sink.flush().await
}

/// Pipe a body stream to the sink without buffering it in full.
async fn copy_body<R, W>(mut stream: R, sink: &mut W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; STREAM_BUF_SIZE];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        sink.write_all(&buf[..n]).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;
    use std::io::Cursor;

    async fn serialize(response: HandlerResponse) -> Vec<u8> {
        let mut sink = Vec::new();
        write_response(&mut sink, response).await.unwrap();
        sink
    }

    fn split_message(bytes: &[u8]) -> (String, &[u8]) {
        let pos = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("message has no header terminator");
        (
            String::from_utf8(bytes[..pos].to_vec()).unwrap(),
            &bytes[pos + 4..],
        )
    }

    #[tokio::test]
    async fn test_status_line_defaults() {
        let output = serialize(HandlerResponse::new()).await;
        assert_eq!(output, b"HTTP/1.1 200 \r\n\r\n");
    }

    #[tokio::test]
    async fn test_status_line_with_reason_phrase() {
        let response = HandlerResponse::new()
            .with_status(404)
            .with_status_text("Not Found");

        let output = serialize(response).await;
        assert!(output.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_headers_written_in_caller_order() {
        let response = HandlerResponse::new()
            .header("Content-Type", "application/json")
            .header("x-next-cursor", "4")
            .header("X-Custom", "Mixed-Case Value");

        let (head, _) = split_message(&serialize(response).await);
        let lines: Vec<_> = head.split("\r\n").collect();

        assert_eq!(lines[1], "Content-Type: application/json");
        assert_eq!(lines[2], "x-next-cursor: 4");
        assert_eq!(lines[3], "X-Custom: Mixed-Case Value");
    }

    #[tokio::test]
    async fn test_content_length_appended_for_buffer_body() {
        let response = HandlerResponse::json(&json!({"ok": true})).unwrap();

        let output = serialize(response).await;
        let (head, body) = split_message(&output);

        assert!(head.contains(&format!("Content-Length: {}", body.len())));
        assert_eq!(body, br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_content_length_not_duplicated() {
        let response = HandlerResponse::new()
            .header("Content-Length", "5")
            .with_body(Body::Bytes(Bytes::from_static(b"hello")));

        let (head, _) = split_message(&serialize(response).await);
        assert_eq!(head.matches("Content-Length").count(), 1);
    }

    #[tokio::test]
    async fn test_no_content_length_for_stream_without_header() {
        let response = HandlerResponse::new()
            .with_body(Body::Stream(Box::pin(Cursor::new(b"data".to_vec()))));

        let serialized = serialize(response).await;
        let (head, body) = split_message(&serialized);
        assert!(!head.to_ascii_lowercase().contains("content-length"));
        assert_eq!(body, b"data");
    }

    #[tokio::test]
    async fn test_empty_body_ends_after_blank_line() {
        let response = HandlerResponse::new().header("X-Empty", "yes");

        let output = serialize(response).await;
        assert!(output.ends_with(b"\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_binary_stream_round_trips() {
        // Bytes that would break any text-oriented handling, including a
        // stray header terminator inside the body.
        let mut payload = vec![0u8, 159, 146, 150, 13, 10, 13, 10, 255];
        payload.extend((0..=255u8).cycle().take(200_000));

        let response = HandlerResponse::new()
            .header("Content-Length", payload.len().to_string())
            .with_body(Body::Stream(Box::pin(Cursor::new(payload.clone()))));

        let output = serialize(response).await;
        let tail = &output[output.len() - payload.len()..];
        assert_eq!(tail, payload.as_slice());
    }

    #[tokio::test]
    async fn test_buffer_body_round_trips() {
        let payload = Bytes::from_static(&[0, 1, 2, 253, 254, 255]);
        let response = HandlerResponse::new().with_body(Body::Bytes(payload.clone()));

        let output = serialize(response).await;
        let (_, body) = split_message(&output);
        assert_eq!(body, payload.as_ref());
    }
}
