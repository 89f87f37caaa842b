//! Response-shaped handler results.
//!
//! A handler result is validated structurally, not by concrete type
//! identity: it must carry a status, an iterable set of headers and an
//! optional body. [`HandlerResponse`] is that shape. Headers are an ordered
//! multimap - insertion order, casing, duplicates and values are all
//! preserved verbatim all the way to the wire.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use serde::Serialize;
use tokio::io::AsyncRead;

/// Boxed byte source for streamed bodies.
pub type BodyStream = Pin<Box<dyn AsyncRead + Send>>;

/// A response body.
pub enum Body {
    /// No body at all. Nothing is written after the blank line.
    Empty,
    /// A finite buffer, written in full.
    Bytes(Bytes),
    /// An unbuffered byte source (e.g. a proxied upstream body), piped to
    /// the sink chunk by chunk without loading it into memory.
    Stream(BodyStream),
}

impl Body {
    /// Byte length when known up front.
    pub fn len(&self) -> Option<u64> {
        match self {
            Self::Empty => Some(0),
            Self::Bytes(bytes) => Some(bytes.len() as u64),
            Self::Stream(_) => None,
        }
    }

    /// Whether this is the absent body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Body::Empty"),
            Self::Bytes(bytes) => write!(f, "Body::Bytes({} bytes)", bytes.len()),
            Self::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

/// The structural shape a handler must return.
///
/// Defaults mirror the wire protocol: status 200 with an empty reason
/// phrase and no body.
#[derive(Debug)]
pub struct HandlerResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    body: Body,
}

impl HandlerResponse {
    /// An empty 200 response.
    pub fn new() -> Self {
        Self {
            status: 200,
            status_text: String::new(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    /// A 200 response with a JSON body and `Content-Type` set.
    ///
    /// `Content-Length` is left to the serializer, which fills it in from
    /// the buffer size.
    pub fn json<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        let data = serde_json::to_vec(value)?;
        Ok(Self::new()
            .header("Content-Type", "application/json")
            .with_body(Body::Bytes(Bytes::from(data))))
    }

    /// Set the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set the reason phrase.
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// Append a header. Order, casing and duplicates are preserved.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The reason phrase.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Case-insensitive lookup of the first header with the given key.
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Decompose into status, reason phrase, headers and body.
    pub fn into_parts(self) -> (u16, String, Vec<(String, String)>, Body) {
        (self.status, self.status_text, self.headers, self.body)
    }
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new()
    }
}
