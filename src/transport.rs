//! Types exchanged with the surrounding transport layer.
//!
//! The dispatcher is transport-agnostic: it consumes a [`Request`] snapshot,
//! streams through a [`ResponseSink`] when a handler writes directly, and
//! otherwise yields a buffered [`Response`] for the caller to send.

use http::{Method, StatusCode};
use std::io;

/// Snapshot of an inbound request as handed over by the embedding server.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub identity: Option<String>,
}

impl Request {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            content_type: None,
            body: Vec::new(),
            identity: None,
        }
    }

    pub fn with_body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.content_type = Some(content_type.to_string());
        self.body = body;
        self
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = Some(identity.to_string());
        self
    }
}

/// Streaming side of the response.
///
/// A sink becomes committed once any bytes are streamed; after that point the
/// dispatcher can no longer rewrite the status line, and handler failures turn
/// into [`crate::error::FatalError`].
pub trait ResponseSink {
    fn committed(&self) -> bool;

    /// Writes a chunk directly to the client, marking the sink committed.
    fn stream(&mut self, chunk: &[u8]) -> io::Result<()>;
}

/// In-memory sink used by embedders that buffer before sending, and by tests.
#[derive(Debug, Default)]
pub struct BufferSink {
    committed: bool,
    pub buffer: Vec<u8>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseSink for BufferSink {
    fn committed(&self) -> bool {
        self.committed
    }

    fn stream(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.committed = true;
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }
}

/// Buffered response produced when the handler did not stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    /// Status line only, no body. Used for 204 and for 500s, which carry no
    /// detail to the client.
    pub fn status_only(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Plain-text error body; 4xx responses report what was wrong with the
    /// request.
    pub fn plain_text(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain;charset=UTF-8".to_string()),
            body: message.as_bytes().to_vec(),
        }
    }

    pub fn with_content(status: StatusCode, content_type: String, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: Some(content_type),
            body,
        }
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug)]
pub enum Reply {
    /// The dispatcher produced a buffered response for the caller to send.
    Response(Response),
    /// The handler streamed through the sink; there is nothing left to send.
    Committed,
}

impl Reply {
    pub fn into_response(self) -> Option<Response> {
        match self {
            Reply::Response(response) => Some(response),
            Reply::Committed => None,
        }
    }
}
