//! Forward Error Types
//!
//! [`ParseError`] covers malformed query documents. [`ForwardError`] covers everything that
//! can go wrong while delegating a sub-selection to the registration service.

/// A query document could not be tokenized or parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Syntax error at offset {offset}: {message}")]
pub struct ParseError {
    /// Byte offset into the source where the problem was detected.
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Failure while forwarding a query to the upstream service.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The client document itself is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The request never produced a response (connection refused, TLS, body read).
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status and no GraphQL envelope.
    #[error("Upstream responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The upstream reported errors in its `errors` array.
    #[error("Upstream returned errors: {0}")]
    Upstream(String),

    /// The envelope had neither usable `data` nor `errors`.
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),
}
