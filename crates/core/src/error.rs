//! Unified error types for subscope.
//!
//! Validation and circuit errors fail fast. Network-family errors are retried
//! by [`crate::RetryingFetcher`] and only surface wrapped in
//! [`Error::RetriesExhausted`].

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the data-acquisition layer.
///
/// `Clone` so that one settled outcome can be handed to every caller sharing
/// an in-flight request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty query or URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The transport failed before a response was received.
    #[error("TRANSPORT_ERROR: {0}")]
    Transport(String),

    /// Upstream answered with a non-ok status.
    #[error("HTTP_ERROR: status {status}")]
    HttpStatus { status: u16 },

    /// Upstream answered ok but without a JSON body.
    #[error("EMPTY_RESPONSE")]
    EmptyResponse,

    /// Upstream body did not have the expected shape.
    #[error("PARSE_ERROR: {0}")]
    Parse(String),

    /// The endpoint has failed too often recently; no request was attempted.
    #[error("CIRCUIT_OPEN: too many errors for endpoint {endpoint}")]
    CircuitOpen { endpoint: String },

    /// Every attempt failed; wraps the last underlying error.
    #[error("RETRIES_EXHAUSTED: {endpoint} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether another attempt at the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::HttpStatus { .. } | Error::EmptyResponse | Error::Parse(_))
    }
}

/// Errors from mapping one upstream record into a [`crate::SubstanceRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("record has no name")]
    MissingName,

    #[error("malformed record: {0}")]
    Malformed(String),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::Parse(_) => -32000,
            Error::Transport(_) => -32006,
            Error::EmptyResponse => -32007,
            Error::HttpStatus { .. } => -32008,
            Error::CircuitOpen { .. } => -32010,
            Error::RetriesExhausted { .. } => -32011,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
