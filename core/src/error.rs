//! Error types for the Nylas client.
//!
//! # Design
//! Everything that can be rejected locally (parameters, missing token,
//! configuration) fails before a request is dispatched. Transport failures
//! carry the underlying client's message unchanged. `NotFound` gets its own
//! variant because callers routinely branch on it; every other non-2xx
//! status lands in `HttpError`.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by `NylasClient` and its resource handles.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A parameter failed its endpoint schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation needs an account access token and none is configured.
    #[error("access token is missing or empty")]
    MissingAccessToken,

    /// Client options could not be assembled.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request could not be assembled (e.g. a missing path segment).
    #[error("invalid request: {0}")]
    Request(String),

    /// The HTTP client failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be decoded.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A raw message body could not be parsed as MIME.
    #[error("mime parsing failed: {0}")]
    Mime(String),
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
