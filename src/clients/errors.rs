//! Error types for document database operations.
//!
//! # Error Handling
//!
//! The client uses specific error types for different failure scenarios:
//!
//! - [`HttpResponseError`]: Any non-success status the client has no
//!   dedicated variant for
//! - [`InvalidHttpRequestError`]: A request failed validation before it
//!   was sent
//! - [`DocDbError`]: Unified error type returned by every client operation
//!
//! Callers distinguish error kinds by matching on [`DocDbError`] rather than
//! by inspecting status codes; [`DocDbError::status`] is available when the
//! HTTP status is needed anyway.
//!
//! # Example
//!
//! ```rust,ignore
//! use docdb_rest::DocDbError;
//!
//! match docs.replace("id", &doc, Some(etag)).await {
//!     Ok(updated) => println!("new etag {:?}", updated.metadata.etag),
//!     Err(DocDbError::PreconditionFailed) => { /* re-read and try again */ }
//!     Err(DocDbError::Response(e)) => println!("status {}: {}", e.code, e.message),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use crate::error::ConfigError;
use std::fmt;
use thiserror::Error;

/// Error returned when a request receives a status the client does not map
/// to a dedicated [`DocDbError`] variant.
///
/// # Example
///
/// ```rust
/// use docdb_rest::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 409,
///     message: r#"{"code":"Conflict"}"#.to_string(),
/// };
///
/// assert!(error.to_string().contains("409"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unexpected response status {code}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The response body, decoded lossily as UTF-8.
    pub message: String,
}

/// Error returned when a request fails validation before being sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The HTTP method is not allowed for this operation.
    #[error("Invalid method {method} for {operation}; expected one of {allowed}.")]
    InvalidMethod {
        /// The method that was provided.
        method: String,
        /// The operation that rejected it.
        operation: &'static str,
        /// The methods the operation accepts.
        allowed: &'static str,
    },

    /// The method string is not a recognized HTTP method.
    #[error("Unrecognized Http method {method}.")]
    UnknownMethod {
        /// The string that failed to parse.
        method: String,
    },

    /// A query (POST list) was issued without a body.
    #[error("Cannot use {method} to query without specifying a body.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// A query operation was called without a query.
    #[error("A query is required for this operation.")]
    MissingQuery,

    /// Neither a document nor a raw body was supplied.
    #[error("Either a document or a raw body must be provided.")]
    MissingContent,

    /// Both a document and a raw body were supplied.
    #[error("Only one of a document or a raw body may be provided.")]
    AmbiguousContent,

    /// A header name or value cannot be sent on the wire.
    #[error("Invalid header {name}.")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },
}

/// Unified error type for all client operations.
#[derive(Debug, Error)]
pub enum DocDbError {
    /// The request's precondition (usually `If-Match`) failed: HTTP 412.
    #[error("Precondition failed")]
    PreconditionFailed,

    /// The resource does not exist: HTTP 404.
    #[error("Resource not found")]
    ResourceNotFound,

    /// A conditional list request found no changes: HTTP 304.
    #[error("Resource not modified")]
    ResourceNotModified,

    /// A list response body did not contain the expected array field.
    #[error("Key '{key}' not found in response")]
    KeyNotFound {
        /// The missing field name.
        key: String,
    },

    /// Any other non-success response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// The transport failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A request or response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A request body could not be read.
    #[error("Failed to read request body: {0}")]
    Body(#[from] std::io::Error),

    /// A page consumer stopped pagination with its own error.
    #[error("Page consumer failed: {0}")]
    Consumer(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DocDbError {
    /// Classifies a non-success status.
    ///
    /// 412, 404 and 304 map to their dedicated variants; every other status
    /// becomes [`DocDbError::Response`] carrying the body.
    #[must_use]
    pub fn from_status(code: u16, body: &[u8]) -> Self {
        match code {
            412 => Self::PreconditionFailed,
            404 => Self::ResourceNotFound,
            304 => Self::ResourceNotModified,
            _ => Self::unexpected_status(code, body),
        }
    }

    /// Wraps a status as [`DocDbError::Response`] without classification.
    #[must_use]
    pub fn unexpected_status(code: u16, body: &[u8]) -> Self {
        Self::Response(HttpResponseError {
            code,
            message: String::from_utf8_lossy(body).into_owned(),
        })
    }

    /// Wraps an error raised inside a page consumer.
    pub fn consumer<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Consumer(Box::new(error))
    }

    /// Returns the HTTP status this error corresponds to, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::PreconditionFailed => Some(412),
            Self::ResourceNotFound => Some(404),
            Self::ResourceNotModified => Some(304),
            Self::Response(e) => Some(e.code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DocDbError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(Box::new(error))
    }
}

/// Wraps an arbitrary message as a consumer error.
#[derive(Debug)]
struct ConsumerMessage(String);

impl fmt::Display for ConsumerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConsumerMessage {}

impl From<String> for DocDbError {
    fn from(message: String) -> Self {
        Self::Consumer(Box::new(ConsumerMessage(message)))
    }
}
