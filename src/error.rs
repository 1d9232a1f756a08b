//! Configuration error types for the document database client.
//!
//! This module contains the error type returned when building client
//! configuration: endpoints, master keys, connection strings and API
//! versions are all validated on construction.
//!
//! # Example
//!
//! ```rust
//! use docdb_rest::{ConfigError, MasterKey};
//!
//! let result = MasterKey::parse("not base64!");
//! assert!(matches!(result, Err(ConfigError::InvalidMasterKey { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The account endpoint is empty or not an http(s) URL.
    #[error("Invalid account endpoint '{endpoint}'. Expected an absolute URL such as 'https://account.documents.azure.com:443/'.")]
    InvalidEndpoint {
        /// The invalid endpoint that was provided.
        endpoint: String,
    },

    /// The master key is not valid base64.
    #[error("Invalid master key: {reason}. The account key must be base64 encoded.")]
    InvalidMasterKey {
        /// Why decoding failed.
        reason: String,
    },

    /// A connection string segment could not be parsed.
    #[error("Invalid connection string segment '{segment}'. Expected 'Key=Value' pairs separated by ';'.")]
    InvalidConnectionString {
        /// The offending segment.
        segment: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM-DD' (e.g., '2017-02-22').")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
