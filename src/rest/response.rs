//! Response wrapper for resource operations.
//!
//! This module provides [`ResourceResponse<T>`], which pairs the result of a
//! resource operation with the [`ResponseMetadata`] parsed from the
//! response headers.
//!
//! # Example
//!
//! ```rust
//! use docdb_rest::clients::ResponseMetadata;
//! use docdb_rest::rest::ResourceResponse;
//!
//! let metadata = ResponseMetadata {
//!     etag: Some("\"0000-01\"".to_string()),
//!     request_charge: Some(1.0),
//!     ..Default::default()
//! };
//! let response = ResourceResponse::new(vec!["a", "b"], metadata);
//!
//! // Deref to the data
//! assert_eq!(response.len(), 2);
//! assert_eq!(response.metadata.etag.as_deref(), Some("\"0000-01\""));
//! ```

use std::ops::{Deref, DerefMut};

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::clients::{DocDbError, ResponseMetadata};

/// The result of a resource operation together with its response metadata.
///
/// `ResourceResponse<T>` implements `Deref<Target = T>`, so methods of the
/// data can be called on the response directly.
#[derive(Debug, Clone)]
pub struct ResourceResponse<T> {
    /// The decoded response data.
    pub data: T,
    /// The metadata parsed from the response headers.
    pub metadata: ResponseMetadata,
}

impl<T> ResourceResponse<T> {
    /// Creates a new response.
    #[must_use]
    pub const fn new(data: T, metadata: ResponseMetadata) -> Self {
        Self { data, metadata }
    }

    /// Consumes the response and returns the data, dropping the metadata.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Splits the response into data and metadata.
    #[must_use]
    pub fn into_parts(self) -> (T, ResponseMetadata) {
        (self.data, self.metadata)
    }

    /// Returns the `ETag` of the resource, if the response carried one.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.metadata.etag.as_deref()
    }

    /// Returns the session token to echo under session consistency.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.metadata.session_token.as_deref()
    }

    /// Maps the data to a new type, keeping the metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> ResourceResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        ResourceResponse {
            data: f(self.data),
            metadata: self.metadata,
        }
    }

    /// Maps the data with a fallible function, keeping the metadata.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`.
    pub fn try_map<U, E, F>(self, f: F) -> Result<ResourceResponse<U>, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        Ok(ResourceResponse {
            data: f(self.data)?,
            metadata: self.metadata,
        })
    }
}

impl ResourceResponse<Bytes> {
    /// Decodes the raw body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocDbError::Json`] if the body is not a valid `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<ResourceResponse<T>, DocDbError> {
        self.try_map(|body| serde_json::from_slice(&body).map_err(DocDbError::from))
    }
}

impl<T> Deref for ResourceResponse<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for ResourceResponse<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

// Verify ResourceResponse is Send + Sync when T is Send + Sync
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceResponse<String>>();
    assert_send_sync::<ResourceResponse<Vec<serde_json::Value>>>();
};
