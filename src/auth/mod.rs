//! Request authorization.
//!
//! Every outgoing request passes through an [`Authorizer`] after its options
//! have been applied. The built-in authorizer is the account [`MasterKey`],
//! which signs each request with HMAC-SHA256 (see [`signer`]). Other
//! schemes, such as resource tokens obtained elsewhere, plug in by
//! implementing the trait.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use docdb_rest::MasterKey;
//! use docdb_rest::clients::{HttpMethod, HttpRequest, ResourceType};
//!
//! let key = MasterKey::parse("dGVzdGtleQ==").unwrap();
//! let mut request = HttpRequest::new(HttpMethod::Get, "https://localhost/dbs/db1/colls/col1/docs");
//! key.authorize_at(
//!     &mut request,
//!     ResourceType::Documents,
//!     "dbs/db1/colls/col1",
//!     Utc.timestamp_opt(0, 0).unwrap(),
//! );
//!
//! assert_eq!(request.header("x-ms-date"), Some("Thu, 01 Jan 1970 00:00:00 GMT"));
//! assert!(request.header("authorization").unwrap().starts_with("type%3Dmaster"));
//! ```
//!
//! [`MasterKey`]: crate::MasterKey

pub mod signer;

pub use signer::{authorization_token, format_http_date, sign, string_to_sign};

use std::sync::Arc;

use crate::clients::{DocDbError, HttpRequest, ResourceType};

/// Adds authorization to an outgoing request.
///
/// `resource_link` is the raw, case-sensitive identity of the resource
/// (for example `dbs/MyDatabase/colls/MyCollection`), not the URL path.
pub trait Authorizer: Send + Sync {
    /// Authorizes `req` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be authorized; the request is
    /// then not sent.
    fn authorize(
        &self,
        req: &mut HttpRequest,
        resource_type: ResourceType,
        resource_link: &str,
    ) -> Result<(), DocDbError>;
}

impl<T: Authorizer + ?Sized> Authorizer for Arc<T> {
    fn authorize(
        &self,
        req: &mut HttpRequest,
        resource_type: ResourceType,
        resource_link: &str,
    ) -> Result<(), DocDbError> {
        (**self).authorize(req, resource_type, resource_link)
    }
}
