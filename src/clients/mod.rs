//! The request core: building, signing, sending and paginating requests.
//!
//! # Overview
//!
//! - [`Client`]: builds and dispatches requests, classifies responses
//! - [`ClientRequest`]: the description of one logical API call
//! - [`HttpRequest`] / [`HttpResponse`]: the wire-level request and response
//! - [`RequestOptions`]: composable steps that add headers to a request
//! - [`Transport`]: the HTTP round trip, implemented by [`ReqwestTransport`]
//!   and wrapped by [`RetryTransport`] for throttling
//! - [`Query`]: a parameterized SQL query
//!
//! # Retry Behavior
//!
//! Throttled requests (429) are retried by [`RetryTransport`] when
//! [`ClientConfig::max_tries`](crate::ClientConfig::max_tries) is above 1,
//! waiting `x-ms-retry-after-ms`, else `Retry-After`, else
//! [`RETRY_WAIT_TIME`] seconds. Nothing else is retried.
//!
//! # Example
//!
//! ```rust,no_run
//! use docdb_rest::clients::{ClientRequest, HttpMethod, ResourceType};
//! use docdb_rest::Client;
//!
//! # async fn run() -> Result<(), docdb_rest::DocDbError> {
//! let client = Client::from_connection_string(
//!     "AccountEndpoint=https://myaccount.documents.azure.com:443/;AccountKey=dGVzdGtleQ==;",
//! )?;
//!
//! // The resource link identifies the resource for signing; the path is
//! // where the request is sent.
//! let request = ClientRequest::builder("dbs/db1/colls/col1")
//!     .resource(ResourceType::Collections, "dbs/db1/colls/col1")
//!     .method(HttpMethod::Get)
//!     .build();
//! let collection = client.get_resource(request).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod errors;
pub mod headers;
mod http_client;
mod http_request;
mod http_response;
mod options;
mod paginator;
mod query;

pub use client::Client;
pub use errors::{DocDbError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{
    ReqwestTransport, RetryTransport, Transport, RETRY_WAIT_TIME, TOO_MANY_REQUESTS,
};
pub use http_request::{
    BodySource, ClientRequest, ClientRequestBuilder, HttpMethod, HttpRequest, RequestBody,
    ResourceType,
};
pub use http_response::{HttpResponse, ResponseMetadata};
pub use options::{
    partition_key_header, CommonRequestOptions, ConsistencyLevel, OptionsFn, OptionsList,
    RequestOptions, SharedOptions,
};
pub use paginator::parse_array_from_response;
pub use query::{Query, QueryParameter};
