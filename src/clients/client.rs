//! The document database client.
//!
//! [`Client`] turns logical [`ClientRequest`]s into signed [`HttpRequest`]s,
//! sends them through a [`Transport`] and classifies the responses. The
//! resource wrappers in [`crate::rest`] are thin layers over its four
//! operations:
//!
//! | Operation | Default method | Success |
//! |-----------|----------------|---------|
//! | [`Client::create_or_replace_resource`] | POST (PUT allowed) | 200, 201 |
//! | [`Client::get_resource`] | GET | 200 |
//! | [`Client::delete_resource`] | DELETE | 204 |
//! | [`Client::list_resources`] | GET (POST queries) | 200 per page |
//!
//! Single-resource operations map 412 to [`DocDbError::PreconditionFailed`]
//! and 404 to [`DocDbError::ResourceNotFound`]. Every other status becomes
//! [`DocDbError::Response`].

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::auth::Authorizer;
use crate::clients::errors::{DocDbError, InvalidHttpRequestError};
use crate::clients::headers;
use crate::clients::http_client::{ReqwestTransport, RetryTransport, Transport};
use crate::clients::http_request::{ClientRequest, HttpMethod, HttpRequest};
use crate::clients::http_response::{HttpResponse, ResponseMetadata};
use crate::clients::paginator::Paginator;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::rest::ResourceResponse;

/// Client for one database account.
///
/// Cloning is cheap; clones share the transport and authorizer.
///
/// # Thread Safety
///
/// `Client` is `Send + Sync`. It holds no mutable state, so one instance
/// can serve any number of concurrent calls.
///
/// # Example
///
/// ```rust,no_run
/// use docdb_rest::Client;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::from_connection_string(
///     "AccountEndpoint=https://localhost:8081/;AccountKey=dGVzdGtleQ==;",
/// )?;
///
/// client
///     .list_databases(None, |page, _meta| {
///         for db in page {
///             println!("{}", db.id);
///         }
///         Ok(true)
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    authorizer: Arc<dyn Authorizer>,
}

// Verify Client is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

impl Client {
    /// Creates a client using `reqwest`, retrying throttled requests up to
    /// [`ClientConfig::max_tries`] times and signing with the configured
    /// master key.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let transport = RetryTransport::new(ReqwestTransport::new(), config.max_tries());
        Self::with_transport(config, transport)
    }

    /// Creates a client from a connection string with default settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the connection string is invalid.
    pub fn from_connection_string(connection_string: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(ClientConfig::from_connection_string(
            connection_string,
        )?))
    }

    /// Creates a client that sends every request through `transport`
    /// unchanged. Wrap it in a [`RetryTransport`] to retry throttling.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        let authorizer = Arc::new(config.master_key().clone());
        Self {
            config,
            transport: Arc::new(transport),
            authorizer,
        }
    }

    /// Replaces the master key signer with another authorizer.
    #[must_use]
    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Arc::new(authorizer);
        self
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the signed transport request for `request`.
    ///
    /// The body is buffered first so it can be re-sent. Options are applied
    /// before `x-ms-version`, which is only set when the options left it
    /// unset, and authorization runs last.
    ///
    /// # Errors
    ///
    /// Returns [`DocDbError::Body`] if the body cannot be read, or the
    /// authorizer's error.
    pub fn new_http_request(
        &self,
        method: HttpMethod,
        request: &mut ClientRequest,
    ) -> Result<HttpRequest, DocDbError> {
        let mut req = HttpRequest::new(method, self.config.endpoint().join(&request.path));
        req.body = request.replayable_body()?;
        req.timeout = request.timeout;
        req.set_header(headers::USER_AGENT, self.config.user_agent());

        if let Some(options) = &request.options {
            options.apply_options(&mut req);
        }
        req.set_header_if_absent(headers::MS_VERSION, self.config.api_version().to_string());

        self.authorizer
            .authorize(&mut req, request.resource_type, &request.resource_link)?;
        Ok(req)
    }

    pub(crate) async fn send(&self, req: HttpRequest) -> Result<HttpResponse, DocDbError> {
        tracing::debug!("Sending {} request to {}", req.method, req.url);
        self.transport.send(req).await
    }

    /// Creates a resource, or replaces it when the method is PUT.
    ///
    /// Returns the raw response body.
    ///
    /// # Errors
    ///
    /// - [`InvalidHttpRequestError::InvalidMethod`] for methods other than
    ///   PUT and POST
    /// - [`DocDbError::PreconditionFailed`] on 412
    /// - [`DocDbError::ResourceNotFound`] on 404
    /// - [`DocDbError::Response`] for any other non-success status
    pub async fn create_or_replace_resource(
        &self,
        mut request: ClientRequest,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        let method = match request.method {
            None => HttpMethod::Post,
            Some(method @ (HttpMethod::Post | HttpMethod::Put)) => method,
            Some(other) => {
                return Err(InvalidHttpRequestError::InvalidMethod {
                    method: other.to_string(),
                    operation: "create or replace",
                    allowed: "PUT or POST",
                }
                .into())
            }
        };

        let req = self.new_http_request(method, &mut request)?;
        let response = self.send(req).await?;
        match response.code {
            200 | 201 => Ok(ResourceResponse::new(response.body.clone(), response.metadata())),
            code => Err(classify(code, &response.body)),
        }
    }

    /// Reads a single resource and returns its raw body.
    ///
    /// The request is always sent as a GET.
    ///
    /// # Errors
    ///
    /// - [`DocDbError::PreconditionFailed`] on 412
    /// - [`DocDbError::ResourceNotFound`] on 404
    /// - [`DocDbError::Response`] for any other non-200 status
    pub async fn get_resource(
        &self,
        mut request: ClientRequest,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        let req = self.new_http_request(HttpMethod::Get, &mut request)?;
        let response = self.send(req).await?;
        match response.code {
            200 => Ok(ResourceResponse::new(response.body.clone(), response.metadata())),
            code => Err(classify(code, &response.body)),
        }
    }

    /// Deletes a single resource. Returns `true` when the server confirmed
    /// the delete with 204.
    ///
    /// # Errors
    ///
    /// - [`DocDbError::PreconditionFailed`] on 412
    /// - [`DocDbError::ResourceNotFound`] on 404
    /// - [`DocDbError::Response`] for any other non-204 status
    pub async fn delete_resource(
        &self,
        mut request: ClientRequest,
    ) -> Result<ResourceResponse<bool>, DocDbError> {
        let req = self.new_http_request(HttpMethod::Delete, &mut request)?;
        let response = self.send(req).await?;
        match response.code {
            204 => Ok(ResourceResponse::new(true, response.metadata())),
            code => Err(classify(code, &response.body)),
        }
    }

    /// Pages through a feed, passing the array under `key` of each page to
    /// `consumer`.
    ///
    /// The consumer returns `Ok(true)` for the next page, `Ok(false)` to
    /// stop early without error, or an error to abort. Pagination also
    /// stops after a page without a continuation token.
    ///
    /// The method defaults to GET. A POST is a query: it must carry a body,
    /// and is tagged with `content-type: application/query+json` and
    /// `x-ms-documentdb-isquery: true`.
    ///
    /// # Errors
    ///
    /// - [`InvalidHttpRequestError::InvalidMethod`] for methods other than
    ///   GET and POST
    /// - [`InvalidHttpRequestError::MissingBody`] for a POST without body
    /// - [`DocDbError::ResourceNotModified`] on 304, and the usual mapping
    ///   for any other non-200 status
    /// - [`DocDbError::KeyNotFound`] if a page lacks `key`
    /// - the consumer's own error
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use docdb_rest::Client;
    /// use docdb_rest::clients::{ClientRequest, ResourceType};
    ///
    /// # async fn run(client: Client) -> Result<(), docdb_rest::DocDbError> {
    /// let request = ClientRequest::builder("dbs/db1/colls/col1/docs")
    ///     .resource(ResourceType::Documents, "dbs/db1/colls/col1")
    ///     .build();
    ///
    /// let mut count = 0;
    /// client
    ///     .list_resources("Documents", request, |items, _meta| {
    ///         count += items.len();
    ///         Ok(count < 1000)
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_resources<F>(
        &self,
        key: &str,
        request: ClientRequest,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        Paginator::new(self, key, request, consumer)?.run().await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Maps a failed single-resource status. 304 is only distinguished when
/// paging.
fn classify(code: u16, body: &[u8]) -> DocDbError {
    match code {
        404 | 412 => DocDbError::from_status(code, body),
        _ => DocDbError::unexpected_status(code, body),
    }
}
