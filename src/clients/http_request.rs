//! Request types for the document database client.
//!
//! Two request types live here:
//!
//! - [`ClientRequest`]: the logical description of one API call (path,
//!   resource identity, options and body), built by the resource wrappers
//! - [`HttpRequest`]: the concrete, authorized request handed to a
//!   [`Transport`](super::Transport)

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::clients::errors::InvalidHttpRequestError;
use crate::clients::options::RequestOptions;

/// HTTP methods used by the REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for reading resources and feeds.
    Get,
    /// HTTP POST method for creating resources and running queries.
    Post,
    /// HTTP PUT method for replacing resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
    /// HTTP PATCH method.
    Patch,
    /// HTTP HEAD method.
    Head,
}

impl HttpMethod {
    /// Returns the upper-case wire form of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = InvalidHttpRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            _ => Err(InvalidHttpRequestError::UnknownMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// The type of resource a request is directed at.
///
/// Used when signing; the wire name is the lower-case short form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// `dbs`
    Databases,
    /// `colls`
    Collections,
    /// `docs`
    Documents,
    /// `attachments`
    Attachments,
    /// `sprocs`
    StoredProcedures,
    /// `udfs`
    UserDefinedFunctions,
    /// `triggers`
    Triggers,
    /// `users`
    Users,
    /// `permissions`
    Permissions,
    /// `offers`
    Offers,
}

impl ResourceType {
    /// Returns the short name used in resource links and signatures.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Databases => "dbs",
            Self::Collections => "colls",
            Self::Documents => "docs",
            Self::Attachments => "attachments",
            Self::StoredProcedures => "sprocs",
            Self::UserDefinedFunctions => "udfs",
            Self::Triggers => "triggers",
            Self::Users => "users",
            Self::Permissions => "permissions",
            Self::Offers => "offers",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Re-opens a body from its source. Called at most once per request.
pub type BodySource = Arc<dyn Fn() -> io::Result<Bytes> + Send + Sync>;

/// The body of a [`ClientRequest`].
///
/// Whatever form the body is supplied in, it is buffered into
/// [`RequestBody::Bytes`] the first time it is needed, after which it can be
/// read any number of times.
pub enum RequestBody {
    /// An in-memory body.
    Bytes(Bytes),
    /// A single-use reader.
    Reader(Box<dyn Read + Send>),
    /// A function producing the body on demand.
    Source(BodySource),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
            Self::Source(_) => f.write_str("Source(..)"),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static str> for RequestBody {
    fn from(s: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        Self::Bytes(Bytes::from(s))
    }
}

/// A logical API call, before it is turned into an [`HttpRequest`].
///
/// `method` is left unset by most callers so each operation can apply its
/// own default (POST for create, GET for list, ...).
///
/// # Example
///
/// ```rust
/// use docdb_rest::clients::{ClientRequest, HttpMethod, ResourceType};
///
/// let request = ClientRequest::builder("dbs/db1/colls/col1/docs")
///     .resource(ResourceType::Documents, "dbs/db1/colls/col1")
///     .method(HttpMethod::Post)
///     .body(r#"{"id":"doc1"}"#)
///     .build();
///
/// assert_eq!(request.resource_link, "dbs/db1/colls/col1");
/// ```
pub struct ClientRequest {
    /// HTTP method, or `None` for the operation's default.
    pub method: Option<HttpMethod>,
    /// URL path relative to the endpoint, already percent-escaped.
    pub path: String,
    /// The type of resource, used for signing.
    pub resource_type: ResourceType,
    /// The raw, case-sensitive identity of the resource, used for signing.
    pub resource_link: String,
    /// Options applied to the outgoing request.
    pub options: Option<Arc<dyn RequestOptions>>,
    /// The request body.
    pub body: Option<RequestBody>,
    /// Deadline for each transport request issued for this call.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("resource_type", &self.resource_type)
            .field("resource_link", &self.resource_link)
            .field("options", &self.options.is_some())
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientRequest {
    /// Creates a new builder for the given URL path.
    #[must_use]
    pub fn builder(path: impl Into<String>) -> ClientRequestBuilder {
        ClientRequestBuilder::new(path)
    }

    /// Buffers the body so it can be read repeatedly and returns a cheap
    /// handle to it.
    ///
    /// A reader is drained once; a source is invoked once. Subsequent calls
    /// return the buffered bytes without touching the reader or source again.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while reading the body.
    pub fn replayable_body(&mut self) -> io::Result<Option<Bytes>> {
        let buffered = match self.body.take() {
            None => return Ok(None),
            Some(RequestBody::Bytes(bytes)) => bytes,
            Some(RequestBody::Reader(mut reader)) => {
                let mut data = Vec::new();
                reader.read_to_end(&mut data)?;
                Bytes::from(data)
            }
            Some(RequestBody::Source(source)) => source()?,
        };
        self.body = Some(RequestBody::Bytes(buffered.clone()));
        Ok(Some(buffered))
    }
}

/// Builder for [`ClientRequest`].
#[derive(Debug)]
pub struct ClientRequestBuilder {
    request: ClientRequest,
}

impl ClientRequestBuilder {
    fn new(path: impl Into<String>) -> Self {
        Self {
            request: ClientRequest {
                method: None,
                path: path.into(),
                resource_type: ResourceType::Databases,
                resource_link: String::new(),
                options: None,
                body: None,
                timeout: None,
            },
        }
    }

    /// Sets the resource type and raw resource link used for signing.
    #[must_use]
    pub fn resource(mut self, resource_type: ResourceType, link: impl Into<String>) -> Self {
        self.request.resource_type = resource_type;
        self.request.resource_link = link.into();
        self
    }

    /// Overrides the operation's default method.
    #[must_use]
    pub const fn method(mut self, method: HttpMethod) -> Self {
        self.request.method = Some(method);
        self
    }

    /// Sets the request options.
    #[must_use]
    pub fn options(mut self, options: impl RequestOptions + 'static) -> Self {
        self.request.options = Some(Arc::new(options));
        self
    }

    /// Sets already-shared request options, or clears them with `None`.
    #[must_use]
    pub fn shared_options(mut self, options: Option<Arc<dyn RequestOptions>>) -> Self {
        self.request.options = options;
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// Sets a single-use reader as the body.
    #[must_use]
    pub fn body_reader(mut self, reader: impl Read + Send + 'static) -> Self {
        self.request.body = Some(RequestBody::Reader(Box::new(reader)));
        self
    }

    /// Sets a function that produces the body on demand.
    #[must_use]
    pub fn body_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> io::Result<Bytes> + Send + Sync + 'static,
    {
        self.request.body = Some(RequestBody::Source(Arc::new(source)));
        self
    }

    /// Sets the per-request deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = Some(timeout);
        self
    }

    /// Builds the [`ClientRequest`].
    #[must_use]
    pub fn build(self) -> ClientRequest {
        self.request
    }
}

/// A fully built request, ready for a [`Transport`](super::Transport).
///
/// Header names are stored lower-cased; setting a header replaces any
/// previous value for that name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The absolute URL.
    pub url: String,
    /// Request headers keyed by lower-case name.
    pub headers: HashMap<String, String>,
    /// The buffered body, if any.
    pub body: Option<Bytes>,
    /// Deadline for the transport call.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Sets a header, replacing any existing value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Sets a header only if it has no value yet.
    pub fn set_header_if_absent(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    /// Returns the value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Removes a header, returning its value.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_ascii_lowercase())
    }

    /// Returns a handle to the body. Every call yields the same bytes.
    #[must_use]
    pub fn get_body(&self) -> Option<Bytes> {
        self.body.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_http_method_display_and_parse() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert!(matches!(
            "FETCH".parse::<HttpMethod>(),
            Err(InvalidHttpRequestError::UnknownMethod { method }) if method == "FETCH"
        ));
    }

    #[test]
    fn test_resource_type_names() {
        assert_eq!(ResourceType::Databases.as_str(), "dbs");
        assert_eq!(ResourceType::Collections.as_str(), "colls");
        assert_eq!(ResourceType::Documents.as_str(), "docs");
        assert_eq!(ResourceType::StoredProcedures.as_str(), "sprocs");
        assert_eq!(ResourceType::UserDefinedFunctions.as_str(), "udfs");
        assert_eq!(ResourceType::Offers.to_string(), "offers");
    }

    #[test]
    fn test_builder_defaults() {
        let request = ClientRequest::builder("dbs").build();

        assert!(request.method.is_none());
        assert_eq!(request.path, "dbs");
        assert_eq!(request.resource_type, ResourceType::Databases);
        assert!(request.resource_link.is_empty());
        assert!(request.options.is_none());
        assert!(request.body.is_none());
        assert!(request.timeout.is_none());
    }

    #[test]
    fn test_replayable_body_without_body() {
        let mut request = ClientRequest::builder("dbs").build();
        assert!(request.replayable_body().unwrap().is_none());
    }

    #[test]
    fn test_replayable_body_buffers_reader_once() {
        let mut request = ClientRequest::builder("dbs")
            .body_reader(io::Cursor::new(b"{\"id\":\"db1\"}".to_vec()))
            .build();

        let first = request.replayable_body().unwrap().unwrap();
        let second = request.replayable_body().unwrap().unwrap();
        let third = request.replayable_body().unwrap().unwrap();

        assert_eq!(&first[..], b"{\"id\":\"db1\"}");
        assert_eq!(first, second);
        assert_eq!(second, third);
        assert!(matches!(request.body, Some(RequestBody::Bytes(_))));
    }

    #[test]
    fn test_replayable_body_invokes_source_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut request = ClientRequest::builder("dbs")
            .body_source(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Bytes::from_static(b"payload"))
            })
            .build();

        for _ in 0..3 {
            let body = request.replayable_body().unwrap().unwrap();
            assert_eq!(&body[..], b"payload");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_replayable_body_propagates_source_error() {
        let mut request = ClientRequest::builder("dbs")
            .body_source(|| Err(io::Error::new(io::ErrorKind::Other, "gone")))
            .build();

        assert!(request.replayable_body().is_err());
    }

    #[test]
    fn test_http_request_headers_are_case_insensitive() {
        let mut request = HttpRequest::new(HttpMethod::Get, "https://localhost/dbs");
        request.set_header("X-MS-Version", "2017-02-22");

        assert_eq!(request.header("x-ms-version"), Some("2017-02-22"));
        assert!(request.headers.contains_key("x-ms-version"));

        request.set_header("x-ms-version", "2018-12-31");
        assert_eq!(request.header("X-MS-VERSION"), Some("2018-12-31"));
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn test_set_header_if_absent_keeps_existing() {
        let mut request = HttpRequest::new(HttpMethod::Get, "https://localhost/dbs");
        request.set_header("x-ms-version", "2018-12-31");
        request.set_header_if_absent("x-ms-version", "2017-02-22");
        request.set_header_if_absent("user-agent", "test");

        assert_eq!(request.header("x-ms-version"), Some("2018-12-31"));
        assert_eq!(request.header("user-agent"), Some("test"));
    }

    #[test]
    fn test_get_body_is_repeatable() {
        let mut request = HttpRequest::new(HttpMethod::Post, "https://localhost/dbs");
        request.body = Some(Bytes::from_static(b"abc"));

        for _ in 0..5 {
            assert_eq!(request.get_body().as_deref(), Some(&b"abc"[..]));
        }
    }
}
