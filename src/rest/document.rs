//! Documents.
//!
//! Documents are user-defined JSON, so the typed operations are generic
//! over any `serde` type. Every write takes its payload as
//! [`JsonContent`]: a document to serialize, or pre-serialized bytes.
//!
//! # Example
//!
//! ```rust,no_run
//! use docdb_rest::clients::Query;
//! use docdb_rest::rest::{CreateDocumentRequest, ReplaceDocumentRequest};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Order {
//!     id: String,
//!     tenant: String,
//!     total: u64,
//! }
//!
//! # async fn run(client: docdb_rest::Client) -> Result<(), docdb_rest::DocDbError> {
//! let orders = client.database("shop").collection("orders");
//!
//! let order = Order { id: "o1".into(), tenant: "t1".into(), total: 10 };
//! let created = orders
//!     .create_document(CreateDocumentRequest::new(&order).partition_key("t1"))
//!     .await?;
//!
//! // Optimistic concurrency: only replace what we read.
//! let doc = orders.document("o1").with_partition_key("t1");
//! let current = doc.get::<Order>(None).await?;
//! let updated = Order { total: current.total + 5, ..current.into_inner() };
//! doc.replace(
//!     ReplaceDocumentRequest::new(&updated).etag(created.etag().unwrap_or_default()),
//! )
//! .await?;
//!
//! let query = Query::new("SELECT * FROM o WHERE o.total > @min")
//!     .with_parameter("@min", 5)
//!     .enable_cross_partition(true);
//! orders
//!     .query_documents(Some(query), |page: Vec<Order>, _meta| {
//!         println!("{} orders", page.len());
//!         Ok(true)
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::clients::{
    headers, partition_key_header, Client, ClientRequest, ClientRequestBuilder, DocDbError,
    HttpMethod, HttpRequest, InvalidHttpRequestError, OptionsFn, OptionsList, Query,
    RequestOptions, ResourceType, ResponseMetadata, SharedOptions,
};
use crate::rest::collection::CollectionClient;
use crate::rest::resource::{typed, JsonContent};
use crate::rest::{ResourcePath, ResourceResponse};

/// Key of the documents array in list and query responses.
pub const DOCUMENTS_KEY: &str = "Documents";

/// Whether a written document is indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexingDirective {
    Include,
    Exclude,
}

impl IndexingDirective {
    /// Returns the header value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "Include",
            Self::Exclude => "Exclude",
        }
    }
}

/// Headers for document writes.
#[derive(Clone, Default)]
struct DocumentWriteOptions {
    upsert: bool,
    partition_key: Option<String>,
    indexing_directive: Option<IndexingDirective>,
    if_match: Option<String>,
    options: Option<SharedOptions>,
}

impl RequestOptions for DocumentWriteOptions {
    fn apply_options(&self, req: &mut HttpRequest) {
        if self.upsert {
            req.set_header(headers::IS_UPSERT, "true");
        }
        if let Some(key) = &self.partition_key {
            req.set_header(headers::PARTITION_KEY, key.as_str());
        }
        if let Some(etag) = &self.if_match {
            req.set_header(headers::IF_MATCH, etag.as_str());
        }
        if let Some(directive) = self.indexing_directive {
            req.set_header(headers::INDEXING_DIRECTIVE, directive.as_str());
        }
        if let Some(options) = &self.options {
            options.apply_options(req);
        }
    }
}

/// Parameters for [`CollectionClient::create_document`].
pub struct CreateDocumentRequest<'a, T: ?Sized = Value> {
    /// The document to create.
    pub content: JsonContent<'a, T>,
    /// Partition key value, for partitioned collections.
    pub partition_key: Option<Value>,
    /// Replace the document if it already exists.
    pub upsert: bool,
    pub indexing_directive: Option<IndexingDirective>,
    /// Further options applied after the document headers.
    pub options: Option<SharedOptions>,
}

impl<'a, T: Serialize + ?Sized> CreateDocumentRequest<'a, T> {
    /// Creates `document`.
    #[must_use]
    pub const fn new(document: &'a T) -> Self {
        Self {
            content: JsonContent::document(document),
            partition_key: None,
            upsert: false,
            indexing_directive: None,
            options: None,
        }
    }

    /// Sets the partition key value.
    #[must_use]
    pub fn partition_key(mut self, key: impl Into<Value>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    /// Replaces an existing document with the same id instead of failing.
    #[must_use]
    pub const fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    /// Sets the indexing directive.
    #[must_use]
    pub const fn indexing_directive(mut self, directive: IndexingDirective) -> Self {
        self.indexing_directive = Some(directive);
        self
    }

    /// Sets further options.
    #[must_use]
    pub fn options(mut self, options: SharedOptions) -> Self {
        self.options = Some(options);
        self
    }

    fn write_options(&self) -> Result<DocumentWriteOptions, DocDbError> {
        Ok(DocumentWriteOptions {
            upsert: self.upsert,
            partition_key: self
                .partition_key
                .as_ref()
                .map(partition_key_header)
                .transpose()?,
            indexing_directive: self.indexing_directive,
            if_match: None,
            options: self.options.clone(),
        })
    }
}

impl CreateDocumentRequest<'static, Value> {
    /// Creates a document from pre-serialized JSON.
    #[must_use]
    pub fn raw(body: impl Into<Bytes>) -> Self {
        Self {
            content: JsonContent::raw(body),
            partition_key: None,
            upsert: false,
            indexing_directive: None,
            options: None,
        }
    }
}

impl<T: ?Sized> fmt::Debug for CreateDocumentRequest<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateDocumentRequest")
            .field("partition_key", &self.partition_key)
            .field("upsert", &self.upsert)
            .field("indexing_directive", &self.indexing_directive)
            .finish_non_exhaustive()
    }
}

/// Parameters for [`DocumentClient::replace`].
pub struct ReplaceDocumentRequest<'a, T: ?Sized = Value> {
    /// The replacement document.
    pub content: JsonContent<'a, T>,
    /// When set, the replace only succeeds if the stored document still has
    /// this `ETag`; otherwise it fails with
    /// [`DocDbError::PreconditionFailed`].
    pub etag: Option<String>,
    pub indexing_directive: Option<IndexingDirective>,
    /// Further options applied after the document headers.
    pub options: Option<SharedOptions>,
}

impl<'a, T: Serialize + ?Sized> ReplaceDocumentRequest<'a, T> {
    /// Replaces the document with `document`.
    #[must_use]
    pub const fn new(document: &'a T) -> Self {
        Self {
            content: JsonContent::document(document),
            etag: None,
            indexing_directive: None,
            options: None,
        }
    }

    /// Only replace if the stored document has this `ETag`.
    #[must_use]
    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into()).filter(|etag: &String| !etag.is_empty());
        self
    }

    /// Sets the indexing directive.
    #[must_use]
    pub const fn indexing_directive(mut self, directive: IndexingDirective) -> Self {
        self.indexing_directive = Some(directive);
        self
    }

    /// Sets further options.
    #[must_use]
    pub fn options(mut self, options: SharedOptions) -> Self {
        self.options = Some(options);
        self
    }

    fn write_options(&self) -> DocumentWriteOptions {
        DocumentWriteOptions {
            if_match: self.etag.clone(),
            indexing_directive: self.indexing_directive,
            options: self.options.clone(),
            ..DocumentWriteOptions::default()
        }
    }
}

impl ReplaceDocumentRequest<'static, Value> {
    /// Replaces the document with pre-serialized JSON.
    #[must_use]
    pub fn raw(body: impl Into<Bytes>) -> Self {
        Self {
            content: JsonContent::raw(body),
            etag: None,
            indexing_directive: None,
            options: None,
        }
    }
}

impl<T: ?Sized> fmt::Debug for ReplaceDocumentRequest<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplaceDocumentRequest")
            .field("etag", &self.etag)
            .field("indexing_directive", &self.indexing_directive)
            .finish_non_exhaustive()
    }
}

impl<'a> CollectionClient<'a> {
    fn documents_request(&self) -> ClientRequestBuilder {
        ClientRequest::builder(self.path.feed(ResourceType::Documents))
            .resource(ResourceType::Documents, self.path.link())
    }

    /// Creates a document and returns the raw response body.
    ///
    /// # Errors
    ///
    /// [`InvalidHttpRequestError::MissingContent`] or
    /// [`InvalidHttpRequestError::AmbiguousContent`] if the content is not
    /// exactly one of a document or a body; otherwise see
    /// [`Client::create_or_replace_resource`].
    pub async fn create_document<T: Serialize + ?Sized>(
        &self,
        request: CreateDocumentRequest<'_, T>,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        let body = request.content.json()?;
        let request = self
            .documents_request()
            .options(request.write_options()?)
            .body(body)
            .build();
        self.client.create_or_replace_resource(request).await
    }

    /// Pages through the documents of this collection as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_documents_raw<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        let request = self.documents_request().shared_options(options).build();
        self.client
            .list_resources(DOCUMENTS_KEY, request, consumer)
            .await
    }

    /// Pages through the documents of this collection, decoding each as `T`.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_documents<T, F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        self.list_documents_raw(options, typed(consumer)).await
    }

    /// Runs `query` against this collection, passing raw JSON pages to
    /// `consumer`.
    ///
    /// # Errors
    ///
    /// [`InvalidHttpRequestError::MissingQuery`] when `query` is `None`;
    /// otherwise see [`Client::list_resources`].
    pub async fn query_documents_raw<F>(
        &self,
        query: Option<Query>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        let query = query.ok_or(InvalidHttpRequestError::MissingQuery)?;
        let body = serde_json::to_vec(&query)?;
        let request = self
            .documents_request()
            .method(HttpMethod::Post)
            .options(query)
            .body(body)
            .build();
        self.client
            .list_resources(DOCUMENTS_KEY, request, consumer)
            .await
    }

    /// Runs `query` against this collection, decoding each result as `T`.
    ///
    /// # Errors
    ///
    /// See [`CollectionClient::query_documents_raw`].
    pub async fn query_documents<T, F>(
        &self,
        query: Option<Query>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        self.query_documents_raw(query, typed(consumer)).await
    }

    /// Returns a client scoped to one document of this collection.
    #[must_use]
    pub fn document(&self, id: impl Into<String>) -> DocumentClient<'a> {
        DocumentClient {
            client: self.client,
            path: self.path.child(ResourceType::Documents, id),
            partition_key: None,
        }
    }
}

/// Operations on a single document.
#[derive(Clone, Debug)]
pub struct DocumentClient<'a> {
    client: &'a Client,
    path: ResourcePath,
    partition_key: Option<Value>,
}

impl DocumentClient<'_> {
    /// Sets the partition key sent with every request for this document.
    #[must_use]
    pub fn with_partition_key(mut self, key: impl Into<Value>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    /// Returns the document id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.path.id().unwrap_or_default()
    }

    /// Returns the resource path of the document.
    #[must_use]
    pub const fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Chains the partition key header after `options`.
    fn with_key(&self, options: Option<SharedOptions>) -> Result<Option<SharedOptions>, DocDbError> {
        let Some(key) = &self.partition_key else {
            return Ok(options);
        };
        let key = partition_key_header(key)?;
        let mut chain = OptionsList::new();
        chain.push(options);
        let chain = chain.with(OptionsFn::new(move |req: &mut HttpRequest| {
            req.set_header(headers::PARTITION_KEY, key.as_str());
        }));
        Ok(Some(Arc::new(chain)))
    }

    fn request(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ClientRequestBuilder, DocDbError> {
        Ok(ClientRequest::builder(self.path.path())
            .resource(ResourceType::Documents, self.path.link())
            .shared_options(self.with_key(options)?))
    }

    /// Reads the document as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::get_resource`].
    pub async fn get_raw(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        self.client
            .get_resource(self.request(options)?.build())
            .await
    }

    /// Reads the document and decodes it as `T`.
    ///
    /// # Errors
    ///
    /// See [`Client::get_resource`]; also fails if the body is not a `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<T>, DocDbError> {
        self.get_raw(options).await?.json()
    }

    /// Replaces the document and returns the raw response body.
    ///
    /// # Errors
    ///
    /// [`DocDbError::PreconditionFailed`] if an `etag` was given and no
    /// longer matches; otherwise see [`Client::create_or_replace_resource`].
    pub async fn replace<T: Serialize + ?Sized>(
        &self,
        request: ReplaceDocumentRequest<'_, T>,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        let body = request.content.json()?;
        let options: SharedOptions = Arc::new(request.write_options());
        let request = self
            .request(Some(options))?
            .method(HttpMethod::Put)
            .body(body)
            .build();
        self.client.create_or_replace_resource(request).await
    }

    /// Deletes the document.
    ///
    /// # Errors
    ///
    /// See [`Client::delete_resource`].
    pub async fn delete(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<bool>, DocDbError> {
        self.client
            .delete_resource(self.request(options)?.build())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(options: &impl RequestOptions, method: HttpMethod) -> HttpRequest {
        let mut req = HttpRequest::new(method, "https://localhost/dbs/d/colls/c/docs");
        options.apply_options(&mut req);
        req
    }

    #[test]
    fn test_create_request_headers() {
        let doc = json!({"id": "a"});
        let request = CreateDocumentRequest::new(&doc)
            .partition_key("tenant-1")
            .upsert(true)
            .indexing_directive(IndexingDirective::Exclude);

        let req = apply(&request.write_options().unwrap(), HttpMethod::Post);
        assert_eq!(req.header("x-ms-documentdb-is-upsert"), Some("true"));
        assert_eq!(
            req.header("x-ms-documentdb-partitionkey"),
            Some(r#"["tenant-1"]"#)
        );
        assert_eq!(req.header("x-ms-indexing-directive"), Some("Exclude"));
        assert!(req.header("if-match").is_none());
    }

    #[test]
    fn test_create_request_defaults_set_nothing() {
        let doc = json!({"id": "a"});
        let req = apply(
            &CreateDocumentRequest::new(&doc).write_options().unwrap(),
            HttpMethod::Post,
        );
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_replace_request_sets_if_match() {
        let doc = json!({"id": "a"});
        let request = ReplaceDocumentRequest::new(&doc).etag("\"e1\"");
        let req = apply(&request.write_options(), HttpMethod::Put);
        assert_eq!(req.header("if-match"), Some("\"e1\""));
    }

    #[test]
    fn test_replace_request_ignores_empty_etag() {
        let doc = json!({"id": "a"});
        let request = ReplaceDocumentRequest::new(&doc).etag("");
        assert!(request.etag.is_none());
    }

    #[test]
    fn test_raw_content() {
        let request = CreateDocumentRequest::raw(&br#"{"id":"raw"}"#[..]);
        assert_eq!(&request.content.json().unwrap()[..], br#"{"id":"raw"}"#);
    }
}
