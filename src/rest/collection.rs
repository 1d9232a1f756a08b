//! Collections and their indexing configuration.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::{
    headers, Client, ClientRequest, DocDbError, HttpRequest, RequestOptions, ResourceType,
    ResponseMetadata, SharedOptions,
};
use crate::rest::database::DatabaseClient;
use crate::rest::offer::OfferType;
use crate::rest::resource::{typed, Resource, SystemProperties};
use crate::rest::{ResourcePath, ResourceResponse};

/// A collection of documents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionResource {
    /// The unique, user-chosen name of the collection.
    pub id: String,
    /// Server-generated properties.
    #[serde(flatten)]
    pub system: SystemProperties,
    /// Addressable path of the documents feed.
    #[serde(rename = "_docs", default, skip_serializing_if = "String::is_empty")]
    pub documents: String,
    /// Addressable path of the stored procedures feed.
    #[serde(rename = "_sprocs", default, skip_serializing_if = "String::is_empty")]
    pub stored_procedures: String,
    /// Addressable path of the triggers feed.
    #[serde(rename = "_triggers", default, skip_serializing_if = "String::is_empty")]
    pub triggers: String,
    /// Addressable path of the user-defined functions feed.
    #[serde(rename = "_udfs", default, skip_serializing_if = "String::is_empty")]
    pub udfs: String,
    /// Addressable path of the conflicts feed.
    #[serde(rename = "_conflicts", default, skip_serializing_if = "String::is_empty")]
    pub conflicts: String,
    /// Indexing settings.
    #[serde(rename = "indexingPolicy", default, skip_serializing_if = "Option::is_none")]
    pub indexing_policy: Option<IndexingPolicy>,
    /// Partitioning settings.
    #[serde(rename = "partitionKey", default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<PartitionKeyDefinition>,
}

impl Resource for CollectionResource {
    const KEY: &'static str = "DocumentCollections";
    const TYPE: ResourceType = ResourceType::Collections;
}

/// How the index is kept up to date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexingMode {
    /// Updated synchronously with every write.
    Consistent,
    /// Updated asynchronously.
    Lazy,
    /// No index.
    None,
}

/// The type of data an included path indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    String,
    Number,
    Point,
    Polygon,
    LineString,
}

/// The kind of index, or the partitioning algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    /// Equality comparisons. The only partitioning algorithm.
    Hash,
    /// Range comparisons and sorting.
    Range,
    /// Geospatial queries.
    Spatial,
}

/// An index on an included path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    #[serde(rename = "dataType")]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    pub kind: IndexKind,
}

/// A JSON path to index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedPath {
    pub path: String,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

/// A JSON path excluded from indexing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedPath {
    pub path: String,
}

/// The indexing policy of a collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingPolicy {
    /// Whether documents are indexed automatically. Defaults to `true` on
    /// the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatic: Option<bool>,
    #[serde(rename = "indexingMode", default, skip_serializing_if = "Option::is_none")]
    pub indexing_mode: Option<IndexingMode>,
    #[serde(rename = "includedPaths", default, skip_serializing_if = "Vec::is_empty")]
    pub included_paths: Vec<IncludedPath>,
    #[serde(rename = "excludedPaths", default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_paths: Vec<ExcludedPath>,
}

/// The partition key of a collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyDefinition {
    /// Document paths making up the key, e.g. `/tenantId`.
    pub paths: Vec<String>,
    /// Only [`IndexKind::Hash`] is supported.
    pub kind: IndexKind,
}

/// Parameters for [`DatabaseClient::create_collection`].
///
/// `offer_throughput` takes precedence over `offer_type`. Both travel as
/// headers; only `id`, `indexing_policy` and `partition_key` are sent in
/// the body.
#[derive(Clone, Default, Serialize)]
pub struct CreateCollectionRequest {
    pub id: String,
    #[serde(rename = "indexingPolicy", skip_serializing_if = "Option::is_none")]
    pub indexing_policy: Option<IndexingPolicy>,
    #[serde(rename = "partitionKey", skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<PartitionKeyDefinition>,
    /// Provisioned request units per second.
    #[serde(skip)]
    pub offer_throughput: Option<u32>,
    /// Pre-defined performance level.
    #[serde(skip)]
    pub offer_type: Option<OfferType>,
    /// Further options applied after the offer headers.
    #[serde(skip)]
    pub options: Option<SharedOptions>,
}

impl CreateCollectionRequest {
    /// Creates a request for a collection with default settings.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for CreateCollectionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateCollectionRequest")
            .field("id", &self.id)
            .field("indexing_policy", &self.indexing_policy)
            .field("partition_key", &self.partition_key)
            .field("offer_throughput", &self.offer_throughput)
            .field("offer_type", &self.offer_type)
            .finish_non_exhaustive()
    }
}

impl RequestOptions for CreateCollectionRequest {
    fn apply_options(&self, req: &mut HttpRequest) {
        if let Some(throughput) = self.offer_throughput.filter(|t| *t != 0) {
            req.set_header(headers::OFFER_THROUGHPUT, throughput.to_string());
        } else if let Some(offer_type) = self.offer_type {
            req.set_header(headers::OFFER_TYPE, offer_type.as_str());
        }
        if let Some(options) = &self.options {
            options.apply_options(req);
        }
    }
}

impl<'a> DatabaseClient<'a> {
    /// Creates a collection in this database and returns the raw response.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`].
    pub async fn create_collection_raw(
        &self,
        request: CreateCollectionRequest,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        let body = serde_json::to_vec(&request)?;
        let request = ClientRequest::builder(self.path.feed(ResourceType::Collections))
            .resource(ResourceType::Collections, self.path.link())
            .options(request)
            .body(body)
            .build();
        self.client.create_or_replace_resource(request).await
    }

    /// Creates a collection in this database.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`].
    pub async fn create_collection(
        &self,
        request: CreateCollectionRequest,
    ) -> Result<ResourceResponse<CollectionResource>, DocDbError> {
        self.create_collection_raw(request).await?.json()
    }

    /// Pages through the collections of this database as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_collections_raw<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        let request = ClientRequest::builder(self.path.feed(ResourceType::Collections))
            .resource(ResourceType::Collections, self.path.link())
            .shared_options(options)
            .build();
        self.client
            .list_resources(CollectionResource::KEY, request, consumer)
            .await
    }

    /// Pages through the collections of this database.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_collections<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<CollectionResource>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        self.list_collections_raw(options, typed(consumer)).await
    }

    /// Returns a client scoped to one collection of this database.
    #[must_use]
    pub fn collection(&self, id: impl Into<String>) -> CollectionClient<'a> {
        CollectionClient {
            client: self.client,
            path: self.path.child(ResourceType::Collections, id),
        }
    }
}

/// Operations on a single collection.
///
/// Documents, stored procedures and user-defined functions are reached
/// through the collection that holds them.
#[derive(Clone, Debug)]
pub struct CollectionClient<'a> {
    pub(crate) client: &'a Client,
    pub(crate) path: ResourcePath,
}

impl<'a> CollectionClient<'a> {
    /// Returns the collection id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.path.id().unwrap_or_default()
    }

    /// Returns the resource path of the collection.
    #[must_use]
    pub const fn path(&self) -> &ResourcePath {
        &self.path
    }

    fn request(&self, options: Option<SharedOptions>) -> ClientRequest {
        ClientRequest::builder(self.path.path())
            .resource(ResourceType::Collections, self.path.link())
            .shared_options(options)
            .build()
    }

    /// Reads the collection as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::get_resource`].
    pub async fn get_raw(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        self.client.get_resource(self.request(options)).await
    }

    /// Reads the collection.
    ///
    /// # Errors
    ///
    /// See [`Client::get_resource`].
    pub async fn get(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<CollectionResource>, DocDbError> {
        self.get_raw(options).await?.json()
    }

    /// Deletes the collection.
    ///
    /// # Errors
    ///
    /// See [`Client::delete_resource`].
    pub async fn delete(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<bool>, DocDbError> {
        self.client.delete_resource(self.request(options)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;
    use serde_json::json;

    #[test]
    fn test_create_request_body_excludes_headers() {
        let request = CreateCollectionRequest {
            partition_key: Some(PartitionKeyDefinition {
                paths: vec!["/tenant".to_string()],
                kind: IndexKind::Hash,
            }),
            offer_throughput: Some(400),
            ..CreateCollectionRequest::new("orders")
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "id": "orders",
                "partitionKey": {"paths": ["/tenant"], "kind": "Hash"},
            })
        );
    }

    #[test]
    fn test_offer_throughput_wins_over_offer_type() {
        let request = CreateCollectionRequest {
            offer_throughput: Some(1000),
            offer_type: Some(OfferType::S2),
            ..CreateCollectionRequest::new("c")
        };
        let mut req = HttpRequest::new(HttpMethod::Post, "https://localhost/dbs/db1/colls");
        request.apply_options(&mut req);

        assert_eq!(req.header("x-ms-offer-throughput"), Some("1000"));
        assert!(req.header("x-ms-offer-type").is_none());
    }

    #[test]
    fn test_offer_type_used_without_throughput() {
        let request = CreateCollectionRequest {
            offer_type: Some(OfferType::S1),
            ..CreateCollectionRequest::new("c")
        };
        let mut req = HttpRequest::new(HttpMethod::Post, "https://localhost/dbs/db1/colls");
        request.apply_options(&mut req);

        assert_eq!(req.header("x-ms-offer-type"), Some("S1"));
        assert!(req.header("x-ms-offer-throughput").is_none());
    }

    #[test]
    fn test_indexing_policy_serialization() {
        let policy = IndexingPolicy {
            automatic: Some(true),
            indexing_mode: Some(IndexingMode::Consistent),
            included_paths: vec![IncludedPath {
                path: "/*".to_string(),
                indexes: vec![Index {
                    data_type: DataType::String,
                    precision: Some(-1),
                    kind: IndexKind::Range,
                }],
            }],
            excluded_paths: vec![ExcludedPath {
                path: "/\"_etag\"/?".to_string(),
            }],
        };

        assert_eq!(
            serde_json::to_value(&policy).unwrap(),
            json!({
                "automatic": true,
                "indexingMode": "Consistent",
                "includedPaths": [
                    {"path": "/*", "indexes": [{"dataType": "String", "precision": -1, "kind": "Range"}]}
                ],
                "excludedPaths": [{"path": "/\"_etag\"/?"}],
            })
        );
    }

    #[test]
    fn test_deserialize_collection() {
        let coll: CollectionResource = serde_json::from_value(json!({
            "id": "col1",
            "_rid": "Zuk=AA==",
            "_etag": "\"1\"",
            "_docs": "docs/",
            "_sprocs": "sprocs/",
            "indexingPolicy": {"indexingMode": "Lazy"},
            "partitionKey": {"paths": ["/pk"], "kind": "Hash"},
        }))
        .unwrap();

        assert_eq!(coll.id, "col1");
        assert_eq!(coll.system.etag, "\"1\"");
        assert_eq!(coll.documents, "docs/");
        assert_eq!(
            coll.indexing_policy.unwrap().indexing_mode,
            Some(IndexingMode::Lazy)
        );
        assert_eq!(coll.partition_key.unwrap().paths, vec!["/pk"]);
    }
}
