//! Header names and MIME types used on the wire.
//!
//! Names are lower-case; [`HttpRequest`](super::HttpRequest) and
//! [`HttpResponse`](super::HttpResponse) store headers lower-cased so these
//! constants can be used directly as lookup keys.

/// MIME type for generic JSON content.
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// MIME type required for query POSTs.
pub const CONTENT_TYPE_QUERY_JSON: &str = "application/query+json";

// Request headers
/// Client identification sent on every request.
pub const USER_AGENT: &str = "user-agent";
/// MIME type of the request or response body.
pub const CONTENT_TYPE: &str = "content-type";
/// The master key token produced by the signer.
pub const AUTHORIZATION: &str = "authorization";
/// ETag that must match for a replace or delete to succeed.
pub const IF_MATCH: &str = "if-match";
/// ETag for a conditional read; `304` when unchanged.
pub const IF_NONE_MATCH: &str = "if-none-match";
/// Date for a conditional read when no ETag is given.
pub const IF_MODIFIED_SINCE: &str = "if-modified-since";
/// The signing date, in RFC 1123 format.
pub const MS_DATE: &str = "x-ms-date";
/// The REST API version.
pub const MS_VERSION: &str = "x-ms-version";
/// Overrides the account consistency level for one request.
pub const CONSISTENCY_LEVEL: &str = "x-ms-consistency-level";
/// Page size for list and query feeds.
pub const MAX_ITEM_COUNT: &str = "x-ms-max-item-count";
/// JSON array holding the partition key value.
pub const PARTITION_KEY: &str = "x-ms-documentdb-partitionkey";
/// Restricts a feed to one partition key range.
pub const PARTITION_KEY_RANGE_ID: &str = "x-ms-documentdb-partitionkeyrangeid";
/// Allows a query to span partitions.
pub const ENABLE_CROSS_PARTITION: &str = "x-ms-documentdb-query-enablecrosspartition";
/// Marks a POST as a query rather than a create. Always `"true"`.
pub const IS_QUERY: &str = "x-ms-documentdb-isquery";
/// Turns a document create into an upsert.
pub const IS_UPSERT: &str = "x-ms-documentdb-is-upsert";
/// Includes or excludes a document from the index.
pub const INDEXING_DIRECTIVE: &str = "x-ms-indexing-directive";
/// Pre-defined performance level for a new collection.
pub const OFFER_TYPE: &str = "x-ms-offer-type";
/// User-defined throughput for a new collection.
pub const OFFER_THROUGHPUT: &str = "x-ms-offer-throughput";
/// Requests the change feed when set to `"Incremental feed"`.
pub const A_IM: &str = "a-im";

// Headers sent in both directions
/// Client-supplied id echoed back by the server.
pub const ACTIVITY_ID: &str = "x-ms-activity-id";
/// Opaque token for the next page of a feed.
pub const CONTINUATION: &str = "x-ms-continuation";
/// Session consistency token.
pub const SESSION_TOKEN: &str = "x-ms-session-token";

// Response headers
/// Server date of the response.
pub const DATE: &str = "date";
/// Entity tag of the returned resource.
pub const ETAG: &str = "etag";
/// Alternate content path of the resource.
pub const ALT_CONTENT_PATH: &str = "x-ms-alt-content-path";
/// Number of items in the returned page.
pub const ITEM_COUNT: &str = "x-ms-item-count";
/// Request units consumed by the operation.
pub const REQUEST_CHARGE: &str = "x-ms-request-charge";
/// Allotted quota for the resource.
pub const RESOURCE_QUOTA: &str = "x-ms-resource-quota";
/// Current usage of the resource.
pub const RESOURCE_USAGE: &str = "x-ms-resource-usage";
/// Milliseconds to wait after a `429`.
pub const RETRY_AFTER_MS: &str = "x-ms-retry-after-ms";
/// Seconds to wait after a `429`.
pub const RETRY_AFTER: &str = "retry-after";
/// Resource schema version.
pub const SCHEMA_VERSION: &str = "x-ms-schemaversion";
/// Service version that handled the request.
pub const SERVICE_VERSION: &str = "x-ms-serviceversion";
