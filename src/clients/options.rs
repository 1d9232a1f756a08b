//! Composable request options.
//!
//! Options are anything implementing [`RequestOptions`]: a single step that
//! adds or overwrites the headers it owns on an outgoing [`HttpRequest`].
//! Independent option sources are stacked with [`OptionsList`], which
//! applies its members in order and skips absent ones, so a query's paging
//! headers, a per-call ETag precondition and an ad-hoc closure can all be
//! applied to the same request.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use docdb_rest::clients::{
//!     CommonRequestOptions, ConsistencyLevel, HttpMethod, HttpRequest, OptionsFn,
//!     OptionsList, RequestOptions,
//! };
//!
//! let per_call: Option<Arc<dyn RequestOptions>> = None;
//!
//! let common = CommonRequestOptions {
//!     consistency_level: Some(ConsistencyLevel::Session),
//!     max_item_count: Some(10),
//!     ..Default::default()
//! };
//! let tag = OptionsFn::new(|req: &mut HttpRequest| req.set_header("x-app", "demo"));
//! let mut chain = OptionsList::new().with(common);
//! chain.push(per_call);
//! let chain = chain.with(tag);
//!
//! let mut request = HttpRequest::new(HttpMethod::Get, "https://localhost/dbs");
//! chain.apply_options(&mut request);
//!
//! assert_eq!(request.header("x-ms-consistency-level"), Some("Session"));
//! assert_eq!(request.header("x-ms-max-item-count"), Some("10"));
//! assert_eq!(request.header("x-app"), Some("demo"));
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::format_http_date;
use crate::clients::headers;
use crate::clients::http_request::{HttpMethod, HttpRequest};

/// A step that mutates an outgoing request, usually by setting headers.
///
/// Implementations should only add or overwrite the headers they own and
/// never clear headers set by others.
pub trait RequestOptions: Send + Sync {
    /// Applies this step to `req`.
    fn apply_options(&self, req: &mut HttpRequest);
}

/// Options shared between a caller and the requests built from them.
pub type SharedOptions = Arc<dyn RequestOptions>;

impl<T: RequestOptions + ?Sized> RequestOptions for Arc<T> {
    fn apply_options(&self, req: &mut HttpRequest) {
        (**self).apply_options(req);
    }
}

impl<T: RequestOptions + ?Sized> RequestOptions for Box<T> {
    fn apply_options(&self, req: &mut HttpRequest) {
        (**self).apply_options(req);
    }
}

/// Adapts a closure into [`RequestOptions`].
pub struct OptionsFn<F>(F);

impl<F> OptionsFn<F>
where
    F: Fn(&mut HttpRequest) + Send + Sync,
{
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> RequestOptions for OptionsFn<F>
where
    F: Fn(&mut HttpRequest) + Send + Sync,
{
    fn apply_options(&self, req: &mut HttpRequest) {
        (self.0)(req);
    }
}

impl<F> fmt::Debug for OptionsFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OptionsFn(..)")
    }
}

/// An ordered chain of options. `None` members are skipped.
#[derive(Clone, Default)]
pub struct OptionsList(Vec<Option<Arc<dyn RequestOptions>>>);

impl OptionsList {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `option` to the end of the chain.
    #[must_use]
    pub fn with(mut self, option: impl RequestOptions + 'static) -> Self {
        self.0.push(Some(Arc::new(option)));
        self
    }

    /// Appends a possibly absent member to the end of the chain.
    pub fn push(&mut self, member: Option<Arc<dyn RequestOptions>>) {
        self.0.push(member);
    }

    /// Returns the number of members, including absent ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the chain has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Option<Arc<dyn RequestOptions>>> for OptionsList {
    fn from_iter<I: IntoIterator<Item = Option<Arc<dyn RequestOptions>>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl RequestOptions for OptionsList {
    fn apply_options(&self, req: &mut HttpRequest) {
        for option in self.0.iter().flatten() {
            option.apply_options(req);
        }
    }
}

impl fmt::Debug for OptionsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OptionsList").field(&self.0.len()).finish()
    }
}

/// Consistency level override, strongest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConsistencyLevel {
    /// Linearizable reads.
    Strong,
    /// Reads lag writes by at most a bounded amount.
    Bounded,
    /// Consistency scoped to a single client session.
    Session,
    /// The weakest level.
    Eventual,
}

impl ConsistencyLevel {
    /// Returns the header value for this level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Bounded => "Bounded",
            Self::Session => "Session",
            Self::Eventual => "Eventual",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats a partition key value as the JSON array the partition key
/// header expects.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
///
/// # Example
///
/// ```rust
/// use docdb_rest::clients::partition_key_header;
///
/// assert_eq!(partition_key_header(&"tenant-1").unwrap(), r#"["tenant-1"]"#);
/// assert_eq!(partition_key_header(&42).unwrap(), "[42]");
/// ```
pub fn partition_key_header<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(&[value])
}

/// The common request headers, each set only when present.
///
/// Some headers only make sense for certain verbs and are skipped otherwise:
///
/// - `content_type`: PUT and POST
/// - `if_match`: PUT and DELETE
/// - `if_none_match` (or, failing that, `if_modified_since`): GET
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommonRequestOptions {
    /// Client activity id for tracing a request.
    pub activity_id: Option<String>,
    /// Overrides the body MIME type.
    pub content_type: Option<String>,
    /// ETag required for optimistic concurrency.
    pub if_match: Option<String>,
    /// ETag for a conditional read.
    pub if_none_match: Option<String>,
    /// Date for a conditional read.
    pub if_modified_since: Option<DateTime<Utc>>,
    /// Session token for session consistency.
    pub session_token: Option<String>,
    /// Per-request consistency override.
    pub consistency_level: Option<ConsistencyLevel>,
    /// Already formatted as a JSON array; see [`partition_key_header`].
    pub partition_key: Option<String>,
    /// Partition key range to read from.
    pub partition_key_range_id: Option<String>,
    /// Allows queries across partitions.
    pub enable_cross_partition: bool,
    /// Requests the change feed instead of the regular feed.
    pub change_feed: bool,
    /// Maximum items per page.
    pub max_item_count: Option<i64>,
    /// Continuation token to resume a feed.
    pub continuation: Option<String>,
}

impl RequestOptions for CommonRequestOptions {
    fn apply_options(&self, req: &mut HttpRequest) {
        if matches!(req.method, HttpMethod::Put | HttpMethod::Post) {
            if let Some(content_type) = &self.content_type {
                req.set_header(headers::CONTENT_TYPE, content_type.as_str());
            }
        }
        if matches!(req.method, HttpMethod::Put | HttpMethod::Delete) {
            if let Some(etag) = &self.if_match {
                req.set_header(headers::IF_MATCH, etag.as_str());
            }
        }
        if req.method == HttpMethod::Get {
            if let Some(etag) = &self.if_none_match {
                req.set_header(headers::IF_NONE_MATCH, etag.as_str());
            } else if let Some(since) = self.if_modified_since {
                req.set_header(headers::IF_MODIFIED_SINCE, format_http_date(since));
            }
        }
        if self.enable_cross_partition {
            req.set_header(headers::ENABLE_CROSS_PARTITION, "true");
        }
        if let Some(activity_id) = &self.activity_id {
            req.set_header(headers::ACTIVITY_ID, activity_id.as_str());
        }
        if let Some(token) = &self.session_token {
            req.set_header(headers::SESSION_TOKEN, token.as_str());
        }
        if let Some(level) = self.consistency_level {
            req.set_header(headers::CONSISTENCY_LEVEL, level.as_str());
        }
        if let Some(continuation) = &self.continuation {
            req.set_header(headers::CONTINUATION, continuation.as_str());
        }
        if let Some(count) = self.max_item_count {
            req.set_header(headers::MAX_ITEM_COUNT, count.to_string());
        }
        if let Some(pk) = &self.partition_key {
            req.set_header(headers::PARTITION_KEY, pk.as_str());
        }
        if let Some(range_id) = &self.partition_key_range_id {
            req.set_header(headers::PARTITION_KEY_RANGE_ID, range_id.as_str());
        }
        if self.change_feed {
            req.set_header(headers::A_IM, "Incremental feed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(method: HttpMethod) -> HttpRequest {
        HttpRequest::new(method, "https://localhost/dbs/db1/colls/col1/docs")
    }

    fn preconditions() -> CommonRequestOptions {
        CommonRequestOptions {
            content_type: Some("application/json-patch+json".to_string()),
            if_match: Some("\"etag-1\"".to_string()),
            if_none_match: Some("\"etag-2\"".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_content_type_only_on_put_and_post() {
        for method in [HttpMethod::Put, HttpMethod::Post] {
            let mut req = request(method);
            preconditions().apply_options(&mut req);
            assert_eq!(
                req.header("content-type"),
                Some("application/json-patch+json")
            );
        }
        for method in [HttpMethod::Get, HttpMethod::Delete] {
            let mut req = request(method);
            preconditions().apply_options(&mut req);
            assert_eq!(req.header("content-type"), None);
        }
    }

    #[test]
    fn test_if_match_only_on_put_and_delete() {
        for method in [HttpMethod::Put, HttpMethod::Delete] {
            let mut req = request(method);
            preconditions().apply_options(&mut req);
            assert_eq!(req.header("if-match"), Some("\"etag-1\""));
        }
        for method in [HttpMethod::Get, HttpMethod::Post] {
            let mut req = request(method);
            preconditions().apply_options(&mut req);
            assert_eq!(req.header("if-match"), None);
        }
    }

    #[test]
    fn test_if_none_match_only_on_get() {
        let mut req = request(HttpMethod::Get);
        preconditions().apply_options(&mut req);
        assert_eq!(req.header("if-none-match"), Some("\"etag-2\""));

        for method in [HttpMethod::Put, HttpMethod::Post, HttpMethod::Delete] {
            let mut req = request(method);
            preconditions().apply_options(&mut req);
            assert_eq!(req.header("if-none-match"), None);
        }
    }

    #[test]
    fn test_if_modified_since_used_when_no_etag() {
        let since = Utc.with_ymd_and_hms(2019, 3, 1, 12, 30, 0).unwrap();
        let options = CommonRequestOptions {
            if_modified_since: Some(since),
            ..Default::default()
        };

        let mut req = request(HttpMethod::Get);
        options.apply_options(&mut req);
        assert_eq!(
            req.header("if-modified-since"),
            Some("Fri, 01 Mar 2019 12:30:00 GMT")
        );

        let both = CommonRequestOptions {
            if_none_match: Some("\"etag\"".to_string()),
            if_modified_since: Some(since),
            ..Default::default()
        };
        let mut req = request(HttpMethod::Get);
        both.apply_options(&mut req);
        assert_eq!(req.header("if-modified-since"), None);
        assert_eq!(req.header("if-none-match"), Some("\"etag\""));
    }

    #[test]
    fn test_common_headers_on_any_method() {
        let options = CommonRequestOptions {
            activity_id: Some("activity".to_string()),
            session_token: Some("0:1".to_string()),
            consistency_level: Some(ConsistencyLevel::Eventual),
            partition_key: Some(partition_key_header("pk").unwrap()),
            partition_key_range_id: Some("0".to_string()),
            enable_cross_partition: true,
            change_feed: true,
            max_item_count: Some(-1),
            continuation: Some("cursor".to_string()),
            ..Default::default()
        };

        let mut req = request(HttpMethod::Post);
        options.apply_options(&mut req);

        assert_eq!(req.header("x-ms-activity-id"), Some("activity"));
        assert_eq!(req.header("x-ms-session-token"), Some("0:1"));
        assert_eq!(req.header("x-ms-consistency-level"), Some("Eventual"));
        assert_eq!(req.header("x-ms-documentdb-partitionkey"), Some(r#"["pk"]"#));
        assert_eq!(req.header("x-ms-documentdb-partitionkeyrangeid"), Some("0"));
        assert_eq!(
            req.header("x-ms-documentdb-query-enablecrosspartition"),
            Some("true")
        );
        assert_eq!(req.header("a-im"), Some("Incremental feed"));
        assert_eq!(req.header("x-ms-max-item-count"), Some("-1"));
        assert_eq!(req.header("x-ms-continuation"), Some("cursor"));
    }

    #[test]
    fn test_default_options_set_nothing() {
        let mut req = request(HttpMethod::Get);
        CommonRequestOptions::default().apply_options(&mut req);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_options_list_applies_in_order_and_skips_none() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let first = OptionsFn::new(|req: &mut HttpRequest| req.set_header("x-order", "first"));
        let second = OptionsFn::new(move |req: &mut HttpRequest| {
            counter.fetch_add(1, Ordering::SeqCst);
            req.set_header("x-order", "second");
        });
        let mut list = OptionsList::new();
        list.push(None);
        let mut list = list.with(first);
        list.push(None);
        let list = list.with(second);

        let mut req = request(HttpMethod::Get);
        list.apply_options(&mut req);

        assert_eq!(req.header("x-order"), Some("second"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_members_do_not_clear_earlier_headers() {
        let a = OptionsFn::new(|req: &mut HttpRequest| req.set_header("x-a", "1"));
        let b = CommonRequestOptions {
            max_item_count: Some(5),
            ..Default::default()
        };
        let list = OptionsList::new().with(a).with(b);

        let mut req = request(HttpMethod::Get);
        list.apply_options(&mut req);

        assert_eq!(req.header("x-a"), Some("1"));
        assert_eq!(req.header("x-ms-max-item-count"), Some("5"));
    }

    #[test]
    fn test_applying_chain_twice_is_idempotent() {
        let common = CommonRequestOptions {
            session_token: Some("0:1".to_string()),
            if_match: Some("\"e\"".to_string()),
            max_item_count: Some(3),
            ..Default::default()
        };
        let list = OptionsList::new()
            .with(common)
            .with(OptionsFn::new(|req: &mut HttpRequest| {
                req.set_header("x-app", "demo");
            }));

        let mut once = request(HttpMethod::Put);
        list.apply_options(&mut once);

        let mut twice = request(HttpMethod::Put);
        list.apply_options(&mut twice);
        list.apply_options(&mut twice);

        assert_eq!(once.headers, twice.headers);
    }

    #[test]
    fn test_empty_list_is_noop() {
        let mut req = request(HttpMethod::Get);
        OptionsList::default().apply_options(&mut req);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_partition_key_header_formats_json_array() {
        assert_eq!(partition_key_header("a\"b").unwrap(), r#"["a\"b"]"#);
        assert_eq!(partition_key_header(&true).unwrap(), "[true]");
    }
}
