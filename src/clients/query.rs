//! SQL-like queries.
//!
//! A [`Query`] is both the body of a query request and a source of request
//! options: the text and parameters are serialized as the JSON body, while
//! the paging and consistency settings travel as headers.
//!
//! # Example
//!
//! ```rust
//! use docdb_rest::clients::Query;
//! use serde_json::json;
//!
//! let query = Query::new("SELECT * FROM c WHERE c.owner = @owner AND c.pin = @pin")
//!     .with_parameter("@owner", "alice")
//!     .with_sensitive_parameter("@pin", 1234)
//!     .max_item_count(50);
//!
//! // Sensitive values never show up in logs...
//! assert_eq!(
//!     query.to_string(),
//!     r#"SELECT * FROM c WHERE c.owner = @owner AND c.pin = @pin; [@owner: "alice", @pin: !(sensitive)]"#,
//! );
//!
//! // ...but are always sent.
//! assert_eq!(
//!     serde_json::to_value(&query).unwrap(),
//!     json!({
//!         "query": "SELECT * FROM c WHERE c.owner = @owner AND c.pin = @pin",
//!         "parameters": [
//!             {"name": "@owner", "value": "alice"},
//!             {"name": "@pin", "value": 1234},
//!         ],
//!     }),
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::clients::headers;
use crate::clients::http_request::HttpRequest;
use crate::clients::options::{ConsistencyLevel, RequestOptions};

/// A named query parameter.
#[derive(Clone, PartialEq, Serialize)]
pub struct QueryParameter {
    /// Parameter name, conventionally starting with `@`.
    pub name: String,
    /// Parameter value.
    pub value: serde_json::Value,
    /// Hides the value when the query is formatted for display.
    #[serde(skip)]
    pub sensitive: bool,
}

impl fmt::Display for QueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sensitive {
            write!(f, "{}: !(sensitive)", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.value)
        }
    }
}

impl fmt::Debug for QueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A SQL-like query with parameters and paging options.
///
/// Only `query` and `parameters` are serialized; everything else is applied
/// as request headers through [`RequestOptions`].
#[derive(Clone, Default, Serialize)]
pub struct Query {
    /// The query text.
    pub query: String,
    /// Named parameters referenced by the query text.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<QueryParameter>,
    /// Maximum number of items per page.
    #[serde(skip)]
    pub max_item_count: Option<i64>,
    /// Resume from this continuation token.
    #[serde(skip)]
    pub continuation: Option<String>,
    /// Allow the query to span partitions.
    #[serde(skip)]
    pub enable_cross_partition: bool,
    /// Consistency level override.
    #[serde(skip)]
    pub consistency_level: Option<ConsistencyLevel>,
    /// Session token to echo under session consistency.
    #[serde(skip)]
    pub session_token: Option<String>,
    /// Further options applied after the query's own.
    #[serde(skip)]
    pub request_options: Option<Arc<dyn RequestOptions>>,
}

impl Query {
    /// Creates a query with no parameters.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Adds a named parameter.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.parameters.push(QueryParameter {
            name: name.into(),
            value: value.into(),
            sensitive: false,
        });
    }

    /// Adds a named parameter whose value is hidden when displayed.
    pub fn add_sensitive_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) {
        self.parameters.push(QueryParameter {
            name: name.into(),
            value: value.into(),
            sensitive: true,
        });
    }

    /// Builder form of [`add_parameter`](Self::add_parameter).
    #[must_use]
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.add_parameter(name, value);
        self
    }

    /// Builder form of [`add_sensitive_parameter`](Self::add_sensitive_parameter).
    #[must_use]
    pub fn with_sensitive_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.add_sensitive_parameter(name, value);
        self
    }

    /// Sets the maximum number of items per page.
    #[must_use]
    pub const fn max_item_count(mut self, count: i64) -> Self {
        self.max_item_count = Some(count);
        self
    }

    /// Resumes a previous query from its continuation token.
    #[must_use]
    pub fn continuation(mut self, token: impl Into<String>) -> Self {
        self.continuation = Some(token.into());
        self
    }

    /// Allows the query to span partitions.
    #[must_use]
    pub const fn enable_cross_partition(mut self, enable: bool) -> Self {
        self.enable_cross_partition = enable;
        self
    }

    /// Overrides the consistency level.
    #[must_use]
    pub const fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = Some(level);
        self
    }

    /// Sets the session token to echo.
    #[must_use]
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Adds options applied after the query's own headers.
    #[must_use]
    pub fn request_options(mut self, options: impl RequestOptions + 'static) -> Self {
        self.request_options = Some(Arc::new(options));
        self
    }
}

impl RequestOptions for Query {
    fn apply_options(&self, req: &mut HttpRequest) {
        if let Some(token) = &self.session_token {
            req.set_header(headers::SESSION_TOKEN, token.as_str());
        }
        if let Some(level) = self.consistency_level {
            req.set_header(headers::CONSISTENCY_LEVEL, level.as_str());
        }
        if self.enable_cross_partition {
            req.set_header(headers::ENABLE_CROSS_PARTITION, "true");
        }
        if let Some(continuation) = &self.continuation {
            req.set_header(headers::CONTINUATION, continuation.as_str());
        }
        if let Some(count) = self.max_item_count {
            req.set_header(headers::MAX_ITEM_COUNT, count.to_string());
        }
        if let Some(options) = &self.request_options {
            options.apply_options(req);
        }
    }
}

/// Renders `text; [@a: "x", @b: !(sensitive)]` for logging. Not sent.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.query)?;
        if !self.parameters.is_empty() {
            f.write_str(" [")?;
            for (i, parameter) in self.parameters.iter().enumerate() {
                if i != 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{parameter}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("query", &self.query)
            .field("parameters", &self.parameters)
            .field("max_item_count", &self.max_item_count)
            .field("continuation", &self.continuation)
            .field("enable_cross_partition", &self.enable_cross_partition)
            .field("consistency_level", &self.consistency_level)
            .field("session_token", &self.session_token)
            .finish_non_exhaustive()
    }
}
