//! Response types for the document database client.
//!
//! This module provides the raw [`HttpResponse`] returned by a
//! [`Transport`](super::Transport) and the [`ResponseMetadata`] extracted
//! from its headers.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::clients::headers;

/// A raw response as received from the transport.
///
/// Header names are lower-cased on construction; a header may carry
/// several values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers keyed by lower-case name.
    pub headers: HashMap<String, Vec<String>>,
    /// The unparsed response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, lower-casing header names.
    ///
    /// Values of headers whose names differ only by case are merged in
    /// iteration order.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: impl Into<Bytes>) -> Self {
        let mut normalized: HashMap<String, Vec<String>> = HashMap::with_capacity(headers.len());
        for (name, values) in headers {
            normalized
                .entry(name.to_ascii_lowercase())
                .or_default()
                .extend(values);
        }

        Self {
            code,
            headers: normalized,
            body: body.into(),
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        first_value(&self.headers, &name.to_ascii_lowercase())
    }

    /// Extracts the known response headers.
    #[must_use]
    pub fn metadata(&self) -> ResponseMetadata {
        ResponseMetadata::from_headers(&self.headers)
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if the body is not a valid `T`.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// The parsed, well-known response headers.
///
/// Every field is optional: a header that is absent, empty or malformed
/// leaves its field as `None`. When a header carries several values the
/// first one is used.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResponseMetadata {
    /// `Date`
    pub date: Option<DateTime<Utc>>,
    /// `ETag`
    pub etag: Option<String>,
    /// `x-ms-activity-id`
    pub activity_id: Option<String>,
    /// `x-ms-alt-content-path`
    pub alt_content_path: Option<String>,
    /// `x-ms-continuation`: present when more pages are available.
    pub continuation: Option<String>,
    /// `x-ms-request-charge`, in request units.
    pub request_charge: Option<f64>,
    /// `x-ms-resource-quota`
    pub resource_quota: Option<String>,
    /// `x-ms-resource-usage`
    pub resource_usage: Option<String>,
    /// `x-ms-retry-after-ms`
    pub retry_after: Option<Duration>,
    /// `x-ms-schemaversion`
    pub schema_version: Option<String>,
    /// `x-ms-serviceversion`
    pub service_version: Option<String>,
    /// `x-ms-session-token`: echo this back under session consistency.
    pub session_token: Option<String>,
    /// `x-ms-item-count`
    pub item_count: Option<i64>,
}

impl ResponseMetadata {
    /// Extracts metadata from lower-case keyed response headers.
    #[must_use]
    pub fn from_headers(headers: &HashMap<String, Vec<String>>) -> Self {
        let text = |name: &str| first_value(headers, name).map(str::to_string);

        Self {
            date: first_value(headers, headers::DATE).and_then(parse_http_date),
            etag: text(headers::ETAG),
            activity_id: text(headers::ACTIVITY_ID),
            alt_content_path: text(headers::ALT_CONTENT_PATH),
            continuation: text(headers::CONTINUATION),
            request_charge: first_value(headers, headers::REQUEST_CHARGE)
                .and_then(|v| v.trim().parse::<f64>().ok()),
            resource_quota: text(headers::RESOURCE_QUOTA),
            resource_usage: text(headers::RESOURCE_USAGE),
            retry_after: first_value(headers, headers::RETRY_AFTER_MS).and_then(parse_millis),
            schema_version: text(headers::SCHEMA_VERSION),
            service_version: text(headers::SERVICE_VERSION),
            session_token: text(headers::SESSION_TOKEN),
            item_count: first_value(headers, headers::ITEM_COUNT)
                .and_then(|v| v.trim().parse::<i64>().ok()),
        }
    }
}

fn first_value<'a>(headers: &'a HashMap<String, Vec<String>>, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|values| values.first())
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

pub(crate) fn parse_millis(value: &str) -> Option<Duration> {
    let millis = value.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(millis / 1000.0).ok()
}

pub(crate) fn parse_secs(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}
