//! Shared resource infrastructure.
//!
//! - [`Resource`]: ties a resource struct to its feed key and type
//! - [`SystemProperties`]: the server-generated `_rid`, `_ts`, `_self` and
//!   `_etag` fields every resource carries
//! - [`JsonContent`]: a request payload given either as a serializable
//!   document or as raw JSON bytes

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::{DocDbError, InvalidHttpRequestError, ResourceType, ResponseMetadata};

/// A resource type returned by list feeds.
///
/// # Example
///
/// ```rust
/// use docdb_rest::clients::ResourceType;
/// use docdb_rest::rest::{DatabaseResource, Resource};
///
/// assert_eq!(DatabaseResource::KEY, "Databases");
/// assert_eq!(DatabaseResource::TYPE, ResourceType::Databases);
/// ```
pub trait Resource: DeserializeOwned {
    /// The field of a list response holding the array of resources.
    const KEY: &'static str;

    /// The resource type used for signing.
    const TYPE: ResourceType;
}

/// Properties generated by the server for every resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemProperties {
    /// Hierarchical resource id used internally for placement and navigation.
    #[serde(rename = "_rid", default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
    /// Last update time, in seconds since the Unix epoch.
    #[serde(rename = "_ts", default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,
    /// The addressable URI of the resource.
    #[serde(rename = "_self", default, skip_serializing_if = "String::is_empty")]
    pub self_link: String,
    /// The entity tag used for optimistic concurrency.
    #[serde(rename = "_etag", default, skip_serializing_if = "String::is_empty")]
    pub etag: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// A JSON request payload: either a document to serialize or raw bytes.
///
/// Exactly one of the two must be set.
#[derive(Debug)]
pub struct JsonContent<'a, T: ?Sized> {
    /// A document serialized with `serde_json`.
    pub document: Option<&'a T>,
    /// Pre-serialized JSON.
    pub body: Option<Bytes>,
}

impl<'a, T: Serialize + ?Sized> JsonContent<'a, T> {
    /// Content from a serializable document.
    #[must_use]
    pub const fn document(document: &'a T) -> Self {
        Self {
            document: Some(document),
            body: None,
        }
    }

    /// Serializes the content.
    ///
    /// # Errors
    ///
    /// - [`InvalidHttpRequestError::MissingContent`] if neither is set
    /// - [`InvalidHttpRequestError::AmbiguousContent`] if both are set
    /// - [`DocDbError::Json`] if the document cannot be serialized
    pub fn json(&self) -> Result<Bytes, DocDbError> {
        let body = self.body.as_ref().filter(|body| !body.is_empty());
        match (self.document, body) {
            (Some(document), None) => Ok(Bytes::from(serde_json::to_vec(document)?)),
            (None, Some(body)) => Ok(body.clone()),
            (Some(_), Some(_)) => Err(InvalidHttpRequestError::AmbiguousContent.into()),
            (None, None) => Err(InvalidHttpRequestError::MissingContent.into()),
        }
    }
}

impl JsonContent<'static, Value> {
    /// Content from raw JSON bytes.
    #[must_use]
    pub fn raw(body: impl Into<Bytes>) -> Self {
        Self {
            document: None,
            body: Some(body.into()),
        }
    }
}

/// Decodes a page of raw items into resources.
///
/// # Errors
///
/// Returns [`DocDbError::Json`] if any item does not decode.
pub fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>, DocDbError> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(DocDbError::from))
        .collect()
}

/// Adapts a typed page consumer to the raw consumer the paginator drives.
pub(crate) fn typed<T, F>(
    mut consumer: F,
) -> impl FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send
where
    T: DeserializeOwned,
    F: FnMut(Vec<T>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
{
    move |items, metadata| consumer(decode_items(items)?, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_properties_round_trip_names() {
        let props: SystemProperties = serde_json::from_value(json!({
            "_rid": "abc==",
            "_ts": 1_500_000_000,
            "_self": "dbs/abc==/",
            "_etag": "\"00000\"",
        }))
        .unwrap();

        assert_eq!(props.resource_id, "abc==");
        assert_eq!(props.timestamp, 1_500_000_000);
        assert_eq!(props.self_link, "dbs/abc==/");
        assert_eq!(props.etag, "\"00000\"");
    }

    #[test]
    fn test_system_properties_skip_empty_on_serialize() {
        let value = serde_json::to_value(SystemProperties::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_json_content_document() {
        let doc = json!({"id": "a"});
        let bytes = JsonContent::document(&doc).json().unwrap();
        assert_eq!(&bytes[..], br#"{"id":"a"}"#);
    }

    #[test]
    fn test_json_content_raw() {
        let bytes = JsonContent::raw(&br#"{"id":"b"}"#[..]).json().unwrap();
        assert_eq!(&bytes[..], br#"{"id":"b"}"#);
    }

    #[test]
    fn test_json_content_requires_exactly_one() {
        let neither: JsonContent<'_, Value> = JsonContent {
            document: None,
            body: None,
        };
        assert!(matches!(
            neither.json(),
            Err(DocDbError::InvalidRequest(InvalidHttpRequestError::MissingContent))
        ));

        let empty = JsonContent::raw(Bytes::new());
        assert!(matches!(
            empty.json(),
            Err(DocDbError::InvalidRequest(InvalidHttpRequestError::MissingContent))
        ));

        let doc = json!({"id": "a"});
        let both = JsonContent {
            document: Some(&doc),
            body: Some(Bytes::from_static(b"{}")),
        };
        assert!(matches!(
            both.json(),
            Err(DocDbError::InvalidRequest(InvalidHttpRequestError::AmbiguousContent))
        ));
    }

    #[test]
    fn test_typed_consumer_decodes_items() {
        #[derive(Deserialize)]
        struct Item {
            id: String,
        }

        let mut seen = Vec::new();
        let mut consumer = typed(|items: Vec<Item>, _| {
            seen.extend(items.into_iter().map(|i| i.id));
            Ok(true)
        });
        let page = vec![json!({"id": "a"}), json!({"id": "b"})];
        assert!(consumer(page, ResponseMetadata::default()).unwrap());
        assert!(consumer(vec![json!({"nope": 1})], ResponseMetadata::default()).is_err());
        drop(consumer);
        assert_eq!(seen, vec!["a", "b"]);
    }
}
