//! Continuation-driven pagination for list and query feeds.
//!
//! A list operation issues a GET (or a POST carrying a query), pulls the
//! array stored under a caller-supplied key out of the JSON response and
//! hands it to a page consumer together with the [`ResponseMetadata`].
//! While the consumer asks for more and the server returns an
//! `x-ms-continuation` token, the request is re-issued with that token and
//! the session token of the same response.
//!
//! Pages are delivered strictly in the order the server returns them. Any
//! failure aborts the whole run; pages already delivered stay delivered.

use std::sync::Arc;

use serde_json::Value;

use crate::clients::client::Client;
use crate::clients::errors::{DocDbError, InvalidHttpRequestError};
use crate::clients::headers;
use crate::clients::http_request::{ClientRequest, HttpMethod, HttpRequest};
use crate::clients::http_response::ResponseMetadata;
use crate::clients::options::{OptionsList, RequestOptions};

/// Extracts the array stored under `key` in a JSON object body.
///
/// A `null` value is treated as an empty page.
///
/// # Errors
///
/// - [`DocDbError::Json`] if the body is not a JSON object, or the value
///   under `key` is not an array
/// - [`DocDbError::KeyNotFound`] if the object has no `key`
///
/// # Example
///
/// ```rust
/// use docdb_rest::clients::parse_array_from_response;
/// use docdb_rest::DocDbError;
///
/// let body = br#"{"_rid":"abc","Documents":[{"id":"a"},{"id":"b"}],"_count":2}"#;
/// let items = parse_array_from_response(body, "Documents").unwrap();
/// assert_eq!(items.len(), 2);
///
/// let missing = parse_array_from_response(body, "Databases");
/// assert!(matches!(missing, Err(DocDbError::KeyNotFound { .. })));
/// ```
pub fn parse_array_from_response(body: &[u8], key: &str) -> Result<Vec<Value>, DocDbError> {
    let mut object: serde_json::Map<String, Value> = serde_json::from_slice(body)?;
    match object.remove(key) {
        None => Err(DocDbError::KeyNotFound {
            key: key.to_string(),
        }),
        Some(Value::Null) => Ok(Vec::new()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

/// Tags a POST as a query rather than a create.
struct RequestIsQuery;

impl RequestOptions for RequestIsQuery {
    fn apply_options(&self, req: &mut HttpRequest) {
        req.set_header(headers::CONTENT_TYPE, headers::CONTENT_TYPE_QUERY_JSON);
        req.set_header(headers::IS_QUERY, "true");
    }
}

enum State {
    Requesting(HttpRequest),
    Delivering {
        items: Vec<Value>,
        metadata: ResponseMetadata,
    },
    Continuing {
        continuation: String,
        session_token: Option<String>,
    },
    Done,
}

/// Drives one list or query operation to completion.
pub(crate) struct Paginator<'a, F> {
    client: &'a Client,
    key: &'a str,
    method: HttpMethod,
    request: ClientRequest,
    consumer: F,
}

impl<'a, F> Paginator<'a, F>
where
    F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
{
    /// Validates the method and prepares the request.
    ///
    /// GET is the default. POST is a query: the body is buffered up front
    /// and the query markers are chained after the caller's options.
    pub(crate) fn new(
        client: &'a Client,
        key: &'a str,
        mut request: ClientRequest,
        consumer: F,
    ) -> Result<Self, DocDbError> {
        let method = match request.method {
            None | Some(HttpMethod::Get) => HttpMethod::Get,
            Some(HttpMethod::Post) => {
                if request.replayable_body()?.is_none() {
                    return Err(InvalidHttpRequestError::MissingBody {
                        method: HttpMethod::Post.to_string(),
                    }
                    .into());
                }
                let mut chain = OptionsList::new();
                chain.push(request.options.take());
                request.options = Some(Arc::new(chain.with(RequestIsQuery)));
                HttpMethod::Post
            }
            Some(other) => {
                return Err(InvalidHttpRequestError::InvalidMethod {
                    method: other.to_string(),
                    operation: "list",
                    allowed: "GET or POST",
                }
                .into())
            }
        };
        request.method = Some(method);

        Ok(Self {
            client,
            key,
            method,
            request,
            consumer,
        })
    }

    /// Runs until the consumer stops, the feed is exhausted or a step fails.
    pub(crate) async fn run(mut self) -> Result<(), DocDbError> {
        let first = self.client.new_http_request(self.method, &mut self.request)?;
        let mut state = State::Requesting(first);

        loop {
            state = match state {
                State::Requesting(req) => {
                    let response = self.client.send(req).await?;
                    if response.code != 200 {
                        return Err(DocDbError::from_status(response.code, &response.body));
                    }
                    State::Delivering {
                        metadata: response.metadata(),
                        items: parse_array_from_response(&response.body, self.key)?,
                    }
                }
                State::Delivering { items, metadata } => {
                    let next = metadata
                        .continuation
                        .clone()
                        .map(|continuation| (continuation, metadata.session_token.clone()));

                    if !(self.consumer)(items, metadata)? {
                        State::Done
                    } else if let Some((continuation, session_token)) = next {
                        State::Continuing {
                            continuation,
                            session_token,
                        }
                    } else {
                        State::Done
                    }
                }
                State::Continuing {
                    continuation,
                    session_token,
                } => {
                    tracing::debug!(
                        "Following continuation for {} (key {})",
                        self.request.path,
                        self.key
                    );
                    let mut req = self.client.new_http_request(self.method, &mut self.request)?;
                    if let Some(token) = session_token {
                        req.set_header(headers::SESSION_TOKEN, token);
                    }
                    req.set_header(headers::CONTINUATION, continuation);
                    State::Requesting(req)
                }
                State::Done => return Ok(()),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_returns_items_in_order() {
        let items =
            parse_array_from_response(br#"{"Databases":[{"id":"a"},{"id":"b"}]}"#, "Databases")
                .unwrap();
        let ids: Vec<&str> = items.iter().filter_map(|v| v["id"].as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_array_missing_key_is_not_an_empty_page() {
        let result = parse_array_from_response(br#"{"Documents":[]}"#, "Offers");
        assert!(matches!(result, Err(DocDbError::KeyNotFound { key }) if key == "Offers"));
    }

    #[test]
    fn test_parse_array_empty_and_null() {
        assert!(parse_array_from_response(br#"{"Offers":[]}"#, "Offers")
            .unwrap()
            .is_empty());
        assert!(parse_array_from_response(br#"{"Offers":null}"#, "Offers")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_array_rejects_non_objects_and_non_arrays() {
        assert!(matches!(
            parse_array_from_response(b"[1,2,3]", "Documents"),
            Err(DocDbError::Json(_))
        ));
        assert!(matches!(
            parse_array_from_response(br#"{"Documents":"nope"}"#, "Documents"),
            Err(DocDbError::Json(_))
        ));
        assert!(matches!(
            parse_array_from_response(b"not json", "Documents"),
            Err(DocDbError::Json(_))
        ));
    }

    #[test]
    fn test_request_is_query_sets_markers() {
        let mut req = HttpRequest::new(HttpMethod::Post, "https://localhost/docs");
        RequestIsQuery.apply_options(&mut req);
        assert_eq!(req.header("content-type"), Some("application/query+json"));
        assert_eq!(req.header("x-ms-documentdb-isquery"), Some("true"));
    }
}
