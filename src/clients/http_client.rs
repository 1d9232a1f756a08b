//! Transports: the single point where the client awaits the network.
//!
//! # Overview
//!
//! - [`Transport`]: sends one [`HttpRequest`] and returns the raw
//!   [`HttpResponse`], whatever its status
//! - [`ReqwestTransport`]: the default transport, backed by `reqwest`
//! - [`RetryTransport`]: wraps another transport and retries throttled
//!   (429) responses
//!
//! # Retry Behavior
//!
//! [`RetryTransport`] waits for `x-ms-retry-after-ms` when present, else
//! `Retry-After` (seconds), else one second. When `max_tries` is exhausted
//! the last 429 response is returned as-is so the caller classifies it like
//! any other status. Other statuses are never retried.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::errors::{DocDbError, InvalidHttpRequestError};
use crate::clients::headers;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::{parse_millis, parse_secs, HttpResponse};

/// Fixed retry wait time in seconds when the server gives no hint.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Status code for throttled requests.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Sends requests over the network.
///
/// Implementations return every response, successful or not; only failures
/// to obtain a response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and waits for the response.
    ///
    /// # Errors
    ///
    /// Returns [`DocDbError::Transport`] if no response could be obtained.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, DocDbError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, DocDbError> {
        (**self).send(request).await
    }
}

/// The default transport, backed by a shared `reqwest::Client`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a transport with a default `reqwest::Client`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport around an existing client, for custom TLS,
    /// proxy or pool settings.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    fn request_headers(
        headers: &HashMap<String, String>,
    ) -> Result<reqwest::header::HeaderMap, InvalidHttpRequestError> {
        let mut map = reqwest::header::HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let invalid = || InvalidHttpRequestError::InvalidHeader { name: name.clone() };
            let header_name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| invalid())?;
            let header_value =
                reqwest::header::HeaderValue::from_str(value).map_err(|_| invalid())?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// Collects response headers lower-cased, keeping every value.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, DocDbError> {
        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url)
            .headers(Self::request_headers(&request.headers)?);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let res = builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body = res.bytes().await?;

        Ok(HttpResponse::new(code, res_headers, body))
    }
}

/// Retries throttled requests on top of another transport.
///
/// # Example
///
/// ```rust
/// use docdb_rest::clients::{ReqwestTransport, RetryTransport};
///
/// let transport = RetryTransport::new(ReqwestTransport::new(), 3);
/// assert_eq!(transport.max_tries(), 3);
/// ```
pub struct RetryTransport<T> {
    inner: T,
    max_tries: u32,
}

impl<T> RetryTransport<T> {
    /// Wraps `inner`, attempting each request at most `max_tries` times.
    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn new(inner: T, max_tries: u32) -> Self {
        Self {
            inner,
            max_tries: max_tries.max(1),
        }
    }

    /// Returns the maximum number of attempts per request.
    #[must_use]
    pub const fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Calculates how long to wait before retrying a throttled response.
    fn retry_delay(response: &HttpResponse) -> Duration {
        response
            .header(headers::RETRY_AFTER_MS)
            .and_then(parse_millis)
            .or_else(|| {
                response
                    .header(headers::RETRY_AFTER)
                    .and_then(parse_secs)
            })
            .unwrap_or(Duration::from_secs(RETRY_WAIT_TIME))
    }
}

impl<T> fmt::Debug for RetryTransport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryTransport")
            .field("max_tries", &self.max_tries)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, DocDbError> {
        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let response = self.inner.send(request.clone()).await?;
            if response.code != TOO_MANY_REQUESTS || tries >= self.max_tries {
                return Ok(response);
            }

            let delay = Self::retry_delay(&response);
            tracing::warn!(
                "Request to {} throttled (attempt {}/{}), retrying in {:?}",
                request.url,
                tries,
                self.max_tries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Returns scripted responses in order and records every request.
    struct Scripted {
        responses: Mutex<Vec<HttpResponse>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<HttpResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, DocDbError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.responses.lock().unwrap().pop().unwrap())
        }
    }

    fn response(code: u16, pairs: &[(&str, &str)]) -> HttpResponse {
        let headers = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), vec![(*v).to_string()]))
            .collect();
        HttpResponse::new(code, headers, Bytes::from_static(b"{}"))
    }

    fn request() -> HttpRequest {
        let mut request = HttpRequest::new(HttpMethod::Post, "https://localhost/dbs");
        request.body = Some(Bytes::from_static(b"{\"id\":\"db1\"}"));
        request
    }

    #[tokio::test]
    async fn test_retry_transport_retries_429_then_succeeds() {
        let transport = RetryTransport::new(
            Scripted::new(vec![
                response(429, &[("x-ms-retry-after-ms", "1")]),
                response(429, &[("x-ms-retry-after-ms", "1")]),
                response(201, &[]),
            ]),
            3,
        );

        let res = transport.send(request()).await.unwrap();
        assert_eq!(res.code, 201);

        let seen = transport.inner.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        for req in seen.iter() {
            assert_eq!(req.get_body().as_deref(), Some(&b"{\"id\":\"db1\"}"[..]));
        }
    }

    #[tokio::test]
    async fn test_retry_transport_returns_last_429_when_exhausted() {
        let transport = RetryTransport::new(
            Scripted::new(vec![
                response(429, &[("x-ms-retry-after-ms", "1")]),
                response(429, &[("x-ms-retry-after-ms", "2")]),
            ]),
            2,
        );

        let res = transport.send(request()).await.unwrap();
        assert_eq!(res.code, 429);
        assert_eq!(res.header("x-ms-retry-after-ms"), Some("2"));
        assert_eq!(transport.inner.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_transport_does_not_retry_other_statuses() {
        let transport = RetryTransport::new(Scripted::new(vec![response(500, &[])]), 5);

        let res = transport.send(request()).await.unwrap();
        assert_eq!(res.code, 500);
        assert_eq!(transport.inner.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_retry_delay_prefers_ms_header() {
        let res = response(429, &[("x-ms-retry-after-ms", "250"), ("retry-after", "9")]);
        assert_eq!(
            RetryTransport::<Scripted>::retry_delay(&res),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_retry_delay_falls_back_to_retry_after_then_default() {
        let res = response(429, &[("Retry-After", "2")]);
        assert_eq!(
            RetryTransport::<Scripted>::retry_delay(&res),
            Duration::from_secs(2)
        );

        let res = response(429, &[]);
        assert_eq!(
            RetryTransport::<Scripted>::retry_delay(&res),
            Duration::from_secs(RETRY_WAIT_TIME)
        );
    }

    #[test]
    fn test_retry_delay_ignores_out_of_range_values() {
        let res = response(429, &[("x-ms-retry-after-ms", "1e300"), ("retry-after", "3")]);
        assert_eq!(
            RetryTransport::<Scripted>::retry_delay(&res),
            Duration::from_secs(3)
        );

        let res = response(429, &[("retry-after", "1e300")]);
        assert_eq!(
            RetryTransport::<Scripted>::retry_delay(&res),
            Duration::from_secs(RETRY_WAIT_TIME)
        );
    }

    #[test]
    fn test_parse_response_headers_keeps_non_ascii_values() {
        let mut map = reqwest::header::HeaderMap::new();
        map.insert(
            "x-ms-continuation",
            reqwest::header::HeaderValue::from_bytes(b"tok\xe9n").unwrap(),
        );
        map.insert(
            "x-ms-session-token",
            reqwest::header::HeaderValue::from_static("0:42"),
        );

        let parsed = ReqwestTransport::parse_response_headers(&map);
        assert_eq!(parsed["x-ms-continuation"], vec!["tok\u{fffd}n".to_string()]);

        let meta = HttpResponse::new(200, parsed, Bytes::new()).metadata();
        assert_eq!(meta.continuation.as_deref(), Some("tok\u{fffd}n"));
        assert_eq!(meta.session_token.as_deref(), Some("0:42"));
    }

    #[test]
    fn test_max_tries_is_at_least_one() {
        let transport = RetryTransport::new(ReqwestTransport::new(), 0);
        assert_eq!(transport.max_tries(), 1);
    }

    #[test]
    fn test_request_headers_rejects_invalid_values() {
        let mut headers = HashMap::new();
        headers.insert("x-ok".to_string(), "line\nbreak".to_string());
        assert!(matches!(
            ReqwestTransport::request_headers(&headers),
            Err(InvalidHttpRequestError::InvalidHeader { name }) if name == "x-ok"
        ));
    }

    #[test]
    fn test_transports_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestTransport>();
        assert_send_sync::<RetryTransport<ReqwestTransport>>();
    }
}
