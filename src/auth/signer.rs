//! Master key request signing.
//!
//! A signed request carries two headers:
//!
//! - `x-ms-date`: the request time in RFC 1123 format
//! - `authorization`: the percent-encoded token
//!   `type=master&ver=1.0&sig=<signature>`
//!
//! The signature is the base64 encoded HMAC-SHA256, keyed by the decoded
//! account key, of:
//!
//! ```text
//! lower(method) + "\n" +
//! lower(resource type) + "\n" +
//! resource link + "\n" +
//! lower(date) + "\n" +
//! "" + "\n"
//! ```
//!
//! The resource link is used as-is; it is case-sensitive.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::Authorizer;
use crate::clients::{headers, DocDbError, HttpMethod, HttpRequest, ResourceType};
use crate::config::MasterKey;

type HmacSha256 = Hmac<Sha256>;

/// Token type for master key signatures.
pub const MASTER_TOKEN_TYPE: &str = "master";
/// Token version.
pub const TOKEN_VERSION: &str = "1.0";

/// Formats a timestamp as an RFC 1123 HTTP date, e.g.
/// `Thu, 01 Jan 1970 00:00:00 GMT`.
#[must_use]
pub fn format_http_date(date: DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Builds the string that is signed for a request.
///
/// # Example
///
/// ```rust
/// use docdb_rest::auth::string_to_sign;
/// use docdb_rest::clients::{HttpMethod, ResourceType};
///
/// let payload = string_to_sign(
///     HttpMethod::Get,
///     ResourceType::Documents,
///     "dbs/db1/colls/Col1",
///     "Thu, 01 Jan 1970 00:00:00 GMT",
/// );
/// assert_eq!(payload, "get\ndocs\ndbs/db1/colls/Col1\nthu, 01 jan 1970 00:00:00 gmt\n\n");
/// ```
#[must_use]
pub fn string_to_sign(
    method: HttpMethod,
    resource_type: ResourceType,
    resource_link: &str,
    date: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n\n",
        method.as_str().to_lowercase(),
        resource_type.as_str().to_lowercase(),
        resource_link,
        date.to_lowercase(),
    )
}

/// Computes the base64 encoded signature for a request.
///
/// `key` is the decoded account key.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn sign(
    key: &[u8],
    method: HttpMethod,
    resource_type: ResourceType,
    resource_link: &str,
    date: &str,
) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(string_to_sign(method, resource_type, resource_link, date).as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Wraps a signature into the percent-encoded `authorization` header value.
///
/// # Example
///
/// ```rust
/// use docdb_rest::auth::authorization_token;
///
/// assert_eq!(
///     authorization_token("ab+c="),
///     "type%3Dmaster%26ver%3D1.0%26sig%3Dab%2Bc%3D",
/// );
/// ```
#[must_use]
pub fn authorization_token(signature: &str) -> String {
    let token = format!("type={MASTER_TOKEN_TYPE}&ver={TOKEN_VERSION}&sig={signature}");
    urlencoding::encode(&token).into_owned()
}

impl MasterKey {
    /// Signs `req` as of `date`.
    ///
    /// The same formatted date is used for the signature and the `x-ms-date`
    /// header. An empty key leaves the request untouched.
    pub fn authorize_at(
        &self,
        req: &mut HttpRequest,
        resource_type: ResourceType,
        resource_link: &str,
        date: DateTime<Utc>,
    ) {
        if self.is_empty() {
            return;
        }

        let date = format_http_date(date);
        let signature = sign(self.as_bytes(), req.method, resource_type, resource_link, &date);
        req.set_header(headers::AUTHORIZATION, authorization_token(&signature));
        req.set_header(headers::MS_DATE, date);
    }
}

impl Authorizer for MasterKey {
    fn authorize(
        &self,
        req: &mut HttpRequest,
        resource_type: ResourceType,
        resource_link: &str,
    ) -> Result<(), DocDbError> {
        self.authorize_at(req, resource_type, resource_link, Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const KEY: &str = "dGVzdGtleQ==";
    const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

    fn key() -> MasterKey {
        MasterKey::parse(KEY).unwrap()
    }

    fn sig(method: HttpMethod, resource_type: ResourceType, link: &str, date: &str) -> String {
        sign(key().as_bytes(), method, resource_type, link, date)
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(format_http_date(Utc.timestamp_opt(0, 0).unwrap()), EPOCH);
        assert_eq!(
            format_http_date(Utc.with_ymd_and_hms(2019, 11, 5, 9, 3, 7).unwrap()),
            "Tue, 05 Nov 2019 09:03:07 GMT"
        );
    }

    #[test]
    fn test_string_to_sign_folds_case_except_link() {
        let payload = string_to_sign(HttpMethod::Post, ResourceType::Collections, "dbs/MyDb", EPOCH);
        assert_eq!(payload, "post\ncolls\ndbs/MyDb\nthu, 01 jan 1970 00:00:00 gmt\n\n");
    }

    #[test]
    fn test_sign_matches_golden_value() {
        assert_eq!(
            sig(HttpMethod::Get, ResourceType::Documents, "dbs/db1/colls/col1", EPOCH),
            "OMgaSSxbRARSEQKrDLRP+xcOpfSy2iubLmWByF44lvg="
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let a = sig(HttpMethod::Get, ResourceType::Documents, "dbs/db1/colls/col1", EPOCH);
        let b = sig(HttpMethod::Get, ResourceType::Documents, "dbs/db1/colls/col1", EPOCH);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_changes_with_each_input() {
        let base = sig(HttpMethod::Get, ResourceType::Documents, "dbs/db1/colls/col1", EPOCH);

        let method = sig(HttpMethod::Post, ResourceType::Documents, "dbs/db1/colls/col1", EPOCH);
        let resource = sig(HttpMethod::Get, ResourceType::Collections, "dbs/db1/colls/col1", EPOCH);
        let link_case = sig(HttpMethod::Get, ResourceType::Documents, "dbs/db1/colls/Col1", EPOCH);
        let date = sig(
            HttpMethod::Get,
            ResourceType::Documents,
            "dbs/db1/colls/col1",
            "Thu, 01 Jan 1970 00:00:01 GMT",
        );
        let other_key = sign(
            b"otherkey",
            HttpMethod::Get,
            ResourceType::Documents,
            "dbs/db1/colls/col1",
            EPOCH,
        );

        assert_eq!(method, "3rBECcxJhzhYGSKdFVZKmcHA9zD9NChyp6NVmTGGjVM=");
        assert_eq!(link_case, "1drxMqhb4/DQj9+WJOyVTpQXlUjXdAes3dTZjx5/VlY=");
        for other in [method, resource, link_case, date, other_key] {
            assert_ne!(base, other);
        }
    }

    #[test]
    fn test_date_case_does_not_change_signature() {
        let upper = sig(HttpMethod::Get, ResourceType::Documents, "dbs/db1/colls/col1", EPOCH);
        let lower = sig(
            HttpMethod::Get,
            ResourceType::Documents,
            "dbs/db1/colls/col1",
            &EPOCH.to_lowercase(),
        );
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_authorization_token_is_percent_encoded() {
        assert_eq!(
            authorization_token("OMgaSSxbRARSEQKrDLRP+xcOpfSy2iubLmWByF44lvg="),
            "type%3Dmaster%26ver%3D1.0%26sig%3DOMgaSSxbRARSEQKrDLRP%2BxcOpfSy2iubLmWByF44lvg%3D"
        );
    }

    #[test]
    fn test_authorize_at_sets_matching_date_and_token() {
        let mut req = HttpRequest::new(
            HttpMethod::Get,
            "https://localhost:8081/dbs/db1/colls/col1/docs",
        );
        key().authorize_at(
            &mut req,
            ResourceType::Documents,
            "dbs/db1/colls/col1",
            Utc.timestamp_opt(0, 0).unwrap(),
        );

        assert_eq!(req.header("x-ms-date"), Some(EPOCH));
        assert_eq!(
            req.header("authorization"),
            Some("type%3Dmaster%26ver%3D1.0%26sig%3DOMgaSSxbRARSEQKrDLRP%2BxcOpfSy2iubLmWByF44lvg%3D")
        );
    }

    #[test]
    fn test_authorize_signs_with_sent_date() {
        let mut req = HttpRequest::new(HttpMethod::Post, "https://localhost:8081/dbs");
        key().authorize(&mut req, ResourceType::Databases, "").unwrap();

        let date = req.header("x-ms-date").unwrap().to_string();
        let expected = authorization_token(&sign(
            key().as_bytes(),
            HttpMethod::Post,
            ResourceType::Databases,
            "",
            &date,
        ));
        assert_eq!(req.header("authorization"), Some(expected.as_str()));
    }

    #[test]
    fn test_empty_key_leaves_request_untouched() {
        let mut req = HttpRequest::new(HttpMethod::Get, "https://localhost:8081/dbs");
        MasterKey::default()
            .authorize(&mut req, ResourceType::Databases, "")
            .unwrap();

        assert!(req.headers.is_empty());
    }
}
