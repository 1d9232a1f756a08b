//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around the account endpoint, the
//! account master key and the connection string that carries both. Invalid
//! values are rejected with clear error messages.

use crate::error::ConfigError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::str::FromStr;

/// A validated account endpoint.
///
/// The endpoint must be an absolute `http` or `https` URL with a non-empty
/// host. Trailing slashes are dropped so request paths can be joined onto
/// it without producing `//`.
///
/// # Example
///
/// ```rust
/// use docdb_rest::Endpoint;
///
/// let endpoint = Endpoint::new("https://account.documents.azure.com:443/").unwrap();
/// assert_eq!(endpoint.scheme(), "https");
/// assert_eq!(endpoint.host_name(), "account.documents.azure.com");
/// assert_eq!(endpoint.as_ref(), "https://account.documents.azure.com:443");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
}

impl Endpoint {
    /// Creates a new validated endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the URL is not an absolute
    /// `http`/`https` URL with a host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into();
        let url = raw.trim().trim_end_matches('/').to_string();
        let invalid = || ConfigError::InvalidEndpoint {
            endpoint: raw.clone(),
        };

        let scheme_end = url.find("://").ok_or_else(invalid)?;
        let scheme = url[..scheme_end].to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);

        if host_end == host_start {
            return Err(invalid());
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
        })
    }

    /// Returns the URL scheme (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the endpoint.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }

    /// Joins a resource path onto the endpoint.
    ///
    /// Leading slashes on `path` are ignored, so `"dbs"` and `"/dbs"` produce
    /// the same URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// The shared account key used to sign requests.
///
/// The key is held as raw bytes, decoded once from its base64 form. An empty
/// key is valid and disables signing entirely, which lets a client run
/// against an endpoint that is authorized some other way.
///
/// # Security
///
/// The `Debug` implementation masks the key, displaying only
/// `MasterKey(*****)`.
///
/// # Example
///
/// ```rust
/// use docdb_rest::MasterKey;
///
/// let key = MasterKey::parse("dGVzdGtleQ==").unwrap();
/// assert_eq!(key.as_bytes(), b"testkey");
/// assert_eq!(format!("{:?}", key), "MasterKey(*****)");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MasterKey(Vec<u8>);

impl MasterKey {
    /// Decodes a base64 encoded account key.
    ///
    /// An empty string yields an empty key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMasterKey`] if `key` is not valid base64.
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        STANDARD
            .decode(key.trim())
            .map(Self)
            .map_err(|e| ConfigError::InvalidMasterKey {
                reason: e.to_string(),
            })
    }

    /// Wraps already-decoded key bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns `true` if no key material is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(*****)")
    }
}

impl FromStr for MasterKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A parsed account connection string.
///
/// The accepted format is a `;` separated list of `Key=Value` pairs:
///
/// ```text
/// AccountEndpoint=https://accountname.documents.azure.com:443/;AccountKey=BASE64KEY;
/// ```
///
/// Pairs may appear in any order and unknown keys are ignored. The endpoint
/// is required; a missing `AccountKey` produces an empty key.
///
/// # Example
///
/// ```rust
/// use docdb_rest::ConnectionString;
///
/// let cs = ConnectionString::parse(
///     "AccountEndpoint=https://localhost:8081/;AccountKey=dGVzdGtleQ==;",
/// ).unwrap();
/// assert_eq!(cs.endpoint().as_ref(), "https://localhost:8081");
/// assert_eq!(cs.account_key().as_bytes(), b"testkey");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionString {
    endpoint: Endpoint,
    account_key: MasterKey,
}

impl ConnectionString {
    /// Parses a connection string.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidConnectionString`] if a segment is not a
    ///   `Key=Value` pair
    /// - [`ConfigError::MissingRequiredField`] if `AccountEndpoint` is absent
    /// - [`ConfigError::InvalidEndpoint`] / [`ConfigError::InvalidMasterKey`]
    ///   if a value fails validation
    pub fn parse(connection_string: &str) -> Result<Self, ConfigError> {
        let mut endpoint = None;
        let mut account_key = MasterKey::default();

        for segment in connection_string.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            // Split on the first '=' only; base64 padding contains '=' too.
            let (key, value) =
                segment
                    .split_once('=')
                    .ok_or_else(|| ConfigError::InvalidConnectionString {
                        segment: segment.to_string(),
                    })?;

            match key.trim() {
                "AccountEndpoint" => endpoint = Some(Endpoint::new(value)?),
                "AccountKey" => account_key = MasterKey::parse(value)?,
                _ => {}
            }
        }

        let endpoint = endpoint.ok_or(ConfigError::MissingRequiredField {
            field: "AccountEndpoint",
        })?;

        Ok(Self {
            endpoint,
            account_key,
        })
    }

    /// Returns the account endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the account key.
    #[must_use]
    pub const fn account_key(&self) -> &MasterKey {
        &self.account_key
    }

    /// Splits the connection string into its endpoint and key.
    #[must_use]
    pub fn into_parts(self) -> (Endpoint, MasterKey) {
        (self.endpoint, self.account_key)
    }
}

impl FromStr for ConnectionString {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMULATOR_KEY: &str =
        "C2y6yDjf5/R+ob0N8A7Cgv30VRDJIWEHLM+4QDU5DE2nQ9nDuVTqobD4b8mGGyPMbIZnqyMsEcaGQy67XIw/Jw==";

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let endpoint = Endpoint::new("https://localhost:8081/").unwrap();
        assert_eq!(endpoint.as_ref(), "https://localhost:8081");
        assert_eq!(endpoint.host_name(), "localhost");
    }

    #[test]
    fn test_endpoint_join_ignores_leading_slash() {
        let endpoint = Endpoint::new("https://localhost:8081/").unwrap();
        assert_eq!(endpoint.join("dbs"), "https://localhost:8081/dbs");
        assert_eq!(
            endpoint.join("/dbs/db1/colls"),
            "https://localhost:8081/dbs/db1/colls"
        );
    }

    #[test]
    fn test_endpoint_rejects_invalid_urls() {
        assert!(Endpoint::new("").is_err());
        assert!(Endpoint::new("localhost:8081").is_err());
        assert!(Endpoint::new("ftp://localhost").is_err());
        assert!(Endpoint::new("https://").is_err());
        assert!(Endpoint::new("https://:443").is_err());
    }

    #[test]
    fn test_master_key_decodes_base64() {
        let key = MasterKey::parse("dGVzdGtleQ==").unwrap();
        assert_eq!(key.as_bytes(), b"testkey");
        assert!(!key.is_empty());
    }

    #[test]
    fn test_master_key_empty_string_is_empty_key() {
        let key = MasterKey::parse("").unwrap();
        assert!(key.is_empty());
    }

    #[test]
    fn test_master_key_rejects_invalid_base64() {
        let result = MasterKey::parse("not base64!");
        assert!(matches!(result, Err(ConfigError::InvalidMasterKey { .. })));
    }

    #[test]
    fn test_master_key_masks_value_in_debug() {
        let key = MasterKey::from_bytes(b"super-secret".to_vec());
        let debug_output = format!("{key:?}");
        assert_eq!(debug_output, "MasterKey(*****)");
        assert!(!debug_output.contains("super-secret"));
    }

    #[test]
    fn test_connection_string_parses_both_fields() {
        let cs = ConnectionString::parse(&format!(
            "AccountEndpoint=https://localhost:8081/;AccountKey={EMULATOR_KEY}"
        ))
        .unwrap();

        assert_eq!(cs.endpoint().as_ref(), "https://localhost:8081");
        assert_eq!(cs.account_key(), &MasterKey::parse(EMULATOR_KEY).unwrap());
    }

    #[test]
    fn test_connection_string_is_order_independent() {
        let cs: ConnectionString =
            format!("AccountKey={EMULATOR_KEY};;AccountEndpoint=https://localhost:8081/;")
                .parse()
                .unwrap();
        assert_eq!(cs.endpoint().host_name(), "localhost");
        assert!(!cs.account_key().is_empty());
    }

    #[test]
    fn test_connection_string_ignores_unknown_keys() {
        let cs = ConnectionString::parse(
            "Database=ignored;AccountEndpoint=https://localhost:8081/;",
        )
        .unwrap();
        assert!(cs.account_key().is_empty());
    }

    #[test]
    fn test_connection_string_requires_endpoint() {
        let result = ConnectionString::parse("AccountKey=dGVzdGtleQ==;");
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "AccountEndpoint"
            })
        ));
    }

    #[test]
    fn test_connection_string_rejects_segment_without_value() {
        let result = ConnectionString::parse("AccountEndpoint");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConnectionString { .. })
        ));
    }
}
