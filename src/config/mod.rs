//! Configuration types for the document database client.
//!
//! This module provides the immutable configuration shared by every request a
//! [`Client`](crate::Client) issues.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: The configuration struct holding all client settings
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`Endpoint`]: A validated account endpoint URL
//! - [`MasterKey`]: The account key with masked debug output
//! - [`ConnectionString`]: A parsed `AccountEndpoint=...;AccountKey=...;` string
//! - [`ApiVersion`]: The REST API version to use
//!
//! # Example
//!
//! ```rust
//! use docdb_rest::{ClientConfig, Endpoint, MasterKey, ApiVersion};
//!
//! let config = ClientConfig::builder()
//!     .endpoint(Endpoint::new("https://localhost:8081/").unwrap())
//!     .master_key(MasterKey::parse("dGVzdGtleQ==").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;
mod version;

pub use newtypes::{ConnectionString, Endpoint, MasterKey};
pub use version::ApiVersion;

use crate::error::ConfigError;

/// Default `User-Agent` sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("docdb-rest/", env!("CARGO_PKG_VERSION"));

/// Configuration for a document database client.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`; it is read-only after
/// construction.
///
/// # Example
///
/// ```rust
/// use docdb_rest::ClientConfig;
///
/// let config = ClientConfig::from_connection_string(
///     "AccountEndpoint=https://localhost:8081/;AccountKey=dGVzdGtleQ==;",
/// )
/// .unwrap();
///
/// assert_eq!(config.endpoint().host_name(), "localhost");
/// assert_eq!(config.max_tries(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ClientConfig {
    endpoint: Endpoint,
    master_key: MasterKey,
    api_version: ApiVersion,
    user_agent: Option<String>,
    max_tries: u32,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Builds a configuration from a connection string, using defaults for
    /// everything the connection string does not carry.
    ///
    /// # Errors
    ///
    /// Returns any error produced by [`ConnectionString::parse`].
    pub fn from_connection_string(connection_string: &str) -> Result<Self, ConfigError> {
        let (endpoint, master_key) = ConnectionString::parse(connection_string)?.into_parts();
        Self::builder()
            .endpoint(endpoint)
            .master_key(master_key)
            .build()
    }

    /// Returns the account endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the master key. May be empty.
    #[must_use]
    pub const fn master_key(&self) -> &MasterKey {
        &self.master_key
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the user agent sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Returns how many times a throttled (429) request is attempted.
    #[must_use]
    pub const fn max_tries(&self) -> u32 {
        self.max_tries
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// `endpoint` is the only required field.
///
/// # Defaults
///
/// - `master_key`: empty (requests are sent unsigned)
/// - `api_version`: [`ApiVersion::latest`]
/// - `user_agent`: [`DEFAULT_USER_AGENT`]
/// - `max_tries`: `1`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    endpoint: Option<Endpoint>,
    master_key: Option<MasterKey>,
    api_version: Option<ApiVersion>,
    user_agent: Option<String>,
    max_tries: Option<u32>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the account endpoint (required).
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the master key used for signing.
    #[must_use]
    pub fn master_key(mut self, key: MasterKey) -> Self {
        self.master_key = Some(key);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the user agent for HTTP requests.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets how many times a throttled request is attempted. Values below 1
    /// are treated as 1.
    #[must_use]
    pub const fn max_tries(mut self, tries: u32) -> Self {
        self.max_tries = Some(tries);
        self
    }

    /// Builds the [`ClientConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `endpoint` is not set.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let endpoint = self
            .endpoint
            .ok_or(ConfigError::MissingRequiredField { field: "endpoint" })?;

        Ok(ClientConfig {
            endpoint,
            master_key: self.master_key.unwrap_or_default(),
            api_version: self.api_version.unwrap_or_default(),
            user_agent: self.user_agent.filter(|ua| !ua.is_empty()),
            max_tries: self.max_tries.unwrap_or(1).max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new("https://localhost:8081/").unwrap()
    }

    #[test]
    fn test_builder_requires_endpoint() {
        let result = ClientConfigBuilder::new().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "endpoint" })
        ));
    }

    #[test]
    fn test_builder_applies_defaults() {
        let config = ClientConfig::builder().endpoint(endpoint()).build().unwrap();

        assert!(config.master_key().is_empty());
        assert_eq!(config.api_version(), &ApiVersion::V2017_02_22);
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert!(config.user_agent().starts_with("docdb-rest/"));
        assert_eq!(config.max_tries(), 1);
    }

    #[test]
    fn test_builder_with_all_fields() {
        let config = ClientConfig::builder()
            .endpoint(endpoint())
            .master_key(MasterKey::parse("dGVzdGtleQ==").unwrap())
            .api_version(ApiVersion::V2018_12_31)
            .user_agent("Test/1.0")
            .max_tries(3)
            .build()
            .unwrap();

        assert_eq!(config.master_key().as_bytes(), b"testkey");
        assert_eq!(config.api_version(), &ApiVersion::V2018_12_31);
        assert_eq!(config.user_agent(), "Test/1.0");
        assert_eq!(config.max_tries(), 3);
    }

    #[test]
    fn test_empty_user_agent_falls_back_to_default() {
        let config = ClientConfig::builder()
            .endpoint(endpoint())
            .user_agent("")
            .max_tries(0)
            .build()
            .unwrap();

        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(config.max_tries(), 1);
    }

    #[test]
    fn test_from_connection_string() {
        let config = ClientConfig::from_connection_string(
            "AccountEndpoint=https://localhost:8081/;AccountKey=dGVzdGtleQ==;",
        )
        .unwrap();

        assert_eq!(config.endpoint().as_ref(), "https://localhost:8081");
        assert_eq!(config.master_key().as_bytes(), b"testkey");
    }

    #[test]
    fn test_config_is_clone() {
        let config = ClientConfig::builder().endpoint(endpoint()).build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned.endpoint(), config.endpoint());
    }
}
