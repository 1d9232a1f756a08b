//! # docdb-rest
//!
//! A typed async client for the REST API of a Cosmos DB style document
//! database.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`],
//!   or straight from a connection string
//! - Master key request signing (HMAC-SHA256) via [`MasterKey`]
//! - A request core that builds, signs and sends requests and maps
//!   optimistic-concurrency failures to [`DocDbError`] variants
//! - Continuation-token pagination with caller-controlled early stop
//! - Typed wrappers for databases, collections, documents, stored
//!   procedures, user-defined functions and offers in [`rest`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docdb_rest::rest::CreateDocumentRequest;
//! use docdb_rest::Client;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), docdb_rest::DocDbError> {
//! let client = Client::from_connection_string(
//!     "AccountEndpoint=https://myaccount.documents.azure.com:443/;AccountKey=dGVzdGtleQ==;",
//! )?;
//!
//! let people = client.database("db1").collection("people");
//! let doc = json!({"id": "ada", "name": "Ada"});
//! people.create_document(CreateDocumentRequest::new(&doc)).await?;
//!
//! people
//!     .list_documents(None, |page: Vec<serde_json::Value>, meta| {
//!         println!("{} documents, {:?} RU", page.len(), meta.request_charge);
//!         Ok(true)
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use docdb_rest::{ApiVersion, ClientConfig, Endpoint, MasterKey};
//!
//! let config = ClientConfig::builder()
//!     .endpoint(Endpoint::new("https://localhost:8081/").unwrap())
//!     .master_key(MasterKey::parse("dGVzdGtleQ==").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .max_tries(3)
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Optimistic Concurrency
//!
//! ```rust,no_run
//! use docdb_rest::rest::ReplaceDocumentRequest;
//! use docdb_rest::DocDbError;
//! use serde_json::Value;
//!
//! # async fn run(client: docdb_rest::Client) -> Result<(), DocDbError> {
//! let doc = client.database("db1").collection("people").document("ada");
//! let current = doc.get::<Value>(None).await?;
//! let etag = current.etag().unwrap_or_default().to_string();
//!
//! let mut updated = current.into_inner();
//! updated["name"] = "Ada Lovelace".into();
//! match doc.replace(ReplaceDocumentRequest::new(&updated).etag(etag)).await {
//!     Ok(_) => {}
//!     Err(DocDbError::PreconditionFailed) => println!("changed by someone else"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **Errors are returned, never logged and dropped**

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use auth::Authorizer;
pub use config::{
    ApiVersion, ClientConfig, ClientConfigBuilder, ConnectionString, Endpoint, MasterKey,
    DEFAULT_USER_AGENT,
};
pub use error::ConfigError;

// Re-export the request core
pub use clients::{
    Client, ClientRequest, DocDbError, HttpMethod, HttpResponseError, InvalidHttpRequestError,
    Query, RequestOptions, ResourceType, ResponseMetadata,
};
pub use rest::ResourceResponse;
