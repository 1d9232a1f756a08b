//! Databases.
//!
//! Account-level operations live on [`Client`]; operations on one database
//! go through the [`DatabaseClient`] returned by [`Client::database`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::{
    Client, ClientRequest, DocDbError, ResourceType, ResponseMetadata, SharedOptions,
};
use crate::rest::resource::{typed, Resource, SystemProperties};
use crate::rest::{ResourcePath, ResourceResponse};

/// A database.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseResource {
    /// The unique, user-chosen name of the database.
    pub id: String,
    /// Server-generated properties.
    #[serde(flatten)]
    pub system: SystemProperties,
    /// Addressable path of the collections feed.
    #[serde(rename = "_colls", default, skip_serializing_if = "String::is_empty")]
    pub collections: String,
    /// Addressable path of the users feed.
    #[serde(rename = "_users", default, skip_serializing_if = "String::is_empty")]
    pub users: String,
}

impl Resource for DatabaseResource {
    const KEY: &'static str = "Databases";
    const TYPE: ResourceType = ResourceType::Databases;
}

impl Client {
    /// Creates a database and returns the raw response body.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`].
    pub async fn create_database_raw(
        &self,
        id: &str,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        let body = serde_json::to_vec(&DatabaseResource {
            id: id.to_string(),
            ..Default::default()
        })?;
        let request = ClientRequest::builder(ResourcePath::root().feed(ResourceType::Databases))
            .resource(ResourceType::Databases, "")
            .shared_options(options)
            .body(body)
            .build();
        self.create_or_replace_resource(request).await
    }

    /// Creates a database.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`]; also fails if the
    /// response is not a database.
    pub async fn create_database(
        &self,
        id: &str,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<DatabaseResource>, DocDbError> {
        self.create_database_raw(id, options).await?.json()
    }

    /// Pages through the databases of the account as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_databases_raw<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        let request = ClientRequest::builder(ResourcePath::root().feed(ResourceType::Databases))
            .resource(ResourceType::Databases, "")
            .shared_options(options)
            .build();
        self.list_resources(DatabaseResource::KEY, request, consumer)
            .await
    }

    /// Pages through the databases of the account.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`]; also fails if an item is not a
    /// database.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn run(client: docdb_rest::Client) -> Result<(), docdb_rest::DocDbError> {
    /// let mut ids = Vec::new();
    /// client
    ///     .list_databases(None, |page, _meta| {
    ///         ids.extend(page.into_iter().map(|db| db.id));
    ///         Ok(true)
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_databases<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<DatabaseResource>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        self.list_databases_raw(options, typed(consumer)).await
    }

    /// Returns a client scoped to one database.
    #[must_use]
    pub fn database(&self, id: impl Into<String>) -> DatabaseClient<'_> {
        DatabaseClient {
            client: self,
            path: ResourcePath::root().child(ResourceType::Databases, id),
        }
    }
}

/// Operations on a single database.
#[derive(Clone, Debug)]
pub struct DatabaseClient<'a> {
    pub(crate) client: &'a Client,
    pub(crate) path: ResourcePath,
}

impl<'a> DatabaseClient<'a> {
    /// Returns the database id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.path.id().unwrap_or_default()
    }

    /// Returns the resource path of the database.
    #[must_use]
    pub const fn path(&self) -> &ResourcePath {
        &self.path
    }

    fn request(&self, options: Option<SharedOptions>) -> ClientRequest {
        ClientRequest::builder(self.path.path())
            .resource(ResourceType::Databases, self.path.link())
            .shared_options(options)
            .build()
    }

    /// Reads the database as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::get_resource`].
    pub async fn get_raw(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        self.client.get_resource(self.request(options)).await
    }

    /// Reads the database.
    ///
    /// # Errors
    ///
    /// See [`Client::get_resource`].
    pub async fn get(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<DatabaseResource>, DocDbError> {
        self.get_raw(options).await?.json()
    }

    /// Deletes the database and everything in it.
    ///
    /// # Errors
    ///
    /// See [`Client::delete_resource`].
    pub async fn delete(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<bool>, DocDbError> {
        self.client.delete_resource(self.request(options)).await
    }
}
