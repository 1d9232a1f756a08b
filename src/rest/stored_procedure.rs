//! Stored procedures.
//!
//! # Example
//!
//! ```rust,no_run
//! use docdb_rest::rest::CreateStoredProcedureRequest;
//! use serde_json::json;
//!
//! # async fn run(client: docdb_rest::Client) -> Result<(), docdb_rest::DocDbError> {
//! let orders = client.database("shop").collection("orders");
//! orders
//!     .create_stored_procedure(CreateStoredProcedureRequest::new(
//!         "greet",
//!         "function greet(name) { getContext().getResponse().setBody('hi ' + name); }",
//!     ))
//!     .await?;
//!
//! let result = orders
//!     .stored_procedure("greet")
//!     .execute(&json!(["ada"]), None)
//!     .await?;
//! let greeting: String = serde_json::from_slice(&result)?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::{
    Client, ClientRequest, ClientRequestBuilder, DocDbError, HttpMethod, HttpRequest,
    RequestOptions, ResourceType, ResponseMetadata, SharedOptions,
};
use crate::rest::collection::CollectionClient;
use crate::rest::resource::{typed, Resource, SystemProperties};
use crate::rest::{ResourcePath, ResourceResponse};

/// A JavaScript stored procedure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProcedureResource {
    pub id: String,
    #[serde(flatten)]
    pub system: SystemProperties,
    /// The JavaScript source.
    pub body: String,
}

impl Resource for StoredProcedureResource {
    const KEY: &'static str = "StoredProcedures";
    const TYPE: ResourceType = ResourceType::StoredProcedures;
}

/// Parameters for [`CollectionClient::create_stored_procedure`].
#[derive(Clone, Default, Serialize)]
pub struct CreateStoredProcedureRequest {
    pub id: String,
    pub body: String,
    #[serde(skip)]
    pub options: Option<SharedOptions>,
}

impl CreateStoredProcedureRequest {
    #[must_use]
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            options: None,
        }
    }

    /// Sets request options.
    #[must_use]
    pub fn options(mut self, options: SharedOptions) -> Self {
        self.options = Some(options);
        self
    }
}

impl fmt::Debug for CreateStoredProcedureRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateStoredProcedureRequest")
            .field("id", &self.id)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl RequestOptions for CreateStoredProcedureRequest {
    fn apply_options(&self, req: &mut HttpRequest) {
        if let Some(options) = &self.options {
            options.apply_options(req);
        }
    }
}

impl<'a> CollectionClient<'a> {
    fn sprocs_request(&self) -> ClientRequestBuilder {
        ClientRequest::builder(self.path.feed(ResourceType::StoredProcedures))
            .resource(ResourceType::StoredProcedures, self.path.link())
    }

    /// Creates a stored procedure.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`].
    pub async fn create_stored_procedure(
        &self,
        request: CreateStoredProcedureRequest,
    ) -> Result<ResourceResponse<StoredProcedureResource>, DocDbError> {
        let body = serde_json::to_vec(&request)?;
        let request = self.sprocs_request().options(request).body(body).build();
        self.client.create_or_replace_resource(request).await?.json()
    }

    /// Pages through the stored procedures of this collection as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_stored_procedures_raw<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        let request = self.sprocs_request().shared_options(options).build();
        self.client
            .list_resources(StoredProcedureResource::KEY, request, consumer)
            .await
    }

    /// Pages through the stored procedures of this collection.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_stored_procedures<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<StoredProcedureResource>, ResponseMetadata) -> Result<bool, DocDbError>
            + Send,
    {
        self.list_stored_procedures_raw(options, typed(consumer))
            .await
    }

    /// Returns a client scoped to one stored procedure of this collection.
    #[must_use]
    pub fn stored_procedure(&self, id: impl Into<String>) -> StoredProcedureClient<'a> {
        StoredProcedureClient {
            client: self.client,
            path: self.path.child(ResourceType::StoredProcedures, id),
        }
    }
}

/// Operations on a single stored procedure.
#[derive(Clone, Debug)]
pub struct StoredProcedureClient<'a> {
    client: &'a Client,
    path: ResourcePath,
}

impl StoredProcedureClient<'_> {
    #[must_use]
    pub fn id(&self) -> &str {
        self.path.id().unwrap_or_default()
    }

    #[must_use]
    pub const fn path(&self) -> &ResourcePath {
        &self.path
    }

    fn request(&self, options: Option<SharedOptions>) -> ClientRequestBuilder {
        ClientRequest::builder(self.path.path())
            .resource(ResourceType::StoredProcedures, self.path.link())
            .shared_options(options)
    }

    /// Replaces the source of the stored procedure.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`].
    pub async fn replace(
        &self,
        body: impl Into<String>,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<StoredProcedureResource>, DocDbError> {
        let body = serde_json::to_vec(&StoredProcedureResource {
            id: self.id().to_string(),
            body: body.into(),
            ..Default::default()
        })?;
        let request = self
            .request(options)
            .method(HttpMethod::Put)
            .body(body)
            .build();
        self.client.create_or_replace_resource(request).await?.json()
    }

    /// Executes the stored procedure and returns its raw result.
    ///
    /// `args` is sent as the JSON argument array, so it should serialize to
    /// an array: a slice, a tuple or a `json!([..])` value.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`].
    pub async fn execute<A: Serialize + ?Sized>(
        &self,
        args: &A,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        let body = serde_json::to_vec(args)?;
        let request = self
            .request(options)
            .method(HttpMethod::Post)
            .body(body)
            .build();
        self.client.create_or_replace_resource(request).await
    }

    /// Deletes the stored procedure.
    ///
    /// # Errors
    ///
    /// See [`Client::delete_resource`].
    pub async fn delete(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<bool>, DocDbError> {
        self.client
            .delete_resource(self.request(options).build())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_body_omits_options() {
        let request = CreateStoredProcedureRequest::new("sp", "function () {}").options(
            std::sync::Arc::new(crate::clients::CommonRequestOptions::default()),
        );
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"id": "sp", "body": "function () {}"})
        );
    }

    #[test]
    fn test_replace_body_has_no_system_properties() {
        let body = serde_json::to_value(StoredProcedureResource {
            id: "sp".to_string(),
            body: "function () {}".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, json!({"id": "sp", "body": "function () {}"}));
    }

    #[test]
    fn test_deserialize_stored_procedure() {
        let sproc: StoredProcedureResource = serde_json::from_value(json!({
            "id": "sp",
            "body": "function () {}",
            "_rid": "Zuk=AA==AQ==",
            "_etag": "\"0f00\"",
        }))
        .unwrap();
        assert_eq!(sproc.system.resource_id, "Zuk=AA==AQ==");
        assert_eq!(sproc.system.etag, "\"0f00\"");
    }
}
