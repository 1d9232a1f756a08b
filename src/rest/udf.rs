//! User-defined functions, callable from queries as `udf.<id>(...)`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::{
    Client, ClientRequest, ClientRequestBuilder, DocDbError, HttpMethod, HttpRequest,
    RequestOptions, ResourceType, ResponseMetadata, SharedOptions,
};
use crate::rest::collection::CollectionClient;
use crate::rest::resource::{typed, Resource, SystemProperties};
use crate::rest::{ResourcePath, ResourceResponse};

/// A JavaScript user-defined function.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDefinedFunctionResource {
    pub id: String,
    #[serde(flatten)]
    pub system: SystemProperties,
    /// The JavaScript source.
    pub body: String,
}

impl Resource for UserDefinedFunctionResource {
    const KEY: &'static str = "UserDefinedFunctions";
    const TYPE: ResourceType = ResourceType::UserDefinedFunctions;
}

/// Parameters for [`CollectionClient::create_udf`].
#[derive(Clone, Default, Serialize)]
pub struct CreateUdfRequest {
    pub id: String,
    pub body: String,
    #[serde(skip)]
    pub options: Option<SharedOptions>,
}

impl CreateUdfRequest {
    #[must_use]
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            options: None,
        }
    }

    #[must_use]
    pub fn options(mut self, options: SharedOptions) -> Self {
        self.options = Some(options);
        self
    }
}

impl fmt::Debug for CreateUdfRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUdfRequest")
            .field("id", &self.id)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl RequestOptions for CreateUdfRequest {
    fn apply_options(&self, req: &mut HttpRequest) {
        if let Some(options) = &self.options {
            options.apply_options(req);
        }
    }
}

impl<'a> CollectionClient<'a> {
    fn udfs_request(&self) -> ClientRequestBuilder {
        ClientRequest::builder(self.path.feed(ResourceType::UserDefinedFunctions))
            .resource(ResourceType::UserDefinedFunctions, self.path.link())
    }

    /// Creates a user-defined function.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`].
    pub async fn create_udf(
        &self,
        request: CreateUdfRequest,
    ) -> Result<ResourceResponse<UserDefinedFunctionResource>, DocDbError> {
        let body = serde_json::to_vec(&request)?;
        let request = self.udfs_request().options(request).body(body).build();
        self.client.create_or_replace_resource(request).await?.json()
    }

    /// Pages through the user-defined functions of this collection as raw
    /// JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_udfs_raw<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        let request = self.udfs_request().shared_options(options).build();
        self.client
            .list_resources(UserDefinedFunctionResource::KEY, request, consumer)
            .await
    }

    /// Pages through the user-defined functions of this collection.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_udfs<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<UserDefinedFunctionResource>, ResponseMetadata) -> Result<bool, DocDbError>
            + Send,
    {
        self.list_udfs_raw(options, typed(consumer)).await
    }

    /// Returns a client scoped to one user-defined function.
    #[must_use]
    pub fn udf(&self, id: impl Into<String>) -> UdfClient<'a> {
        UdfClient {
            client: self.client,
            path: self.path.child(ResourceType::UserDefinedFunctions, id),
        }
    }
}

/// Operations on a single user-defined function.
#[derive(Clone, Debug)]
pub struct UdfClient<'a> {
    client: &'a Client,
    path: ResourcePath,
}

impl UdfClient<'_> {
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
            .resource(ResourceType::UserDefinedFunctions, self.path.link())
            .shared_options(options)
    }

    /// Replaces the source of the function.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`].
    pub async fn replace(
        &self,
        body: impl Into<String>,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<UserDefinedFunctionResource>, DocDbError> {
        let body = serde_json::to_vec(&UserDefinedFunctionResource {
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

    /// Deletes the function.
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
    fn test_create_body() {
        let request = CreateUdfRequest::new("tax", "function tax(x) { return x * 0.2; }");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"id": "tax", "body": "function tax(x) { return x * 0.2; }"})
        );
    }

    #[test]
    fn test_deserialize_udf_list_item() {
        let items = vec![json!({"id": "tax", "body": "function () {}", "_ts": 5})];
        let udfs: Vec<UserDefinedFunctionResource> =
            crate::rest::decode_items(items).unwrap();
        assert_eq!(udfs[0].id, "tax");
        assert_eq!(udfs[0].system.timestamp, 5);
    }
}
