//! Offers: the throughput provisioned for a collection.
//!
//! Offers are addressed by their resource id (`_rid`). Their resource link
//! is the lower-cased resource id rather than a `offers/{id}` path.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::{
    Client, ClientRequest, DocDbError, HttpMethod, InvalidHttpRequestError, Query, ResourceType,
    ResponseMetadata, SharedOptions,
};
use crate::rest::resource::{typed, Resource, SystemProperties};
use crate::rest::{ResourcePath, ResourceResponse};

/// The schema version of an offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferVersion {
    /// Pre-defined performance levels, see [`OfferType`].
    V1,
    /// User-defined throughput, see [`OfferContent`].
    V2,
}

/// Pre-defined performance level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferType {
    /// Used by V2 offers, whose throughput is user-defined.
    Invalid,
    S1,
    S2,
    S3,
    /// A level this client does not know about.
    #[serde(other)]
    Unknown,
}

impl OfferType {
    /// Returns the wire name of the level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-defined throughput of a V2 offer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferContent {
    /// Request units per second.
    #[serde(rename = "offerThroughput")]
    pub offer_throughput: u32,
    /// Whether per-minute request units are enabled.
    #[serde(
        rename = "offerIsRUPerMinuteThroughputEnabled",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ru_per_minute_enabled: Option<bool>,
}

/// A performance-level offer attached to a collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferResource {
    #[serde(default)]
    pub id: String,
    /// Server-generated properties. `system.resource_id` addresses the offer.
    #[serde(flatten)]
    pub system: SystemProperties,
    #[serde(rename = "offerVersion", default, skip_serializing_if = "Option::is_none")]
    pub offer_version: Option<OfferVersion>,
    #[serde(rename = "offerType", default, skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<OfferType>,
    /// Only present on V2 offers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<OfferContent>,
    /// Self link of the collection the offer applies to.
    #[serde(default)]
    pub resource: String,
    /// Resource id of the collection the offer applies to.
    #[serde(rename = "offerResourceId", default)]
    pub offer_resource_id: String,
}

impl Resource for OfferResource {
    const KEY: &'static str = "Offers";
    const TYPE: ResourceType = ResourceType::Offers;
}

fn offers_request(options: Option<SharedOptions>) -> ClientRequest {
    ClientRequest::builder(ResourcePath::root().feed(ResourceType::Offers))
        .resource(ResourceType::Offers, "")
        .shared_options(options)
        .build()
}

impl Client {
    /// Pages through the offers of the account as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_offers_raw<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        self.list_resources(OfferResource::KEY, offers_request(options), consumer)
            .await
    }

    /// Pages through the offers of the account.
    ///
    /// # Errors
    ///
    /// See [`Client::list_resources`].
    pub async fn list_offers<F>(
        &self,
        options: Option<SharedOptions>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<OfferResource>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        self.list_offers_raw(options, typed(consumer)).await
    }

    /// Runs a query over the offers of the account, passing raw JSON pages
    /// to `consumer`.
    ///
    /// # Errors
    ///
    /// [`InvalidHttpRequestError::MissingQuery`] when `query` is `None`;
    /// otherwise see [`Client::list_resources`].
    pub async fn query_offers_raw<F>(
        &self,
        query: Option<Query>,
        consumer: F,
    ) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<Value>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        let query = query.ok_or(InvalidHttpRequestError::MissingQuery)?;
        let body = serde_json::to_vec(&query)?;
        let request = ClientRequest::builder(ResourcePath::root().feed(ResourceType::Offers))
            .resource(ResourceType::Offers, "")
            .method(HttpMethod::Post)
            .options(query)
            .body(body)
            .build();
        self.list_resources(OfferResource::KEY, request, consumer)
            .await
    }

    /// Runs a query over the offers of the account.
    ///
    /// # Errors
    ///
    /// See [`Client::query_offers_raw`].
    pub async fn query_offers<F>(&self, query: Option<Query>, consumer: F) -> Result<(), DocDbError>
    where
        F: FnMut(Vec<OfferResource>, ResponseMetadata) -> Result<bool, DocDbError> + Send,
    {
        self.query_offers_raw(query, typed(consumer)).await
    }

    /// Returns a client scoped to the offer with resource id `id`.
    #[must_use]
    pub fn offer(&self, id: impl Into<String>) -> OfferClient<'_> {
        OfferClient {
            client: self,
            id: id.into(),
        }
    }

    /// Replaces an offer, typically to change its throughput.
    ///
    /// The offer is addressed by `offer.system.resource_id`.
    ///
    /// # Errors
    ///
    /// See [`Client::create_or_replace_resource`].
    pub async fn replace_offer(
        &self,
        offer: &OfferResource,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<OfferResource>, DocDbError> {
        let body = serde_json::to_vec(offer)?;
        let request = self
            .offer(offer.system.resource_id.clone())
            .request(options)
            .method(HttpMethod::Put)
            .body(body)
            .build();
        self.create_or_replace_resource(request).await?.json()
    }
}

/// Operations on a single offer.
#[derive(Clone, Debug)]
pub struct OfferClient<'a> {
    client: &'a Client,
    id: String,
}

impl OfferClient<'_> {
    /// Returns the offer resource id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the resource link used to sign offer requests.
    #[must_use]
    pub fn resource_link(&self) -> String {
        self.id.to_lowercase()
    }

    fn request(&self, options: Option<SharedOptions>) -> crate::clients::ClientRequestBuilder {
        ClientRequest::builder(ResourcePath::root().child(ResourceType::Offers, &*self.id).path())
            .resource(ResourceType::Offers, self.resource_link())
            .shared_options(options)
    }

    /// Reads the offer as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::get_resource`].
    pub async fn get_raw(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<Bytes>, DocDbError> {
        self.client.get_resource(self.request(options).build()).await
    }

    /// Reads the offer.
    ///
    /// # Errors
    ///
    /// See [`Client::get_resource`].
    pub async fn get(
        &self,
        options: Option<SharedOptions>,
    ) -> Result<ResourceResponse<OfferResource>, DocDbError> {
        self.get_raw(options).await?.json()
    }
}
