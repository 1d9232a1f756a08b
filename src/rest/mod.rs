//! Typed resource wrappers over the request core.
//!
//! Resources are reached through scoped clients that mirror the resource
//! hierarchy:
//!
//! ```text
//! Client
//! ├── database(id)            DatabaseClient
//! │   └── collection(id)      CollectionClient
//! │       ├── document(id)    DocumentClient
//! │       ├── stored_procedure(id)  StoredProcedureClient
//! │       └── udf(id)         UdfClient
//! └── offer(rid)              OfferClient
//! ```
//!
//! Scoped clients only hold the [`ResourcePath`] of their resource, so
//! creating one never touches the network.
//!
//! Each read comes in two forms: `*_raw` returns the response body
//! untouched, the plain form decodes it into the resource type. Every
//! result carries the [`ResponseMetadata`](crate::clients::ResponseMetadata)
//! of its response.
//!
//! # Example
//!
//! ```rust,no_run
//! use docdb_rest::rest::CreateCollectionRequest;
//! use docdb_rest::Client;
//!
//! # async fn run(client: Client) -> Result<(), docdb_rest::DocDbError> {
//! client.create_database("shop", None).await?;
//!
//! let shop = client.database("shop");
//! let mut request = CreateCollectionRequest::new("orders");
//! request.offer_throughput = Some(400);
//! let created = shop.create_collection(request).await?;
//! println!("created {} ({} RU)", created.id, created.metadata.request_charge.unwrap_or(0.0));
//!
//! let orders = shop.collection("orders").get(None).await?;
//! assert_eq!(orders.id, "orders");
//! # Ok(())
//! # }
//! ```

mod collection;
mod database;
mod document;
mod offer;
mod path;
mod resource;
mod response;
mod stored_procedure;
mod udf;

pub use collection::{
    CollectionClient, CollectionResource, CreateCollectionRequest, DataType, ExcludedPath,
    IncludedPath, Index, IndexKind, IndexingMode, IndexingPolicy, PartitionKeyDefinition,
};
pub use database::{DatabaseClient, DatabaseResource};
pub use document::{
    CreateDocumentRequest, DocumentClient, IndexingDirective, ReplaceDocumentRequest,
    DOCUMENTS_KEY,
};
pub use offer::{OfferClient, OfferContent, OfferResource, OfferType, OfferVersion};
pub use path::ResourcePath;
pub use resource::{decode_items, JsonContent, Resource, SystemProperties};
pub use response::ResourceResponse;
pub use stored_procedure::{
    CreateStoredProcedureRequest, StoredProcedureClient, StoredProcedureResource,
};
pub use udf::{CreateUdfRequest, UdfClient, UserDefinedFunctionResource};
