//! Resource path building.
//!
//! Every resource has two names:
//!
//! - the **URL path**, with each id percent-escaped, used to address it
//! - the **resource link**, with raw ids, used to sign requests
//!
//! The two must be built independently: the signature is computed over the
//! exact, case-sensitive ids the server stores, not over their URL form.
//!
//! # Example
//!
//! ```rust
//! use docdb_rest::clients::ResourceType;
//! use docdb_rest::rest::ResourcePath;
//!
//! let coll = ResourcePath::root()
//!     .child(ResourceType::Databases, "my db")
//!     .child(ResourceType::Collections, "Orders");
//!
//! assert_eq!(coll.link(), "dbs/my db/colls/Orders");
//! assert_eq!(coll.path(), "dbs/my%20db/colls/Orders");
//! assert_eq!(coll.feed(ResourceType::Documents), "dbs/my%20db/colls/Orders/docs");
//! ```

use std::fmt;

use crate::clients::ResourceType;

/// A hierarchical resource address such as `dbs/{db}/colls/{coll}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    segments: Vec<(ResourceType, String)>,
}

impl ResourcePath {
    /// The account root. Its link and path are empty.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Returns the path of a child resource.
    #[must_use]
    pub fn child(&self, resource_type: ResourceType, id: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push((resource_type, id.into()));
        Self { segments }
    }

    /// Returns the id of the last segment, or `None` for the root.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.segments.last().map(|(_, id)| id.as_str())
    }

    /// Returns the raw resource link used for signing.
    #[must_use]
    pub fn link(&self) -> String {
        self.join(|id| id.to_string())
    }

    /// Returns the percent-escaped URL path, without a leading `/`.
    #[must_use]
    pub fn path(&self) -> String {
        self.join(|id| urlencoding::encode(id).into_owned())
    }

    /// Returns the URL path of a feed of child resources.
    #[must_use]
    pub fn feed(&self, resource_type: ResourceType) -> String {
        if self.segments.is_empty() {
            resource_type.as_str().to_string()
        } else {
            format!("{}/{}", self.path(), resource_type.as_str())
        }
    }

    fn join(&self, id: impl Fn(&str) -> String) -> String {
        self.segments
            .iter()
            .map(|(resource_type, value)| format!("{}/{}", resource_type.as_str(), id(value)))
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.link())
    }
}

// Verify ResourcePath is Send + Sync
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourcePath>();
};
