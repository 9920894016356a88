//! Collection data models.

use serde::{Deserialize, Serialize};

use super::{Connection, Image};

/// The collection highlighted above the fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedCollection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub image: Option<Image>,
}

impl FeaturedCollection {
    /// Storefront URL for the collection.
    pub fn url(&self) -> String {
        format!("/collections/{}", self.handle)
    }
}

/// `data` payload of the featured collection query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedCollectionResponse {
    pub collections: Connection<FeaturedCollection>,
}

impl FeaturedCollectionResponse {
    /// First node, if the store has any collection.
    pub fn into_first(self) -> Option<FeaturedCollection> {
        self.collections.nodes.into_iter().next()
    }
}
