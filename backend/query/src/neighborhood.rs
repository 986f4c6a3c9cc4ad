use std::future::Future;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

pub const NEIGHBORHOOD_COLLECTION: &str = "neighborhoods";
pub const NEIGHBORHOOD_GEOMETRY: &str = "geometry";

/// A stored neighborhood boundary. `geometry` is optional so that documents
/// missing it can be told apart from documents that do not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Read-only lookup of neighborhoods by identifier.
pub trait NeighborhoodSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn find_neighborhood(
        &self,
        id: ObjectId,
    ) -> impl Future<Output = Result<Option<Neighborhood>, Self::Error>> + Send;
}
