use clap::ValueEnum;
use query::{
    filter::{RESTAURANT_COLLECTION, RESTAURANT_LOCATION},
    neighborhood::{NEIGHBORHOOD_COLLECTION, NEIGHBORHOOD_GEOMETRY},
    property::PROPERTY_COLLECTION,
};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Restaurants,
    Neighborhoods,
    Properties,
}

impl Kind {
    pub fn collection(self) -> &'static str {
        match self {
            Self::Restaurants => RESTAURANT_COLLECTION,
            Self::Neighborhoods => NEIGHBORHOOD_COLLECTION,
            Self::Properties => PROPERTY_COLLECTION,
        }
    }

    /// Field the geometry is stored under, `None` for plain documents.
    pub fn geometry_field(self) -> Option<&'static str> {
        match self {
            Self::Restaurants => Some(RESTAURANT_LOCATION),
            Self::Neighborhoods => Some(NEIGHBORHOOD_GEOMETRY),
            Self::Properties => None,
        }
    }
}

#[derive(Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Option<Value>,
}
