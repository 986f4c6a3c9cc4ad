//! # GeoJSON
//!
//! Minimal GeoJSON geometries as stored in and sent to MongoDB.
//!
//! Positions are always `[longitude, latitude]`. Only the geometry kinds the
//! search endpoints deal with are modelled: points for restaurants and
//! polygons/multipolygons for neighborhood boundaries.
use mongodb::bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};

pub type Ring = Vec<Coordinate>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coordinate: Coordinate) -> Self {
        [coordinate.lon, coordinate.lat]
    }
}

impl From<Coordinate> for Bson {
    fn from(coordinate: Coordinate) -> Self {
        Self::Array(vec![Self::Double(coordinate.lon), Self::Double(coordinate.lat)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coordinate),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Renders the geometry as the BSON document MongoDB expects under `$geometry`.
    pub fn to_document(&self) -> Document {
        let coordinates: Bson = match self {
            Self::Point(point) => (*point).into(),
            Self::Polygon(rings) => rings.clone().into(),
            Self::MultiPolygon(polygons) => polygons.clone().into(),
        };

        doc! { "type": self.kind(), "coordinates": coordinates }
    }
}
