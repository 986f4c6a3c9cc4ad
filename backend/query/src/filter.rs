//! # Geospatial Filters
//!
//! Builds the MongoDB filter documents for the geospatial endpoints.
//!
//! | Search | Operator | Field |
//! |---|---|---|
//! | point + radius | `$nearSphere` with `$maxDistance` in meters | `location` |
//! | drawn polygon | `$geoWithin` | `location` |
//! | stored neighborhood | `$geoWithin` | `location` |
//! | neighborhood at a point | `$geoIntersects` | `geometry` |
//!
//! All containment and distance math happens inside MongoDB, which needs a
//! `2dsphere` index on each queried field.
use mongodb::bson::{Document, doc, oid::ObjectId};
use tracing::{debug, error};

use crate::{
    error::{QueryError, Result},
    geometry::{Coordinate, Geometry},
    neighborhood::{NEIGHBORHOOD_GEOMETRY, NeighborhoodSource},
    validate::RadiusQuery,
};

pub const RESTAURANT_COLLECTION: &str = "restaurants";
pub const RESTAURANT_LOCATION: &str = "location";

/// `$nearSphere` expects meters.
pub const METERS_PER_MILE: f64 = 1609.34;

pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

pub fn build_radius_filter(query: &RadiusQuery) -> Document {
    let center = Geometry::Point(query.center);

    doc! {
        RESTAURANT_LOCATION: {
            "$nearSphere": {
                "$geometry": center.to_document(),
                "$maxDistance": miles_to_meters(query.radius_miles),
            }
        }
    }
}

pub fn build_polygon_filter(polygon: &Geometry) -> Document {
    doc! {
        RESTAURANT_LOCATION: {
            "$geoWithin": { "$geometry": polygon.to_document() }
        }
    }
}

/// Resolves the neighborhood and builds a containment filter over its stored boundary.
pub async fn build_neighborhood_filter<S>(source: &S, id: ObjectId) -> Result<Document>
where
    S: NeighborhoodSource + Sync,
{
    let neighborhood = source
        .find_neighborhood(id)
        .await
        .map_err(|e| QueryError::Store(Box::new(e)))?
        .ok_or(QueryError::NotFound("Neighborhood not found"))?;

    let Some(geometry) = neighborhood.geometry else {
        error!("Neighborhood {id} has no geometry");
        return Err(QueryError::IncompleteData("Neighborhood"));
    };

    debug!(
        "Neighborhood {id} ({}) resolved to a {}",
        neighborhood.name.as_deref().unwrap_or("unnamed"),
        geometry.kind()
    );

    Ok(build_polygon_filter(&geometry))
}

/// Matches stored boundaries that contain the point.
pub fn build_point_filter(point: Coordinate) -> Document {
    doc! {
        NEIGHBORHOOD_GEOMETRY: {
            "$geoIntersects": { "$geometry": Geometry::Point(point).to_document() }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        convert::Infallible,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use serde_json::json;

    use super::*;
    use crate::{
        neighborhood::Neighborhood,
        validate::{validate_polygon_rings, validate_radius_params},
    };

    #[derive(Default)]
    struct MemorySource {
        neighborhoods: HashMap<ObjectId, Neighborhood>,
        reads: AtomicUsize,
    }

    impl MemorySource {
        fn with(neighborhood: Neighborhood) -> Self {
            let mut source = Self::default();
            source.neighborhoods.insert(neighborhood.id, neighborhood);
            source
        }
    }

    impl NeighborhoodSource for MemorySource {
        type Error = Infallible;

        async fn find_neighborhood(
            &self,
            id: ObjectId,
        ) -> std::result::Result<Option<Neighborhood>, Infallible> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.neighborhoods.get(&id).cloned())
        }
    }

    fn square() -> Geometry {
        validate_polygon_rings(&json!([[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]])).unwrap()
    }

    #[test]
    fn test_radius_filter() {
        let query = validate_radius_params(Some("40.7"), Some("-74.0"), Some("2")).unwrap();

        assert_eq!(
            build_radius_filter(&query),
            doc! {
                "location": {
                    "$nearSphere": {
                        "$geometry": { "type": "Point", "coordinates": [-74.0, 40.7] },
                        "$maxDistance": 3218.68,
                    }
                }
            }
        );
    }

    #[test]
    fn test_radius_conversion() {
        for miles in [0.1, 1.0, 2.5, 26.2, 500.0] {
            let query = RadiusQuery {
                center: Coordinate::new(10.0, 20.0),
                radius_miles: miles,
            };
            let filter = build_radius_filter(&query);
            let max_distance = filter
                .get_document("location")
                .and_then(|near| near.get_document("$nearSphere"))
                .and_then(|near| near.get_f64("$maxDistance"))
                .unwrap();

            assert_eq!(max_distance, miles * 1609.34);
        }
    }

    #[test]
    fn test_polygon_filter_uses_geometry_verbatim() {
        let polygon = square();

        assert_eq!(
            build_polygon_filter(&polygon),
            doc! {
                "location": {
                    "$geoWithin": {
                        "$geometry": {
                            "type": "Polygon",
                            "coordinates": [[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]],
                        }
                    }
                }
            }
        );
    }

    #[test]
    fn test_builders_are_idempotent() {
        let query = RadiusQuery {
            center: Coordinate::new(-73.98, 40.75),
            radius_miles: 0.75,
        };
        let polygon = square();

        assert_eq!(build_radius_filter(&query), build_radius_filter(&query));
        assert_eq!(build_polygon_filter(&polygon), build_polygon_filter(&polygon));
        assert_eq!(
            build_point_filter(query.center),
            build_point_filter(query.center)
        );
    }

    #[test]
    fn test_point_filter() {
        assert_eq!(
            build_point_filter(Coordinate::new(-73.93, 40.82)),
            doc! {
                "geometry": {
                    "$geoIntersects": {
                        "$geometry": { "type": "Point", "coordinates": [-73.93, 40.82] }
                    }
                }
            }
        );
    }

    #[tokio::test]
    async fn test_neighborhood_filter() {
        let id = ObjectId::new();
        let source = MemorySource::with(Neighborhood {
            id,
            name: Some("Harlem".to_string()),
            geometry: Some(square()),
        });

        let filter = build_neighborhood_filter(&source, id).await.unwrap();

        assert_eq!(filter, build_polygon_filter(&square()));
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_neighborhood_not_found() {
        let source = MemorySource::default();

        let err = build_neighborhood_filter(&source, ObjectId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::NotFound(_)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_neighborhood_without_geometry() {
        let id = ObjectId::new();
        let source = MemorySource::with(Neighborhood {
            id,
            name: Some("Nowhere".to_string()),
            geometry: None,
        });

        let err = build_neighborhood_filter(&source, id).await.unwrap_err();

        assert!(matches!(err, QueryError::IncompleteData(_)));
        assert_eq!(err.to_string(), "Neighborhood data is incomplete");
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_multipolygon_neighborhood() {
        let id = ObjectId::new();
        let Geometry::Polygon(rings) = square() else {
            unreachable!()
        };
        let geometry = Geometry::MultiPolygon(vec![rings]);
        let source = MemorySource::with(Neighborhood {
            id,
            name: None,
            geometry: Some(geometry.clone()),
        });

        let filter = build_neighborhood_filter(&source, id).await.unwrap();
        let stored = filter
            .get_document("location")
            .and_then(|within| within.get_document("$geoWithin"))
            .and_then(|within| within.get_document("$geometry"))
            .unwrap();

        assert_eq!(stored.get_str("type").unwrap(), "MultiPolygon");
        assert_eq!(stored, &geometry.to_document());
    }
}
