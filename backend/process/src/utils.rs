use mongodb::bson::{Document, to_document};
use query::{Geometry, QueryError, validate_polygon_rings};
use serde_json::{Map, Value};

use crate::models::{Feature, Kind};

/// Converts one GeoJSON feature into the document stored for `kind`.
///
/// Feature properties become top-level fields, the geometry goes under the
/// collection's geometry field. Rings are held to the same rules as polygon
/// searches so that stored boundaries are always queryable.
pub fn feature_to_document(kind: Kind, feature: Feature) -> Result<Document, String> {
    let field = kind
        .geometry_field()
        .ok_or_else(|| format!("{kind:?} are not GeoJSON features"))?;

    let mut document = object_to_document(feature.properties.unwrap_or_default())?;

    let geometry = feature.geometry.ok_or("feature has no geometry")?;
    let geometry = parse_geometry(kind, geometry)?;

    document.insert(field, geometry.to_document());
    Ok(document)
}

pub fn object_to_document(object: Map<String, Value>) -> Result<Document, String> {
    to_document(&object).map_err(|e| format!("not representable as BSON: {e}"))
}

fn parse_geometry(kind: Kind, geometry: Value) -> Result<Geometry, String> {
    let coordinates = geometry.get("coordinates").cloned().unwrap_or(Value::Null);
    let geometry: Geometry =
        serde_json::from_value(geometry).map_err(|e| format!("unsupported geometry: {e}"))?;

    match (kind, &geometry) {
        (Kind::Restaurants, Geometry::Point(_)) => {}
        (Kind::Neighborhoods, Geometry::Polygon(_)) => {
            validate_polygon_rings(&coordinates).map_err(describe)?;
        }
        (Kind::Neighborhoods, Geometry::MultiPolygon(_)) => {
            for polygon in coordinates.as_array().into_iter().flatten() {
                validate_polygon_rings(polygon).map_err(describe)?;
            }
        }
        _ => return Err(format!("{} is not valid for {kind:?}", geometry.kind())),
    }

    Ok(geometry)
}

fn describe(err: QueryError) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;
    use serde_json::json;

    use super::*;

    fn feature(value: Value) -> Feature {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_restaurant_feature() {
        let document = feature_to_document(
            Kind::Restaurants,
            feature(json!({
                "type": "Feature",
                "properties": { "name": "Morris Park Bake Shop", "cuisine": "Bakery" },
                "geometry": { "type": "Point", "coordinates": [-73.856077, 40.848447] }
            })),
        )
        .unwrap();

        assert_eq!(
            document,
            doc! {
                "name": "Morris Park Bake Shop",
                "cuisine": "Bakery",
                "location": { "type": "Point", "coordinates": [-73.856077, 40.848447] },
            }
        );
    }

    #[test]
    fn test_neighborhood_feature() {
        let document = feature_to_document(
            Kind::Neighborhoods,
            feature(json!({
                "properties": { "name": "Bedford" },
                "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]] }
            })),
        )
        .unwrap();

        assert_eq!(document.get_str("name").unwrap(), "Bedford");
        assert_eq!(
            document.get_document("geometry").unwrap().get_str("type").unwrap(),
            "Polygon"
        );
    }

    #[test]
    fn test_unclosed_neighborhood_is_skipped() {
        let err = feature_to_document(
            Kind::Neighborhoods,
            feature(json!({
                "properties": { "name": "Broken" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[0, 0], [0, 1], [1, 1], [1, 0]]]]
                }
            })),
        )
        .unwrap_err();

        assert!(err.contains("first and last coordinates"));
    }

    #[test]
    fn test_wrong_geometry_kind() {
        let err = feature_to_document(
            Kind::Restaurants,
            feature(json!({
                "properties": {},
                "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]] }
            })),
        )
        .unwrap_err();

        assert_eq!(err, "Polygon is not valid for Restaurants");
    }

    #[test]
    fn test_missing_geometry() {
        let feature = feature(json!({ "properties": {} }));

        assert!(feature_to_document(Kind::Restaurants, feature).is_err());
    }
}
