//! # Input Validation
//!
//! Turns raw, untrusted request parameters into typed values before any
//! filter gets built. Every function either returns a normalized value or one
//! of the [`QueryError`] validation variants.
use mongodb::bson::oid::ObjectId;
use serde_json::Value;

use crate::{
    error::{QueryError, Result},
    geometry::{Coordinate, Geometry, Ring},
};

pub const MIN_RING_POSITIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    pub center: Coordinate,
    pub radius_miles: f64,
}

pub fn validate_radius_params(
    lat: Option<&str>,
    lon: Option<&str>,
    radius: Option<&str>,
) -> Result<RadiusQuery> {
    let lat = required("lat", lat)?;
    let lon = required("lon", lon)?;
    let radius = required("radius", radius)?;

    let center = parse_coordinate(lat, lon)?;
    let radius_miles = parse_number("radius", radius)?;

    if radius_miles <= 0.0 {
        return Err(QueryError::InvalidRange {
            name: "radius",
            reason: "must be greater than 0",
        });
    }

    Ok(RadiusQuery {
        center,
        radius_miles,
    })
}

pub fn validate_point(lat: Option<&str>, lon: Option<&str>) -> Result<Coordinate> {
    let lat = required("lat", lat)?;
    let lon = required("lon", lon)?;

    parse_coordinate(lat, lon)
}

/// Checks the `coordinates` member of a polygon request body.
///
/// Every ring needs at least four positions and must end where it starts.
/// Closure is compared with exact equality on both components.
pub fn validate_polygon_rings(rings: &Value) -> Result<Geometry> {
    let rings = match rings.as_array() {
        Some(rings) if !rings.is_empty() => rings,
        _ => {
            return Err(QueryError::InvalidShape(
                "coordinates must be a non-empty array of rings",
            ));
        }
    };

    let rings = rings
        .iter()
        .map(parse_ring)
        .collect::<Result<Vec<Ring>>>()?;

    Ok(Geometry::Polygon(rings))
}

pub fn validate_neighborhood_id(id: Option<&str>) -> Result<ObjectId> {
    let id = required("neighborhoodId", id)?;

    ObjectId::parse_str(id).map_err(|_| QueryError::InvalidIdentifier(id.to_string()))
}

fn parse_ring(ring: &Value) -> Result<Ring> {
    let positions = ring
        .as_array()
        .ok_or(QueryError::InvalidShape("each ring must be an array of positions"))?;

    if positions.len() < MIN_RING_POSITIONS {
        return Err(QueryError::InvalidShape(
            "a ring must contain at least 4 positions",
        ));
    }

    let ring = positions
        .iter()
        .map(parse_position)
        .collect::<Result<Ring>>()?;

    // len checked above
    if ring[0] != ring[ring.len() - 1] {
        return Err(QueryError::UnclosedRing);
    }

    Ok(ring)
}

fn parse_position(position: &Value) -> Result<Coordinate> {
    match position.as_array().map(Vec::as_slice) {
        Some([lon, lat]) => match (lon.as_f64(), lat.as_f64()) {
            (Some(lon), Some(lat)) => Ok(Coordinate::new(lon, lat)),
            _ => Err(QueryError::InvalidShape(
                "positions must contain numeric longitude and latitude",
            )),
        },
        _ => Err(QueryError::InvalidShape(
            "each position must be a [longitude, latitude] pair",
        )),
    }
}

fn required<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(QueryError::MissingParameter(name)),
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| QueryError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}

fn parse_coordinate(lat: &str, lon: &str) -> Result<Coordinate> {
    let lat = parse_number("lat", lat)?;
    let lon = parse_number("lon", lon)?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(QueryError::InvalidRange {
            name: "lat",
            reason: "must be between -90 and 90",
        });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(QueryError::InvalidRange {
            name: "lon",
            reason: "must be between -180 and 180",
        });
    }

    Ok(Coordinate::new(lon, lat))
}
