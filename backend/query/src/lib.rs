//! # Query
//!
//! Filter construction for the estate search API.
//!
//! Request parameters arrive untrusted. They are parsed into typed values by
//! [`validate`], turned into MongoDB filter documents by [`filter`] and
//! [`property`], and only then handed to the store. Nothing in this crate
//! talks to the database except through [`NeighborhoodSource`].
//!
//! ## Flow
//! 1. Received: raw strings from the query string or a JSON body
//! 2. Validated: typed coordinates, radius, polygon or identifier, or a [`QueryError`]
//! 3. Filter built: a [`Document`](mongodb::bson::Document) ready for `find`
//! 4. Executed and responded by the caller
pub mod error;
pub mod filter;
pub mod geometry;
pub mod neighborhood;
pub mod property;
pub mod validate;

pub use error::{QueryError, Result};
pub use filter::{
    METERS_PER_MILE, build_neighborhood_filter, build_point_filter, build_polygon_filter,
    build_radius_filter,
};
pub use geometry::{Coordinate, Geometry, Ring};
pub use neighborhood::{Neighborhood, NeighborhoodSource};
pub use property::{Pagination, PropertyParams, build_property_filter};
pub use validate::{
    RadiusQuery, validate_neighborhood_id, validate_point, validate_polygon_rings,
    validate_radius_params,
};
