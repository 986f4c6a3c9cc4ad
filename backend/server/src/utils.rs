use axum::body::Bytes;
use mongodb::bson::{Bson, Document};
use query::{Geometry, QueryError, validate_polygon_rings};
use serde_json::Value;

use crate::error::AppError;

/// Parses a polygon search body of the form `{ "coordinates": [[[lon, lat], ...]] }`.
pub fn get_polygon_from_body(body: &Bytes) -> Result<Geometry, AppError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|e| AppError::MalformedPayload(e.to_string()))?;

    let rings = payload
        .as_object()
        .ok_or_else(|| AppError::MalformedPayload("expected a JSON object".to_string()))?
        .get("coordinates")
        .filter(|rings| !rings.is_null())
        .ok_or(QueryError::MissingParameter("coordinates"))?;

    Ok(validate_polygon_rings(rings)?)
}

/// Store document as plain JSON, `ObjectId`s rendered as `{"$oid": ...}`.
pub fn document_to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

pub fn to_json(documents: Vec<Document>) -> Vec<Value> {
    documents.into_iter().map(document_to_json).collect()
}
