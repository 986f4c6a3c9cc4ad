use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
};
use query::{
    Pagination, PropertyParams, QueryError, build_neighborhood_filter, build_point_filter,
    build_polygon_filter, build_property_filter, build_radius_filter, validate_neighborhood_id,
    validate_point, validate_radius_params,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::AppError,
    state::AppState,
    store::Store,
    utils::{document_to_json, get_polygon_from_body, to_json},
};

#[derive(Deserialize)]
pub struct RadiusParams {
    lat: Option<String>,
    lon: Option<String>,
    radius: Option<String>,
}

#[derive(Deserialize)]
pub struct PointParams {
    lat: Option<String>,
    lon: Option<String>,
}

#[derive(Deserialize)]
pub struct NeighborhoodParams {
    #[serde(rename = "neighborhoodId")]
    neighborhood_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPage {
    pub properties: Vec<Value>,
    pub total_pages: u64,
}

pub async fn restaurants_radius_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<RadiusParams>, QueryRejection>,
) -> Result<Json<Vec<Value>>, AppError> {
    let Query(params) = params?;
    let query = validate_radius_params(
        params.lat.as_deref(),
        params.lon.as_deref(),
        params.radius.as_deref(),
    )?;
    let filter = build_radius_filter(&query);
    debug!("Radius search: {filter}");

    let restaurants = state
        .store
        .find_restaurants(filter, state.config.result_cap)
        .await?;

    Ok(Json(to_json(restaurants)))
}

pub async fn restaurants_in_polygon_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<Json<Vec<Value>>, AppError> {
    let polygon = get_polygon_from_body(&body)?;
    let filter = build_polygon_filter(&polygon);
    debug!("Polygon search: {filter}");

    let restaurants = state
        .store
        .find_restaurants(filter, state.config.result_cap)
        .await?;

    Ok(Json(to_json(restaurants)))
}

pub async fn restaurants_in_neighborhood_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<NeighborhoodParams>, QueryRejection>,
) -> Result<Json<Vec<Value>>, AppError> {
    let Query(params) = params?;
    let id = validate_neighborhood_id(params.neighborhood_id.as_deref())?;
    let filter = build_neighborhood_filter(&state.store, id).await?;
    debug!("Neighborhood search: {filter}");

    let restaurants = state
        .store
        .find_restaurants(filter, state.config.result_cap)
        .await?;

    Ok(Json(to_json(restaurants)))
}

pub async fn neighborhood_by_coords_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<PointParams>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(params) = params?;
    let point = validate_point(params.lat.as_deref(), params.lon.as_deref())?;
    let filter = build_point_filter(point);

    let neighborhood = state
        .store
        .find_neighborhood_containing(filter)
        .await?
        .ok_or(QueryError::NotFound("No neighborhood found for these coordinates"))?;

    Ok(Json(document_to_json(neighborhood)))
}

pub async fn properties_handler<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<PropertyPage>, AppError> {
    let Query(pairs) = pairs?;
    let params = PropertyParams::from_pairs(pairs);
    let filter = build_property_filter(&params);
    let pagination = Pagination::from_params(
        params.page.as_deref(),
        params.limit.as_deref(),
        state.config.page_limit,
        state.config.max_page_limit,
    );
    debug!("Property search: {filter}, page {} of size {}", pagination.page, pagination.limit);

    let limit = i64::try_from(pagination.limit).unwrap_or(i64::MAX);
    let (total, properties) = tokio::try_join!(
        state.store.count_properties(filter.clone()),
        state.store.find_properties(filter, pagination.skip(), limit),
    )?;

    Ok(Json(PropertyPage {
        properties: to_json(properties),
        total_pages: pagination.total_pages(total),
    }))
}

pub async fn health_handler() -> &'static str {
    "ok"
}
