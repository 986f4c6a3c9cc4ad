//! Documentation of the estate search API.
//!
//!
//!
//! # General Infrastructure
//! - Single axum service in front of MongoDB
//! - Frontend talks to `/api/*` directly, CORS allows GET/POST from any origin
//! - MongoDB evaluates every geospatial predicate, the service only builds filters
//! - The store handle is created once at startup and injected through [`AppState`]
//!
//!
//!
//! # Endpoints
//!
//! | Method | Path | Params |
//! |---|---|---|
//! | GET | `/api/restaurants/radius` | `lat`, `lon`, `radius` (miles) |
//! | POST | `/api/restaurants/in-polygon` | body `{ "coordinates": [[[lon, lat], ...]] }` |
//! | GET | `/api/restaurants/in-neighborhood` | `neighborhoodId` |
//! | GET | `/api/neighborhoods/by-coords` | `lat`, `lon` |
//! | GET | `/api/properties` | `propertyID`, `state`, `type`, `price[$gte]`, `price[$lte]`, `yearBuilt[...]`, `beds[...]`, `baths[...]`, `page`, `limit` |
//! | GET | `/health` | |
//!
//! Errors are always `{ "error": string, "details"?: any }`. `details` only
//! shows up on 5xx responses when `APP_ENV` is not `production`.
//!
//!
//!
//! # Notes
//!
//! ## Radius units
//! The API takes miles, `$nearSphere` takes meters. The conversion factor is
//! 1609.34 and is applied exactly once, in the filter builder.
//!
//! ## Coordinate order
//! Always `[longitude, latitude]`. Query strings name them explicitly
//! (`lat`, `lon`) so the swap happens in one place.
//!
//!
//!
//! # Setup
//!
//! Run against a local MongoDB.
//! ```sh
//! MONGO_URI=mongodb://localhost:27017 RUST_LOG=info cargo run
//! ```
//!
//! Seed the collections.
//! ```sh
//! cargo run -p process -- neighborhoods data/neighborhoods.geojson --drop
//! cargo run -p process -- restaurants data/restaurants.geojson --drop
//! cargo run -p process -- properties data/properties.json
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    middleware::map_response_with_state,
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use config::Config;
use error::{StartError, expose_error_details};
use routes::{
    health_handler, neighborhood_by_coords_handler, properties_handler,
    restaurants_in_neighborhood_handler, restaurants_in_polygon_handler,
    restaurants_radius_handler,
};
use state::AppState;
use store::Store;

pub fn app<S: Store>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/restaurants/radius", get(restaurants_radius_handler::<S>))
        .route(
            "/api/restaurants/in-polygon",
            post(restaurants_in_polygon_handler::<S>),
        )
        .route(
            "/api/restaurants/in-neighborhood",
            get(restaurants_in_neighborhood_handler::<S>),
        )
        .route(
            "/api/neighborhoods/by-coords",
            get(neighborhood_by_coords_handler::<S>),
        )
        .route("/api/properties", get(properties_handler::<S>))
        .route("/health", get(health_handler))
        .layer(map_response_with_state(
            state.clone(),
            expose_error_details::<S>,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), StartError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
