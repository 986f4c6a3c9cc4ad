//! # MongoDB
//!
//! Document store holding restaurants, neighborhoods and properties.
//!
//! Every geospatial predicate is evaluated by MongoDB itself, so this module
//! only connects and makes sure the indexes the operators depend on exist.
//!
//! ## Collections
//!
//! - `restaurants`: GeoJSON Point under `location`, `2dsphere` indexed
//! - `neighborhoods`: GeoJSON Polygon or MultiPolygon under `geometry`, `2dsphere` indexed
//! - `properties`: flat listing documents, filtered by equality and ranges
//!
//! ## Requirements
//!
//! - `$nearSphere` refuses to run without a `2dsphere` index on the queried field
//! - `$geoWithin` and `$geoIntersects` work without one but scan the collection
//! - Connection pooling is left to the driver, one [`Client`] per process
use std::time::Duration;

use mongodb::{
    Client, Database, IndexModel,
    bson::doc,
    error::Result,
    options::{ClientOptions, IndexOptions},
};
use query::{
    filter::{RESTAURANT_COLLECTION, RESTAURANT_LOCATION},
    neighborhood::{NEIGHBORHOOD_COLLECTION, NEIGHBORHOOD_GEOMETRY},
};
use tracing::info;

pub async fn init_mongo(mongo_uri: &str, database: &str) -> Result<Database> {
    let mut options = ClientOptions::parse(mongo_uri).await?;
    options.app_name = Some("estate".to_string());
    options.connect_timeout = Some(Duration::from_secs(5));
    options.server_selection_timeout = Some(Duration::from_secs(5));

    let client = Client::with_options(options)?;
    let database = client.database(database);

    database.run_command(doc! { "ping": 1 }).await?;
    info!("Connected to MongoDB database {}", database.name());

    Ok(database)
}

pub async fn ensure_indexes(database: &Database) -> Result<()> {
    for (collection, field) in [
        (RESTAURANT_COLLECTION, RESTAURANT_LOCATION),
        (NEIGHBORHOOD_COLLECTION, NEIGHBORHOOD_GEOMETRY),
    ] {
        let index = IndexModel::builder()
            .keys(doc! { field: "2dsphere" })
            .options(
                IndexOptions::builder()
                    .name(format!("{field}_2dsphere"))
                    .build(),
            )
            .build();

        database
            .collection::<mongodb::bson::Document>(collection)
            .create_index(index)
            .await?;

        info!("Ensured 2dsphere index on {collection}.{field}");
    }

    Ok(())
}
