use std::sync::Arc;

use super::{
    config::Config,
    database::{ensure_indexes, init_mongo},
    store::{MongoStore, Store},
};

pub struct AppState<S> {
    pub config: Config,
    pub store: S,
}

impl<S: Store> AppState<S> {
    pub fn with_store(config: Config, store: S) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}

impl AppState<MongoStore> {
    pub async fn new(config: Config) -> mongodb::error::Result<Arc<Self>> {
        let database = init_mongo(&config.mongo_uri, &config.mongo_db).await?;
        ensure_indexes(&database).await?;

        let store = MongoStore::new(&database);

        Ok(Self::with_store(config, store))
    }
}
