use std::future::Future;

use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{Document, doc, oid::ObjectId},
    error::Error,
};
use query::{
    Neighborhood, NeighborhoodSource,
    filter::RESTAURANT_COLLECTION,
    neighborhood::NEIGHBORHOOD_COLLECTION,
    property::PROPERTY_COLLECTION,
};

/// Everything the route handlers need from the document store.
///
/// Filters arrive fully built; implementations only execute them.
pub trait Store: NeighborhoodSource<Error = Error> + Send + Sync + 'static {
    fn find_restaurants(
        &self,
        filter: Document,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Document>, Error>> + Send;

    fn find_neighborhood_containing(
        &self,
        filter: Document,
    ) -> impl Future<Output = Result<Option<Document>, Error>> + Send;

    fn find_properties(
        &self,
        filter: Document,
        skip: u64,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Document>, Error>> + Send;

    fn count_properties(&self, filter: Document)
    -> impl Future<Output = Result<u64, Error>> + Send;
}

#[derive(Clone)]
pub struct MongoStore {
    restaurants: Collection<Document>,
    neighborhoods: Collection<Document>,
    properties: Collection<Document>,
}

impl MongoStore {
    pub fn new(database: &Database) -> Self {
        Self {
            restaurants: database.collection(RESTAURANT_COLLECTION),
            neighborhoods: database.collection(NEIGHBORHOOD_COLLECTION),
            properties: database.collection(PROPERTY_COLLECTION),
        }
    }
}

impl NeighborhoodSource for MongoStore {
    type Error = Error;

    async fn find_neighborhood(&self, id: ObjectId) -> Result<Option<Neighborhood>, Error> {
        self.neighborhoods
            .clone_with_type::<Neighborhood>()
            .find_one(doc! { "_id": id })
            .await
    }
}

impl Store for MongoStore {
    async fn find_restaurants(&self, filter: Document, limit: i64) -> Result<Vec<Document>, Error> {
        self.restaurants
            .find(filter)
            .limit(limit)
            .await?
            .try_collect()
            .await
    }

    async fn find_neighborhood_containing(
        &self,
        filter: Document,
    ) -> Result<Option<Document>, Error> {
        self.neighborhoods
            .find_one(filter)
            .projection(doc! { "name": 1, "geometry": 1 })
            .await
    }

    async fn find_properties(
        &self,
        filter: Document,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Document>, Error> {
        self.properties
            .find(filter)
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(limit)
            .await?
            .try_collect()
            .await
    }

    async fn count_properties(&self, filter: Document) -> Result<u64, Error> {
        self.properties.count_documents(filter).await
    }
}
