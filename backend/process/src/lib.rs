//! # Seed Import
//!
//! Loads source files into the collections the search API reads.
//!
//! ## Inputs
//! - Restaurants: GeoJSON `FeatureCollection` of Points
//! - Neighborhoods: GeoJSON `FeatureCollection` of Polygons or MultiPolygons
//! - Properties: JSON array of listing objects, inserted as-is
//!
//! ## Steps
//! 1. Read and parse the whole file.
//! 2. Convert every feature, skipping (and counting) the ones with unusable geometry.
//! 3. Optionally drop the collection.
//! 4. Insert in batches.
//! 5. Ensure the `2dsphere` indexes, same as the server does at startup.
use std::path::Path;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use mongodb::{Database, bson::Document};
use serde_json::Value;
use server::database::ensure_indexes;

pub mod models;
pub mod utils;

use models::{FeatureCollection, Kind};
use utils::{feature_to_document, object_to_document};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub inserted: usize,
    pub skipped: usize,
}

pub async fn load_file(
    database: &Database,
    kind: Kind,
    path: &Path,
    drop: bool,
    batch_size: usize,
) -> Result<Summary> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let (documents, skipped) = parse_documents(kind, &raw)?;

    println!("Parsed {}: {}", kind.collection(), documents.len());
    println!("Skipped: {skipped}\n");

    let collection = database.collection::<Document>(kind.collection());

    if drop {
        collection.drop().await?;
        println!("Dropped {}", kind.collection());
    }

    let inserted = insert_batches(database, kind, documents, batch_size).await?;
    ensure_indexes(database).await?;

    Ok(Summary { inserted, skipped })
}

pub fn parse_documents(kind: Kind, raw: &str) -> Result<(Vec<Document>, usize)> {
    let mut documents = Vec::new();
    let mut skipped = 0;

    match kind {
        Kind::Properties => {
            let Value::Array(items) = serde_json::from_str::<Value>(raw)? else {
                bail!("properties file must be a JSON array");
            };

            for item in items {
                match item {
                    Value::Object(object) => match object_to_document(object) {
                        Ok(document) => documents.push(document),
                        Err(reason) => {
                            eprintln!("Skipping property: {reason}");
                            skipped += 1;
                        }
                    },
                    _ => skipped += 1,
                }
            }
        }
        Kind::Restaurants | Kind::Neighborhoods => {
            let collection: FeatureCollection = serde_json::from_str(raw)?;

            for (index, feature) in collection.features.into_iter().enumerate() {
                match feature_to_document(kind, feature) {
                    Ok(document) => documents.push(document),
                    Err(reason) => {
                        eprintln!("Skipping feature {index}: {reason}");
                        skipped += 1;
                    }
                }
            }
        }
    }

    Ok((documents, skipped))
}

async fn insert_batches(
    database: &Database,
    kind: Kind,
    documents: Vec<Document>,
    batch_size: usize,
) -> Result<usize> {
    let collection = database.collection::<Document>(kind.collection());

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );
    pb.set_message(format!("Inserting {}", kind.collection()));

    let mut inserted = 0;

    for batch in documents.chunks(batch_size.max(1)) {
        let result = collection.insert_many(batch).await?;

        inserted += result.inserted_ids.len();
        pb.inc(batch.len() as u64);
    }

    pb.finish_with_message("Done");
    Ok(inserted)
}
