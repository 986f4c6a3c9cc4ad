use std::path::PathBuf;

use clap::Parser;
use process::models::Kind;
use server::database::init_mongo;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    kind: Kind,

    file: PathBuf,

    /// Empty the collection before inserting.
    #[arg(long)]
    drop: bool,

    #[arg(long, default_value_t = 500)]
    batch_size: usize,

    #[arg(long, env = "MONGO_URI", default_value = "mongodb://localhost:27017")]
    mongo_uri: String,

    #[arg(long, env = "MONGO_DB", default_value = "estate")]
    mongo_db: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let database = init_mongo(&args.mongo_uri, &args.mongo_db).await?;
    let summary =
        process::load_file(&database, args.kind, &args.file, args.drop, args.batch_size).await?;

    println!("Inserted: {}", summary.inserted);
    println!("Skipped: {}", summary.skipped);

    Ok(())
}
