use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
#[error("Invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mongo_uri: String,
    pub mongo_db: String,
    /// Upper bound on documents returned by the geospatial searches.
    pub result_cap: i64,
    pub page_limit: u64,
    pub max_page_limit: u64,
    /// Hides internal error details from responses.
    pub production: bool,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "8080")?,
            mongo_uri: var("MONGO_URI")
                .or_else(|_| read_secret("MONGO_URI"))
                .unwrap_or_else(|_| {
                    info!("MONGO_URI not set, using default: {DEFAULT_MONGO_URI}");
                    DEFAULT_MONGO_URI.to_string()
                }),
            mongo_db: try_load("MONGO_DB", "estate")?,
            result_cap: try_load("RESULT_CAP", "100")?,
            page_limit: try_load("PAGE_LIMIT", "10")?,
            max_page_limit: try_load("MAX_PAGE_LIMIT", "100")?,
            production: try_load::<String>("APP_ENV", "development")?
                .eq_ignore_ascii_case("production"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            mongo_uri: DEFAULT_MONGO_URI.to_string(),
            mongo_db: "estate".to_string(),
            result_cap: 100,
            page_limit: 10,
            max_page_limit: 100,
            production: false,
        }
    }
}

const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }
    })
}

fn read_secret(secret_name: &str) -> Result<String, ()> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path).map(|s| s.trim().to_string()).map_err(|e| {
        warn!("Failed to read {secret_name} from file: {e}");
    })
}
