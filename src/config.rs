use std::time::Duration;

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use moka::future::Cache;
use sea_orm::Database;
use serde::Deserialize;
use tracing::{debug, info};

use crate::schemas::AppState;

/// Runtime settings, layered from defaults, an optional `foodgram.*` file and
/// `FOODGRAM_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base URL of the public site, used to build recipe short links
    pub public_url: String,
    /// Time-to-live of cached catalog reads
    pub cache_ttl_secs: u64,
    /// Maximum number of cached entries
    pub cache_capacity: u64,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:3000".to_string(),
            cache_ttl_secs: 300,
            cache_capacity: 1000,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let defaults = Settings::default();
        let settings = Config::builder()
            .set_default("public_url", defaults.public_url)?
            .set_default("cache_ttl_secs", defaults.cache_ttl_secs)?
            .set_default("cache_capacity", defaults.cache_capacity)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .add_source(File::with_name("foodgram").required(false))
            .add_source(Environment::with_prefix("FOODGRAM"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn build_cache(settings: &Settings) -> Cache<String, crate::schemas::CachedData> {
    Cache::builder()
        .max_capacity(settings.cache_capacity)
        .time_to_live(Duration::from_secs(settings.cache_ttl_secs))
        .build()
}

/// Initialize application state against the given database
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    let settings = Settings::load()?;

    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let cache = build_cache(&settings);

    Ok(AppState { db, cache, settings })
}
