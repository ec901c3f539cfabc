use anyhow::Result;
use tracing::{debug, info};

use super::initdb::apply_migrations;
use super::serve::run_server;
use crate::config::{Settings, build_cache};
use crate::schemas::AppState;

pub async fn migrate_and_serve(database_url: &str, bind_address: &str) -> Result<()> {
    info!("Applying database migrations and starting server");
    let db = apply_migrations(database_url).await?;

    let settings = Settings::load()?;
    let cache = build_cache(&settings);
    debug!("Application state initialized successfully");

    run_server(AppState { db, cache, settings }, bind_address).await
}
