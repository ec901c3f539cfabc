use std::fs;

use anyhow::{Context, Result};
use common::IngredientImport;
use sea_orm::Database;
use tracing::{debug, info};

/// Parse an ingredient file: a JSON array of `{name, measurement_unit}` objects.
pub(crate) fn parse_ingredients(contents: &str) -> Result<Vec<IngredientImport>> {
    serde_json::from_str(contents).context("Ingredient file is not a JSON array of {name, measurement_unit} objects")
}

pub async fn import_ingredients(json_path: &str, database_url: &str) -> Result<()> {
    info!("Importing ingredients from {}", json_path);

    let contents = fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read ingredient file '{}'", json_path))?;
    let items = parse_ingredients(&contents)?;
    debug!("Parsed {} ingredient entries", items.len());

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let summary = service::ingredients::import(&db, items)
        .await
        .context("Ingredient import failed")?;

    info!(
        "Ingredient import completed: {} inserted, {} skipped",
        summary.inserted, summary.skipped
    );
    println!(
        "Imported {} ingredients ({} skipped)",
        summary.inserted, summary.skipped
    );
    Ok(())
}
