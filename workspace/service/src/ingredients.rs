use std::collections::HashSet;

use common::{IngredientImport, IngredientRead};
use model::entities::ingredient;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError};

/// Outcome of an ingredient import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

pub(crate) fn to_read(model: ingredient::Model) -> IngredientRead {
    IngredientRead {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

/// Orders by name in code-point order, then unit, then id.
///
/// Sorting happens here rather than in SQL so the result does not depend on
/// the database collation.
pub fn sort_by_name(items: &mut [IngredientRead]) {
    items.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Loads the whole catalog sorted by name.
#[instrument(skip(db))]
pub async fn catalog(db: &DatabaseConnection) -> Result<Vec<IngredientRead>> {
    let models = ingredient::Entity::find()
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await?;

    let mut items: Vec<IngredientRead> = models.into_iter().map(to_read).collect();
    sort_by_name(&mut items);
    debug!("Loaded {} catalog ingredients", items.len());
    Ok(items)
}

/// Case-insensitive prefix match on the ingredient name.
///
/// `None` or an empty prefix returns the whole catalog. The input order is
/// preserved, so a sorted catalog yields a sorted result.
pub fn filter_by_prefix(catalog: &[IngredientRead], prefix: Option<&str>) -> Vec<IngredientRead> {
    match prefix.filter(|p| !p.is_empty()) {
        None => catalog.to_vec(),
        Some(prefix) => {
            let needle = prefix.to_lowercase();
            catalog
                .iter()
                .filter(|item| item.name.to_lowercase().starts_with(&needle))
                .cloned()
                .collect()
        }
    }
}

/// Catalog search: every ingredient whose name starts with `prefix`, sorted by name.
#[instrument(skip(db))]
pub async fn search(db: &DatabaseConnection, prefix: Option<&str>) -> Result<Vec<IngredientRead>> {
    let all = catalog(db).await?;
    Ok(filter_by_prefix(&all, prefix))
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, ingredient_id: i32) -> Result<IngredientRead> {
    match ingredient::Entity::find_by_id(ingredient_id).one(db).await? {
        Some(model) => Ok(to_read(model)),
        None => {
            warn!("Ingredient with ID {} not found", ingredient_id);
            Err(ServiceError::NotFound(format!(
                "Ingredient with ID {} not found",
                ingredient_id
            )))
        }
    }
}

/// Inserts every `(name, measurement_unit)` pair that is not in the catalog yet.
///
/// Names and units are trimmed; entries with an empty name or unit are skipped
/// together with pairs that already exist, so re-running an import is a no-op.
#[instrument(skip(db, items), fields(num_items = items.len()))]
pub async fn import(db: &DatabaseConnection, items: Vec<IngredientImport>) -> Result<ImportSummary> {
    let txn = db.begin().await?;

    let mut known: HashSet<(String, String)> = ingredient::Entity::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| (m.name, m.measurement_unit))
        .collect();
    debug!("Catalog already holds {} ingredients", known.len());

    let mut summary = ImportSummary::default();
    for item in items {
        let name = item.name.trim().to_string();
        let unit = item.measurement_unit.trim().to_string();
        if name.is_empty() || unit.is_empty() || known.contains(&(name.clone(), unit.clone())) {
            summary.skipped += 1;
            continue;
        }

        ingredient::ActiveModel {
            name: Set(name.clone()),
            measurement_unit: Set(unit.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        known.insert((name, unit));
        summary.inserted += 1;
    }

    txn.commit().await?;
    info!(
        "Ingredient import finished: {} inserted, {} skipped",
        summary.inserted, summary.skipped
    );
    Ok(summary)
}
