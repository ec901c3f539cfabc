use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use common::IngredientRead;
use serde::Deserialize;
use tracing::{debug, instrument, trace};
use utoipa::IntoParams;

use crate::extract::{ApiPath, ApiQuery};
use crate::schemas::{ApiResponse, ApiResult, AppState, CachedData, ErrorResponse};

const CATALOG_CACHE_KEY: &str = "ingredients:catalog";

/// Query parameters for the ingredient search
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix
    pub name: Option<String>,
}

/// Sorted ingredient catalog, served from the cache when possible.
async fn cached_catalog(state: &AppState) -> Result<Vec<IngredientRead>, service::ServiceError> {
    if let Some(CachedData::Ingredients(items)) = state.cache.get(CATALOG_CACHE_KEY).await {
        trace!("Ingredient catalog served from cache");
        return Ok(items);
    }

    let items = service::ingredients::catalog(&state.db).await?;
    state
        .cache
        .insert(
            CATALOG_CACHE_KEY.to_string(),
            CachedData::Ingredients(items.clone()),
        )
        .await;
    debug!("Cached ingredient catalog with {} entries", items.len());
    Ok(items)
}

/// Search the ingredient catalog by name prefix
#[utoipa::path(
    get,
    path = "/api/ingredients/",
    tag = "ingredients",
    params(IngredientQuery),
    responses(
        (status = 200, description = "Matching ingredients sorted by name", body = ApiResponse<Vec<IngredientRead>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IngredientQuery>,
) -> ApiResult<Vec<IngredientRead>> {
    let catalog = cached_catalog(&state).await?;
    let found = service::ingredients::filter_by_prefix(&catalog, query.name.as_deref());
    debug!("Ingredient search matched {} of {}", found.len(), catalog.len());

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(found, "Ingredients retrieved successfully")),
    ))
}

/// Get one ingredient by ID
#[utoipa::path(
    get,
    path = "/api/ingredients/{ingredient_id}/",
    tag = "ingredients",
    params(
        ("ingredient_id" = i32, Path, description = "Ingredient ID"),
    ),
    responses(
        (status = 200, description = "Ingredient retrieved successfully", body = ApiResponse<IngredientRead>),
        (status = 404, description = "Ingredient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    ApiPath(ingredient_id): ApiPath<i32>,
) -> ApiResult<IngredientRead> {
    let ingredient = service::ingredients::get(&state.db, ingredient_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(ingredient, "Ingredient retrieved successfully")),
    ))
}
