use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use common::{RecipeMinified, RecipePatch, RecipeRead, RecipeWrite, ShortLink};
use serde::Deserialize;
use service::recipes::{RecipeFilter, parse_flag};
use service::toggle::RecipeCollection;
use tracing::{debug, info, instrument};
use utoipa::IntoParams;

use crate::auth::{AuthUser, Caller};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::schemas::{ApiError, ApiResponse, ApiResult, AppState, ErrorResponse};

/// Query parameters for the recipe listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeQuery {
    /// Only recipes the caller has favorited (`1`/`true`)
    pub is_favorited: Option<String>,
    /// Only recipes in the caller's shopping cart (`1`/`true`)
    pub is_in_shopping_cart: Option<String>,
    /// Only recipes by this author
    pub author: Option<i32>,
}

impl RecipeQuery {
    fn to_filter(&self) -> RecipeFilter {
        RecipeFilter {
            is_favorited: parse_flag(self.is_favorited.as_deref()),
            is_in_shopping_cart: parse_flag(self.is_in_shopping_cart.as_deref()),
            author: self.author,
        }
    }
}

/// List recipes, newest first
#[utoipa::path(
    get,
    path = "/api/recipes/",
    tag = "recipes",
    params(RecipeQuery),
    responses(
        (status = 200, description = "Recipes retrieved successfully", body = ApiResponse<Vec<RecipeRead>>),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn list_recipes(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(query): ApiQuery<RecipeQuery>,
) -> ApiResult<Vec<RecipeRead>> {
    let recipes = service::recipes::list(&state.db, caller.id(), query.to_filter()).await?;
    debug!("Returning {} recipes", recipes.len());
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(recipes, "Recipes retrieved successfully")),
    ))
}

/// Publish a recipe as the caller
#[utoipa::path(
    post,
    path = "/api/recipes/",
    tag = "recipes",
    request_body = RecipeWrite,
    responses(
        (status = 201, description = "Recipe created successfully", body = ApiResponse<RecipeRead>),
        (status = 400, description = "Invalid recipe", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request))]
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(request): ApiJson<RecipeWrite>,
) -> ApiResult<RecipeRead> {
    let recipe = service::recipes::create(&state.db, user.id(), request).await?;
    info!("Recipe {} created by user {}", recipe.id, user.id());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(recipe, "Recipe created successfully")),
    ))
}

/// Get one recipe
#[utoipa::path(
    get,
    path = "/api/recipes/{recipe_id}/",
    tag = "recipes",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    responses(
        (status = 200, description = "Recipe retrieved successfully", body = ApiResponse<RecipeRead>),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn get_recipe(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(recipe_id): ApiPath<i32>,
) -> ApiResult<RecipeRead> {
    let recipe = service::recipes::get(&state.db, caller.id(), recipe_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(recipe, "Recipe retrieved successfully")),
    ))
}

/// Replace a recipe
#[utoipa::path(
    put,
    path = "/api/recipes/{recipe_id}/",
    tag = "recipes",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    request_body = RecipeWrite,
    responses(
        (status = 200, description = "Recipe updated successfully", body = ApiResponse<RecipeRead>),
        (status = 400, description = "Invalid recipe", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request))]
pub async fn update_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(recipe_id): ApiPath<i32>,
    ApiJson(request): ApiJson<RecipeWrite>,
) -> ApiResult<RecipeRead> {
    let recipe = service::recipes::update(&state.db, user.id(), recipe_id, request).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(recipe, "Recipe updated successfully")),
    ))
}

/// Partially update a recipe; the ingredient list is always replaced
#[utoipa::path(
    patch,
    path = "/api/recipes/{recipe_id}/",
    tag = "recipes",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    request_body = RecipePatch,
    responses(
        (status = 200, description = "Recipe updated successfully", body = ApiResponse<RecipeRead>),
        (status = 400, description = "Invalid recipe", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request))]
pub async fn patch_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(recipe_id): ApiPath<i32>,
    ApiJson(request): ApiJson<RecipePatch>,
) -> ApiResult<RecipeRead> {
    let recipe = service::recipes::patch(&state.db, user.id(), recipe_id, request).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(recipe, "Recipe updated successfully")),
    ))
}

/// Delete a recipe
#[utoipa::path(
    delete,
    path = "/api/recipes/{recipe_id}/",
    tag = "recipes",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(recipe_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    service::recipes::delete(&state.db, user.id(), recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Shareable link to the recipe page
#[utoipa::path(
    get,
    path = "/api/recipes/{recipe_id}/get-link/",
    tag = "recipes",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    responses(
        (status = 200, description = "Short link", body = ShortLink),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_link(
    State(state): State<AppState>,
    ApiPath(recipe_id): ApiPath<i32>,
) -> Result<Json<ShortLink>, ApiError> {
    let link = service::recipes::short_link(&state.db, &state.settings.public_url, recipe_id).await?;
    Ok(Json(link))
}

async fn add_to(
    state: &AppState,
    collection: RecipeCollection,
    user: &AuthUser,
    recipe_id: i32,
    message: &str,
) -> ApiResult<RecipeMinified> {
    let recipe = service::toggle::add(&state.db, collection, user.id(), recipe_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(recipe, message))))
}

async fn remove_from(
    state: &AppState,
    collection: RecipeCollection,
    user: &AuthUser,
    recipe_id: i32,
) -> Result<StatusCode, ApiError> {
    service::toggle::remove(&state.db, collection, user.id(), recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to the caller's favorites
#[utoipa::path(
    post,
    path = "/api/recipes/{recipe_id}/favorite/",
    tag = "recipes",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    responses(
        (status = 201, description = "Recipe added to favorites", body = ApiResponse<RecipeMinified>),
        (status = 400, description = "Recipe is already in favorites", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(recipe_id): ApiPath<i32>,
) -> ApiResult<RecipeMinified> {
    add_to(&state, RecipeCollection::Favorites, &user, recipe_id, "Recipe added to favorites").await
}

/// Remove a recipe from the caller's favorites
#[utoipa::path(
    delete,
    path = "/api/recipes/{recipe_id}/favorite/",
    tag = "recipes",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    responses(
        (status = 204, description = "Recipe removed from favorites"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Recipe missing or not in favorites", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(recipe_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    remove_from(&state, RecipeCollection::Favorites, &user, recipe_id).await
}

/// Add a recipe to the caller's shopping cart
#[utoipa::path(
    post,
    path = "/api/recipes/{recipe_id}/shopping_cart/",
    tag = "recipes",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    responses(
        (status = 201, description = "Recipe added to the shopping cart", body = ApiResponse<RecipeMinified>),
        (status = 400, description = "Recipe is already in the shopping cart", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn add_to_shopping_cart(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(recipe_id): ApiPath<i32>,
) -> ApiResult<RecipeMinified> {
    add_to(
        &state,
        RecipeCollection::ShoppingCart,
        &user,
        recipe_id,
        "Recipe added to the shopping cart",
    )
    .await
}

/// Remove a recipe from the caller's shopping cart
#[utoipa::path(
    delete,
    path = "/api/recipes/{recipe_id}/shopping_cart/",
    tag = "recipes",
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    responses(
        (status = 204, description = "Recipe removed from the shopping cart"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Recipe missing or not in the shopping cart", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn remove_from_shopping_cart(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(recipe_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    remove_from(&state, RecipeCollection::ShoppingCart, &user, recipe_id).await
}

/// Download the caller's aggregated shopping list as a text file
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart/",
    tag = "recipes",
    responses(
        (status = 200, description = "Shopping list", body = String, content_type = "text/plain"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, ApiError> {
    let list = service::shopping_list::build(&state.db, user.id(), Utc::now()).await?;
    info!(
        "Shopping list for user {} with {} items",
        user.id(),
        list.items.len()
    );

    let disposition = format!("attachment; filename=\"{}\"", list.file_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        list.body,
    )
        .into_response())
}
