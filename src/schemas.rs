use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use common::{
    AvatarRead, AvatarWrite, IngredientAmountWrite, IngredientRead, RecipeIngredientRead,
    RecipeMinified, RecipePatch, RecipeRead, RecipeWrite, ShortLink, SubscriptionRead, UserRead,
    UserWrite,
};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use service::ServiceError;
use service::error::FieldErrors;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use crate::config::Settings;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for expensive operations
    pub cache: Cache<String, CachedData>,
    /// Runtime settings
    pub settings: Settings,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    /// The full ingredient catalog sorted by name
    Ingredients(Vec<IngredientRead>),
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
    /// Field name to messages, present for validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

/// Error returned by handlers, rendered as an `ErrorResponse`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                code: code.to_string(),
                success: false,
                fields: None,
            },
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Authentication credentials were not provided or are invalid",
        )
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", error)
    }

    /// A 400 carrying field-level messages.
    pub fn validation(error: impl Into<String>, fields: FieldErrors) -> Self {
        let mut api_error = Self::bad_request(error);
        api_error.body.fields = Some(fields);
        api_error
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Validation(fields) => Self::validation(message, fields),
            ServiceError::Conflict(_) => Self::new(StatusCode::BAD_REQUEST, "CONFLICT", message),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
            ServiceError::Forbidden(_) => Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message),
            ServiceError::Database(db_error) => {
                error!("Database error: {}", db_error);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Handler result carrying a status code and an enveloped JSON body.
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::ingredients::list_ingredients,
        crate::handlers::ingredients::get_ingredient,
        crate::handlers::recipes::list_recipes,
        crate::handlers::recipes::create_recipe,
        crate::handlers::recipes::get_recipe,
        crate::handlers::recipes::update_recipe,
        crate::handlers::recipes::patch_recipe,
        crate::handlers::recipes::delete_recipe,
        crate::handlers::recipes::get_link,
        crate::handlers::recipes::add_favorite,
        crate::handlers::recipes::remove_favorite,
        crate::handlers::recipes::add_to_shopping_cart,
        crate::handlers::recipes::remove_from_shopping_cart,
        crate::handlers::recipes::download_shopping_cart,
        crate::handlers::users::create_user,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::me,
        crate::handlers::users::set_avatar,
        crate::handlers::users::delete_avatar,
        crate::handlers::users::subscribe,
        crate::handlers::users::unsubscribe,
        crate::handlers::users::list_subscriptions,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            UserRead,
            UserWrite,
            AvatarRead,
            AvatarWrite,
            SubscriptionRead,
            IngredientRead,
            IngredientAmountWrite,
            RecipeWrite,
            RecipePatch,
            RecipeRead,
            RecipeIngredientRead,
            RecipeMinified,
            ShortLink,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "ingredients", description = "Ingredient catalog"),
        (name = "recipes", description = "Recipes, favorites and the shopping cart"),
        (name = "users", description = "User directory and subscriptions"),
    ),
    info(
        title = "Foodgram API",
        description = "Recipe sharing backend: recipes, favorites, subscriptions and shopping lists",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
