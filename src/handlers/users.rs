use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use common::{AvatarRead, AvatarWrite, SubscriptionRead, UserRead, UserWrite};
use serde::Deserialize;
use service::subscriptions::parse_recipes_limit;
use tracing::{debug, info, instrument};
use utoipa::IntoParams;

use crate::auth::{AuthUser, Caller};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::schemas::{ApiError, ApiResponse, ApiResult, AppState, ErrorResponse};

/// Query parameters for subscription views
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionQuery {
    /// Maximum number of recipes shown per author
    pub recipes_limit: Option<String>,
}

impl SubscriptionQuery {
    fn limit(&self) -> Option<u64> {
        parse_recipes_limit(self.recipes_limit.as_deref())
    }
}

/// Register a user
#[utoipa::path(
    post,
    path = "/api/users/",
    tag = "users",
    request_body = UserWrite,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserRead>),
        (status = 400, description = "Invalid or duplicate user data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UserWrite>,
) -> ApiResult<UserRead> {
    let user = service::users::create(&state.db, request).await?;
    info!("User created successfully with ID: {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(user, "User created successfully")),
    ))
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users/",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserRead>>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn list_users(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<UserRead>> {
    let users = service::users::list(&state.db, user.id()).await?;
    debug!("Retrieved {} users", users.len());
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(users, "Users retrieved successfully")),
    ))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserRead>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller))]
pub async fn get_user(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(user_id): ApiPath<i32>,
) -> ApiResult<UserRead> {
    let user = service::users::get(&state.db, caller.id(), user_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(user, "User retrieved successfully")),
    ))
}

/// The authenticated caller
#[utoipa::path(
    get,
    path = "/api/users/me/",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserRead>),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
#[instrument(skip(user))]
pub async fn me(user: AuthUser) -> ApiResult<UserRead> {
    let AuthUser(model) = user;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            service::users::to_read(model, false),
            "User retrieved successfully",
        )),
    ))
}

/// Set the caller's avatar
#[utoipa::path(
    put,
    path = "/api/users/me/avatar/",
    tag = "users",
    request_body = AvatarWrite,
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<AvatarRead>),
        (status = 400, description = "Invalid avatar", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request))]
pub async fn set_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(request): ApiJson<AvatarWrite>,
) -> ApiResult<AvatarRead> {
    let avatar = service::users::set_avatar(&state.db, user.id(), request).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(avatar, "Avatar updated successfully")),
    ))
}

/// Remove the caller's avatar
#[utoipa::path(
    delete,
    path = "/api/users/me/avatar/",
    tag = "users",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn delete_avatar(State(state): State<AppState>, user: AuthUser) -> Result<StatusCode, ApiError> {
    service::users::clear_avatar(&state.db, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Subscribe to an author
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/subscribe/",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "Author ID"),
        SubscriptionQuery,
    ),
    responses(
        (status = 201, description = "Subscribed", body = ApiResponse<SubscriptionRead>),
        (status = 400, description = "Already subscribed or subscribing to oneself", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn subscribe(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(user_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<SubscriptionQuery>,
) -> ApiResult<SubscriptionRead> {
    let subscription =
        service::subscriptions::subscribe(&state.db, user.id(), user_id, query.limit()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(subscription, "Subscribed successfully")),
    ))
}

/// Unsubscribe from an author
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/subscribe/",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "Author ID"),
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "User not found or not subscribed", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    service::subscriptions::unsubscribe(&state.db, user.id(), user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Authors the caller follows, with their recipes
#[utoipa::path(
    get,
    path = "/api/users/subscriptions/",
    tag = "users",
    params(SubscriptionQuery),
    responses(
        (status = 200, description = "Subscriptions retrieved successfully", body = ApiResponse<Vec<SubscriptionRead>>),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<SubscriptionQuery>,
) -> ApiResult<Vec<SubscriptionRead>> {
    let subscriptions = service::subscriptions::list(&state.db, user.id(), query.limit()).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(subscriptions, "Subscriptions retrieved successfully")),
    ))
}
