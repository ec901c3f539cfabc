use crate::handlers::{
    health::health_check,
    ingredients::{get_ingredient, list_ingredients},
    recipes::{
        add_favorite, add_to_shopping_cart, create_recipe, delete_recipe, download_shopping_cart,
        get_link, get_recipe, list_recipes, patch_recipe, remove_favorite,
        remove_from_shopping_cart, update_recipe,
    },
    users::{
        create_user, delete_avatar, get_user, list_subscriptions, list_users, me, set_avatar,
        subscribe, unsubscribe,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let timeout = state.settings.request_timeout();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Ingredient catalog
        .route("/api/ingredients/", get(list_ingredients))
        .route("/api/ingredients/:ingredient_id/", get(get_ingredient))
        // Recipes
        .route("/api/recipes/", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/download_shopping_cart/",
            get(download_shopping_cart),
        )
        .route(
            "/api/recipes/:recipe_id/",
            get(get_recipe)
                .put(update_recipe)
                .patch(patch_recipe)
                .delete(delete_recipe),
        )
        .route("/api/recipes/:recipe_id/get-link/", get(get_link))
        .route(
            "/api/recipes/:recipe_id/favorite/",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/api/recipes/:recipe_id/shopping_cart/",
            post(add_to_shopping_cart).delete(remove_from_shopping_cart),
        )
        // Users and subscriptions
        .route("/api/users/", get(list_users).post(create_user))
        .route("/api/users/me/", get(me))
        .route("/api/users/me/avatar/", put(set_avatar).delete(delete_avatar))
        .route("/api/users/subscriptions/", get(list_subscriptions))
        .route("/api/users/:user_id/", get(get_user))
        .route(
            "/api/users/:user_id/subscribe/",
            post(subscribe).delete(unsubscribe),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
