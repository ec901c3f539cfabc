use axum::http::HeaderValue;
use axum_test::TestServer;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use model::entities::{auth_token, ingredient, user};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::{Settings, build_cache};
use crate::router::create_router;
use crate::schemas::AppState;

pub const PUBLIC_URL: &str = "https://foodgram.example";

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;
    let settings = Settings {
        public_url: PUBLIC_URL.to_string(),
        ..Settings::default()
    };
    let cache = build_cache(&settings);
    AppState { db, cache, settings }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is taken from RUST_LOG and defaults to WARN.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// A running test server together with a handle on its database.
pub struct TestApp {
    pub server: TestServer,
    pub db: DatabaseConnection,
    _tracing: tracing::subscriber::DefaultGuard,
}

pub async fn setup_test_app() -> TestApp {
    let guard = init_test_tracing();
    let state = setup_test_app_state().await;
    let db = state.db.clone();
    let server = TestServer::new(create_router(state)).expect("Failed to start test server");
    TestApp {
        server,
        db,
        _tracing: guard,
    }
}

/// Insert a user and an API token for it, returning the user and the
/// `Authorization` header value.
pub async fn create_user_with_token(db: &DatabaseConnection, username: &str) -> (user::Model, HeaderValue) {
    let user = user::ActiveModel {
        email: Set(format!("{username}@example.com")),
        username: Set(username.to_string()),
        first_name: Set(username.to_string()),
        last_name: Set("Tester".to_string()),
        avatar: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test user");

    let key = format!("token-{username}");
    auth_token::ActiveModel {
        key: Set(key.clone()),
        user_id: Set(user.id),
        created: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to create test token");

    let header = HeaderValue::from_str(&format!("Token {key}")).expect("Invalid header value");
    (user, header)
}

pub async fn create_ingredient(db: &DatabaseConnection, name: &str, unit: &str) -> ingredient::Model {
    ingredient::ActiveModel {
        name: Set(name.to_string()),
        measurement_unit: Set(unit.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test ingredient")
}
