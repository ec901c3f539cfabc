//! Database fixtures shared by the service tests.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};

use model::entities::{ingredient, recipe, recipe_ingredient, shopping_cart_entry, user};

pub type Result<T> = std::result::Result<T, DbErr>;

/// Create an in-memory SQLite database with the full schema applied.
pub async fn setup_db() -> DatabaseConnection {
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

/// Create a file-backed SQLite database so that concurrent transactions run on
/// separate connections. Keep the returned directory alive for the duration
/// of the test.
pub async fn setup_file_db() -> (tempfile::TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("foodgram.db").display());
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to file database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    (dir, db)
}

pub async fn new_user(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    user::ActiveModel {
        email: Set(format!("{username}@example.com")),
        username: Set(username.to_string()),
        first_name: Set(username.to_string()),
        last_name: Set("Tester".to_string()),
        avatar: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_ingredient(
    db: &DatabaseConnection,
    name: &str,
    measurement_unit: &str,
) -> Result<ingredient::Model> {
    ingredient::ActiveModel {
        name: Set(name.to_string()),
        measurement_unit: Set(measurement_unit.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Insert a recipe and its line items directly, bypassing validation.
pub async fn new_recipe(
    db: &DatabaseConnection,
    author: &user::Model,
    name: &str,
    line_items: &[(&ingredient::Model, i32)],
) -> Result<recipe::Model> {
    let recipe = recipe::ActiveModel {
        author_id: Set(author.id),
        name: Set(name.to_string()),
        text: Set(format!("How to cook {name}")),
        image: Set(format!("recipes/{}.png", name.to_lowercase())),
        cooking_time: Set(10),
        pub_date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (ingredient, amount) in line_items {
        recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe.id),
            ingredient_id: Set(ingredient.id),
            amount: Set(*amount),
        }
        .insert(db)
        .await?;
    }

    Ok(recipe)
}

pub async fn add_to_cart(
    db: &DatabaseConnection,
    user: &user::Model,
    recipe: &recipe::Model,
) -> Result<shopping_cart_entry::Model> {
    shopping_cart_entry::ActiveModel {
        user_id: Set(user.id),
        recipe_id: Set(recipe.id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
}
