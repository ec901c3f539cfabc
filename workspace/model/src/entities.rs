//! SeaORM entity modules, one per table of the recipe store.

pub mod auth_token;
pub mod favorite;
pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
pub mod shopping_cart_entry;
pub mod subscription;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::auth_token::Entity as AuthToken;
    pub use super::favorite::Entity as Favorite;
    pub use super::ingredient::Entity as Ingredient;
    pub use super::recipe::Entity as Recipe;
    pub use super::recipe_ingredient::Entity as RecipeIngredient;
    pub use super::shopping_cart_entry::Entity as ShoppingCartEntry;
    pub use super::subscription::Entity as Subscription;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn new_user(db: &DatabaseConnection, username: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            email: Set(format!("{username}@example.com")),
            username: Set(username.to_string()),
            first_name: Set("Test".to_string()),
            last_name: Set("User".to_string()),
            avatar: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn new_ingredient(
        db: &DatabaseConnection,
        name: &str,
        unit: &str,
    ) -> Result<ingredient::Model, DbErr> {
        ingredient::ActiveModel {
            name: Set(name.to_string()),
            measurement_unit: Set(unit.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn new_recipe(db: &DatabaseConnection, author: &user::Model) -> Result<recipe::Model, DbErr> {
        recipe::ActiveModel {
            author_id: Set(author.id),
            name: Set("Pancakes".to_string()),
            text: Set("Mix and fry.".to_string()),
            image: Set("recipes/pancakes.png".to_string()),
            cooking_time: Set(15),
            pub_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let author = new_user(&db, "author").await?;
        let reader = new_user(&db, "reader").await?;
        let flour = new_ingredient(&db, "Flour", "g").await?;
        let egg = new_ingredient(&db, "Egg", "pcs").await?;
        let recipe = new_recipe(&db, &author).await?;

        for (ingredient, amount) in [(&flour, 200), (&egg, 2)] {
            recipe_ingredient::ActiveModel {
                recipe_id: Set(recipe.id),
                ingredient_id: Set(ingredient.id),
                amount: Set(amount),
            }
            .insert(&db)
            .await?;
        }

        favorite::ActiveModel {
            user_id: Set(reader.id),
            recipe_id: Set(recipe.id),
            created_at: Set(Utc::now()),
        }
        .insert(&db)
        .await?;

        shopping_cart_entry::ActiveModel {
            user_id: Set(reader.id),
            recipe_id: Set(recipe.id),
            created_at: Set(Utc::now()),
        }
        .insert(&db)
        .await?;

        subscription::ActiveModel {
            subscriber_id: Set(reader.id),
            author_id: Set(author.id),
            created_at: Set(Utc::now()),
        }
        .insert(&db)
        .await?;

        let line_items = recipe.find_related(RecipeIngredient).all(&db).await?;
        assert_eq!(line_items.len(), 2);

        let authored = author.find_related(Recipe).all(&db).await?;
        assert_eq!(authored.len(), 1);

        let favorited = Favorite::find()
            .filter(favorite::Column::UserId.eq(reader.id))
            .count(&db)
            .await?;
        assert_eq!(favorited, 1);

        // Deleting the recipe cascades to its line items, favorites and cart entries
        recipe.delete(&db).await?;
        assert_eq!(RecipeIngredient::find().count(&db).await?, 0);
        assert_eq!(Favorite::find().count(&db).await?, 0);
        assert_eq!(ShoppingCartEntry::find().count(&db).await?, 0);
        assert_eq!(Subscription::find().count(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_ingredient_name_unit_pair_is_unique() -> Result<(), DbErr> {
        let db = setup_db().await?;

        new_ingredient(&db, "Sugar", "g").await?;
        new_ingredient(&db, "Sugar", "kg").await?;

        let duplicate = new_ingredient(&db, "Sugar", "g").await;
        let err = duplicate.expect_err("duplicate (name, unit) pair must be rejected");
        assert!(matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))));

        assert_eq!(Ingredient::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_favorite_pair_is_unique() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let author = new_user(&db, "author").await?;
        let recipe = new_recipe(&db, &author).await?;

        let favorite = || favorite::ActiveModel {
            user_id: Set(author.id),
            recipe_id: Set(recipe.id),
            created_at: Set(Utc::now()),
        };

        favorite().insert(&db).await?;
        let second = favorite().insert(&db).await;
        assert!(second.is_err());
        assert_eq!(Favorite::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_author_cascades_to_recipes() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let author = new_user(&db, "author").await?;
        new_recipe(&db, &author).await?;
        new_recipe(&db, &author).await?;
        assert_eq!(Recipe::find().count(&db).await?, 2);

        author.delete(&db).await?;
        assert_eq!(Recipe::find().count(&db).await?, 0);
        Ok(())
    }
}
