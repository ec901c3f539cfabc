//! Membership toggles shared by favorites, the shopping cart and subscriptions.
//!
//! Each of these relations is a set of `(user, target)` pairs. Adding a pair
//! that is already present or removing one that is absent is rejected; the
//! storage layer only ever sees transitions that change the state.

use chrono::Utc;
use common::RecipeMinified;
use model::entities::{favorite, recipe, shopping_cart_entry};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError, is_unique_violation};
use crate::recipes::minified;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Absent,
    Present,
}

impl From<bool> for Membership {
    fn from(present: bool) -> Self {
        if present {
            Membership::Present
        } else {
            Membership::Absent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Add,
    Remove,
}

/// Why a toggle was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AlreadyPresent,
    NotPresent,
}

/// Computes the state after `toggle`, or the reason it cannot be applied.
pub fn apply(current: Membership, toggle: Toggle) -> std::result::Result<Membership, Rejection> {
    match (current, toggle) {
        (Membership::Absent, Toggle::Add) => Ok(Membership::Present),
        (Membership::Present, Toggle::Remove) => Ok(Membership::Absent),
        (Membership::Present, Toggle::Add) => Err(Rejection::AlreadyPresent),
        (Membership::Absent, Toggle::Remove) => Err(Rejection::NotPresent),
    }
}

/// The per-user recipe sets a caller can toggle a recipe in and out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeCollection {
    Favorites,
    ShoppingCart,
}

impl RecipeCollection {
    pub fn already_present_message(self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "Recipe is already in favorites.",
            RecipeCollection::ShoppingCart => "Recipe is already in the shopping cart.",
        }
    }

    pub fn not_present_message(self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "Recipe is not in favorites.",
            RecipeCollection::ShoppingCart => "Recipe is not in the shopping cart.",
        }
    }

    async fn membership<C: ConnectionTrait>(
        self,
        conn: &C,
        user_id: i32,
        recipe_id: i32,
    ) -> std::result::Result<Membership, DbErr> {
        let present = match self {
            RecipeCollection::Favorites => favorite::Entity::find_by_id((user_id, recipe_id))
                .one(conn)
                .await?
                .is_some(),
            RecipeCollection::ShoppingCart => {
                shopping_cart_entry::Entity::find_by_id((user_id, recipe_id))
                    .one(conn)
                    .await?
                    .is_some()
            }
        };
        Ok(present.into())
    }

    async fn insert<C: ConnectionTrait>(
        self,
        conn: &C,
        user_id: i32,
        recipe_id: i32,
    ) -> std::result::Result<(), DbErr> {
        let now = Utc::now();
        match self {
            RecipeCollection::Favorites => {
                favorite::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    created_at: Set(now),
                }
                .insert(conn)
                .await?;
            }
            RecipeCollection::ShoppingCart => {
                shopping_cart_entry::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    created_at: Set(now),
                }
                .insert(conn)
                .await?;
            }
        }
        Ok(())
    }

    async fn delete<C: ConnectionTrait>(
        self,
        conn: &C,
        user_id: i32,
        recipe_id: i32,
    ) -> std::result::Result<(), DbErr> {
        match self {
            RecipeCollection::Favorites => {
                favorite::Entity::delete_by_id((user_id, recipe_id))
                    .exec(conn)
                    .await?;
            }
            RecipeCollection::ShoppingCart => {
                shopping_cart_entry::Entity::delete_by_id((user_id, recipe_id))
                    .exec(conn)
                    .await?;
            }
        }
        Ok(())
    }
}

async fn find_recipe<C: ConnectionTrait>(conn: &C, recipe_id: i32) -> Result<recipe::Model> {
    recipe::Entity::find_by_id(recipe_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            warn!("Recipe with ID {} not found", recipe_id);
            ServiceError::NotFound(format!("Recipe with ID {} not found", recipe_id))
        })
}

/// Puts a recipe into the caller's collection and returns its minified form.
#[instrument(skip(db))]
pub async fn add(
    db: &DatabaseConnection,
    collection: RecipeCollection,
    user_id: i32,
    recipe_id: i32,
) -> Result<RecipeMinified> {
    let txn = db.begin().await?;
    let recipe = find_recipe(&txn, recipe_id).await?;

    let current = collection.membership(&txn, user_id, recipe_id).await?;
    apply(current, Toggle::Add)
        .map_err(|_| ServiceError::Conflict(collection.already_present_message().to_string()))?;

    match collection.insert(&txn, user_id, recipe_id).await {
        Ok(()) => {}
        // A concurrent request inserted the same pair first.
        Err(e) if is_unique_violation(&e) => {
            return Err(ServiceError::Conflict(
                collection.already_present_message().to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }
    txn.commit().await?;

    info!("Recipe {} added to {:?} of user {}", recipe_id, collection, user_id);
    Ok(minified(recipe))
}

/// Takes a recipe out of the caller's collection.
#[instrument(skip(db))]
pub async fn remove(
    db: &DatabaseConnection,
    collection: RecipeCollection,
    user_id: i32,
    recipe_id: i32,
) -> Result<()> {
    let txn = db.begin().await?;
    find_recipe(&txn, recipe_id).await?;

    let current = collection.membership(&txn, user_id, recipe_id).await?;
    apply(current, Toggle::Remove)
        .map_err(|_| ServiceError::NotFound(collection.not_present_message().to_string()))?;

    collection.delete(&txn, user_id, recipe_id).await?;
    txn.commit().await?;

    debug!("Recipe {} removed from {:?} of user {}", recipe_id, collection, user_id);
    Ok(())
}
