//! Recipe authoring and the caller-relative recipe read model.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use common::{
    IngredientAmountWrite, RecipeIngredientRead, RecipeMinified, RecipePatch, RecipeRead,
    RecipeWrite, ShortLink,
};
use model::entities::{favorite, ingredient, recipe, recipe_ingredient, shopping_cart_entry, user};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};
use validator::Validate;

use crate::error::{FieldErrors, Result, ServiceError};
use crate::subscriptions::subscribed_author_ids;
use crate::users::to_read;

const INGREDIENTS_FIELD: &str = "ingredients";

/// Listing filters. The membership flags only apply to authenticated callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub author: Option<i32>,
}

/// Interprets a boolean query flag. Absent, empty, `0` and `false` are off.
pub fn parse_flag(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(value) => !value.eq_ignore_ascii_case("false"),
    }
}

pub fn minified(model: recipe::Model) -> RecipeMinified {
    RecipeMinified {
        id: model.id,
        name: model.name,
        image: model.image,
        cooking_time: model.cooking_time,
    }
}

/// Structural checks on a submitted ingredient list.
pub fn validate_ingredients(items: &[IngredientAmountWrite]) -> Result<()> {
    let mut messages = Vec::new();
    if items.is_empty() {
        messages.push("At least one ingredient is required.".to_string());
    }

    let mut seen = HashSet::new();
    if items.iter().any(|item| !seen.insert(item.id)) {
        messages.push("Ingredients must not repeat.".to_string());
    }

    if items.iter().any(|item| item.amount < 1) {
        messages.push("Ingredient amount must be at least 1.".to_string());
    }

    if messages.is_empty() {
        Ok(())
    } else {
        let mut fields = FieldErrors::new();
        fields.insert(INGREDIENTS_FIELD.to_string(), messages);
        Err(ServiceError::Validation(fields))
    }
}

async fn ensure_ingredients_exist<C: ConnectionTrait>(
    conn: &C,
    items: &[IngredientAmountWrite],
) -> Result<()> {
    let ids: Vec<i32> = items.iter().map(|i| i.id).collect();
    let known: HashSet<i32> = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ids.clone()))
        .all(conn)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    let missing: Vec<String> = ids
        .into_iter()
        .filter(|id| !known.contains(id))
        .map(|id| format!("Ingredient with ID {} does not exist.", id))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        let mut fields = FieldErrors::new();
        fields.insert(INGREDIENTS_FIELD.to_string(), missing);
        Err(ServiceError::Validation(fields))
    }
}

/// Replaces the whole line-item set of a recipe.
async fn replace_line_items<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i32,
    items: &[IngredientAmountWrite],
) -> Result<()> {
    let removed = recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    trace!("Removed {} line items of recipe {}", removed.rows_affected, recipe_id);

    let models: Vec<recipe_ingredient::ActiveModel> = items
        .iter()
        .map(|item| recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(item.id),
            amount: Set(item.amount),
        })
        .collect();
    if !models.is_empty() {
        recipe_ingredient::Entity::insert_many(models)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}

/// Loads a recipe and checks that `caller_id` wrote it.
async fn find_own_recipe<C: ConnectionTrait>(
    conn: &C,
    caller_id: i32,
    recipe_id: i32,
) -> Result<recipe::Model> {
    let model = recipe::Entity::find_by_id(recipe_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            warn!("Recipe with ID {} not found", recipe_id);
            ServiceError::NotFound(format!("Recipe with ID {} not found", recipe_id))
        })?;
    if model.author_id != caller_id {
        warn!(
            "User {} attempted to modify recipe {} owned by {}",
            caller_id, recipe_id, model.author_id
        );
        return Err(ServiceError::Forbidden(
            "Only the author may modify this recipe.".to_string(),
        ));
    }
    Ok(model)
}

/// Expands recipes into their caller-relative read form with a fixed number
/// of queries regardless of how many recipes are passed in.
async fn assemble<C: ConnectionTrait>(
    conn: &C,
    viewer: Option<i32>,
    recipes: Vec<recipe::Model>,
) -> Result<Vec<RecipeRead>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<i32> = recipes
        .iter()
        .map(|r| r.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let mut line_items: HashMap<i32, Vec<RecipeIngredientRead>> = HashMap::new();
    let rows = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.clone()))
        .find_also_related(ingredient::Entity)
        .all(conn)
        .await?;
    for (line, ingredient) in rows {
        let Some(ingredient) = ingredient else {
            continue;
        };
        line_items
            .entry(line.recipe_id)
            .or_default()
            .push(RecipeIngredientRead {
                id: ingredient.id,
                name: ingredient.name,
                measurement_unit: ingredient.measurement_unit,
                amount: line.amount,
            });
    }
    for items in line_items.values_mut() {
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    }

    let authors: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids.clone()))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let subscribed = subscribed_author_ids(conn, viewer, &author_ids).await?;

    let (favorited, in_cart): (HashSet<i32>, HashSet<i32>) = match viewer {
        Some(viewer_id) => {
            let favorited = favorite::Entity::find()
                .filter(favorite::Column::UserId.eq(viewer_id))
                .filter(favorite::Column::RecipeId.is_in(recipe_ids.clone()))
                .all(conn)
                .await?
                .into_iter()
                .map(|f| f.recipe_id)
                .collect();
            let in_cart = shopping_cart_entry::Entity::find()
                .filter(shopping_cart_entry::Column::UserId.eq(viewer_id))
                .filter(shopping_cart_entry::Column::RecipeId.is_in(recipe_ids))
                .all(conn)
                .await?
                .into_iter()
                .map(|c| c.recipe_id)
                .collect();
            (favorited, in_cart)
        }
        None => (HashSet::new(), HashSet::new()),
    };

    let mut result = Vec::with_capacity(recipes.len());
    for model in recipes {
        let author = authors.get(&model.author_id).cloned().ok_or_else(|| {
            ServiceError::NotFound(format!("Author of recipe {} not found", model.id))
        })?;
        let is_subscribed = subscribed.contains(&author.id);
        result.push(RecipeRead {
            id: model.id,
            author: to_read(author, is_subscribed),
            ingredients: line_items.remove(&model.id).unwrap_or_default(),
            is_favorited: favorited.contains(&model.id),
            is_in_shopping_cart: in_cart.contains(&model.id),
            name: model.name,
            image: model.image,
            text: model.text,
            cooking_time: model.cooking_time,
        });
    }
    Ok(result)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, viewer: Option<i32>, recipe_id: i32) -> Result<RecipeRead> {
    let model = recipe::Entity::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            warn!("Recipe with ID {} not found", recipe_id);
            ServiceError::NotFound(format!("Recipe with ID {} not found", recipe_id))
        })?;
    let mut read = assemble(db, viewer, vec![model]).await?;
    read.pop()
        .ok_or_else(|| ServiceError::NotFound(format!("Recipe with ID {} not found", recipe_id)))
}

/// Recipes newest first, narrowed by `filter`.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    viewer: Option<i32>,
    filter: RecipeFilter,
) -> Result<Vec<RecipeRead>> {
    let mut query = recipe::Entity::find();

    if let Some(author_id) = filter.author {
        query = query.filter(recipe::Column::AuthorId.eq(author_id));
    }
    if let Some(viewer_id) = viewer {
        if filter.is_favorited {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(favorite::Column::RecipeId)
                        .from(favorite::Entity)
                        .and_where(favorite::Column::UserId.eq(viewer_id))
                        .to_owned(),
                ),
            );
        }
        if filter.is_in_shopping_cart {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(shopping_cart_entry::Column::RecipeId)
                        .from(shopping_cart_entry::Entity)
                        .and_where(shopping_cart_entry::Column::UserId.eq(viewer_id))
                        .to_owned(),
                ),
            );
        }
    } else if filter.is_favorited || filter.is_in_shopping_cart {
        debug!("Ignoring membership filters for anonymous caller");
    }

    let models = query
        .order_by_desc(recipe::Column::PubDate)
        .order_by_desc(recipe::Column::Id)
        .all(db)
        .await?;
    debug!("Listing {} recipes", models.len());
    assemble(db, viewer, models).await
}

/// Publishes a recipe authored by `author_id`.
#[instrument(skip(db, write), fields(name = %write.name))]
pub async fn create(db: &DatabaseConnection, author_id: i32, write: RecipeWrite) -> Result<RecipeRead> {
    write.validate()?;
    validate_ingredients(&write.ingredients)?;

    let txn = db.begin().await?;
    ensure_ingredients_exist(&txn, &write.ingredients).await?;

    let model = recipe::ActiveModel {
        author_id: Set(author_id),
        name: Set(write.name),
        text: Set(write.text),
        image: Set(write.image),
        cooking_time: Set(write.cooking_time),
        pub_date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    replace_line_items(&txn, model.id, &write.ingredients).await?;

    let mut read = assemble(&txn, Some(author_id), vec![model]).await?;
    txn.commit().await?;

    let read = read
        .pop()
        .ok_or_else(|| ServiceError::NotFound("Created recipe not found".to_string()))?;
    info!("User {} created recipe {}", author_id, read.id);
    Ok(read)
}

/// Replaces every author-editable field of a recipe.
#[instrument(skip(db, write))]
pub async fn update(
    db: &DatabaseConnection,
    caller_id: i32,
    recipe_id: i32,
    write: RecipeWrite,
) -> Result<RecipeRead> {
    let txn = db.begin().await?;
    let model = find_own_recipe(&txn, caller_id, recipe_id).await?;

    write.validate()?;
    validate_ingredients(&write.ingredients)?;
    ensure_ingredients_exist(&txn, &write.ingredients).await?;

    let mut active = model.into_active_model();
    active.name = Set(write.name);
    active.text = Set(write.text);
    active.image = Set(write.image);
    active.cooking_time = Set(write.cooking_time);
    let model = active.update(&txn).await?;
    replace_line_items(&txn, recipe_id, &write.ingredients).await?;

    let mut read = assemble(&txn, Some(caller_id), vec![model]).await?;
    txn.commit().await?;

    info!("User {} updated recipe {}", caller_id, recipe_id);
    read.pop()
        .ok_or_else(|| ServiceError::NotFound(format!("Recipe with ID {} not found", recipe_id)))
}

/// Updates the header fields present in `patch` and replaces the line items.
#[instrument(skip(db, patch))]
pub async fn patch(
    db: &DatabaseConnection,
    caller_id: i32,
    recipe_id: i32,
    patch: RecipePatch,
) -> Result<RecipeRead> {
    let txn = db.begin().await?;
    let model = find_own_recipe(&txn, caller_id, recipe_id).await?;

    patch.validate()?;
    validate_ingredients(&patch.ingredients)?;
    ensure_ingredients_exist(&txn, &patch.ingredients).await?;

    let mut active = model.into_active_model();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(text) = patch.text {
        active.text = Set(text);
    }
    if let Some(image) = patch.image {
        active.image = Set(image);
    }
    if let Some(cooking_time) = patch.cooking_time {
        active.cooking_time = Set(cooking_time);
    }
    let model = active.update(&txn).await?;
    replace_line_items(&txn, recipe_id, &patch.ingredients).await?;

    let mut read = assemble(&txn, Some(caller_id), vec![model]).await?;
    txn.commit().await?;

    info!("User {} patched recipe {}", caller_id, recipe_id);
    read.pop()
        .ok_or_else(|| ServiceError::NotFound(format!("Recipe with ID {} not found", recipe_id)))
}

/// Deletes a recipe together with its line items and memberships.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, caller_id: i32, recipe_id: i32) -> Result<()> {
    let txn = db.begin().await?;
    find_own_recipe(&txn, caller_id, recipe_id).await?;

    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    favorite::Entity::delete_many()
        .filter(favorite::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    shopping_cart_entry::Entity::delete_many()
        .filter(shopping_cart_entry::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    recipe::Entity::delete_by_id(recipe_id).exec(&txn).await?;
    txn.commit().await?;

    info!("User {} deleted recipe {}", caller_id, recipe_id);
    Ok(())
}

/// Public link to the recipe page on the frontend.
#[instrument(skip(db))]
pub async fn short_link(db: &DatabaseConnection, public_url: &str, recipe_id: i32) -> Result<ShortLink> {
    let exists = recipe::Entity::find_by_id(recipe_id).count(db).await? > 0;
    if !exists {
        warn!("Recipe with ID {} not found", recipe_id);
        return Err(ServiceError::NotFound(format!(
            "Recipe with ID {} not found",
            recipe_id
        )));
    }
    Ok(ShortLink {
        short_link: format!("{}/recipes/{}/", public_url.trim_end_matches('/'), recipe_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{add_to_cart, new_ingredient, new_recipe, new_user, setup_db};
    use crate::toggle::{self, RecipeCollection};

    fn amount(id: i32, amount: i32) -> IngredientAmountWrite {
        IngredientAmountWrite { id, amount }
    }

    fn write(ingredients: Vec<IngredientAmountWrite>) -> RecipeWrite {
        RecipeWrite {
            ingredients,
            image: "data:image/png;base64,AAAA".to_string(),
            name: "Pancakes".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
        }
    }

    fn ingredient_errors(result: Result<RecipeRead>) -> Vec<String> {
        match result {
            Err(ServiceError::Validation(mut fields)) => {
                fields.remove(INGREDIENTS_FIELD).unwrap_or_default()
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("yes")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(Some("False")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_validate_ingredients_rules() {
        assert!(validate_ingredients(&[amount(1, 1)]).is_ok());
        assert!(validate_ingredients(&[]).is_err());
        assert!(validate_ingredients(&[amount(1, 1), amount(1, 2)]).is_err());
        assert!(validate_ingredients(&[amount(1, 0)]).is_err());
        assert!(validate_ingredients(&[amount(1, -5)]).is_err());
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let flour = new_ingredient(&db, "Flour", "g").await.unwrap();
        let egg = new_ingredient(&db, "Egg", "pcs").await.unwrap();

        let created = create(&db, ann.id, write(vec![amount(flour.id, 200), amount(egg.id, 2)]))
            .await
            .unwrap();
        assert_eq!(created.author.id, ann.id);
        assert!(!created.is_favorited);
        assert!(!created.is_in_shopping_cart);

        let items: Vec<(i32, i32)> = created.ingredients.iter().map(|i| (i.id, i.amount)).collect();
        assert_eq!(items, vec![(egg.id, 2), (flour.id, 200)]);

        let fetched = get(&db, None, created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_ingredient_lists() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let flour = new_ingredient(&db, "Flour", "g").await.unwrap();

        assert!(!ingredient_errors(create(&db, ann.id, write(vec![])).await).is_empty());
        assert!(
            !ingredient_errors(
                create(&db, ann.id, write(vec![amount(flour.id, 1), amount(flour.id, 3)])).await
            )
            .is_empty()
        );
        assert!(
            !ingredient_errors(create(&db, ann.id, write(vec![amount(flour.id, 0)])).await)
                .is_empty()
        );
        assert!(
            !ingredient_errors(create(&db, ann.id, write(vec![amount(999, 1)])).await).is_empty()
        );

        assert_eq!(recipe::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_line_items() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let flour = new_ingredient(&db, "Flour", "g").await.unwrap();
        let milk = new_ingredient(&db, "Milk", "ml").await.unwrap();
        let created = create(&db, ann.id, write(vec![amount(flour.id, 200)]))
            .await
            .unwrap();

        let mut replacement = write(vec![amount(milk.id, 300)]);
        replacement.name = "Milkshake".to_string();
        let updated = update(&db, ann.id, created.id, replacement).await.unwrap();

        assert_eq!(updated.name, "Milkshake");
        let items: Vec<(i32, i32)> = updated.ingredients.iter().map(|i| (i.id, i.amount)).collect();
        assert_eq!(items, vec![(milk.id, 300)]);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous_line_items() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let flour = new_ingredient(&db, "Flour", "g").await.unwrap();
        let created = create(&db, ann.id, write(vec![amount(flour.id, 200)]))
            .await
            .unwrap();

        let result = update(&db, ann.id, created.id, write(vec![amount(999, 1)])).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let fetched = get(&db, None, created.id).await.unwrap();
        assert_eq!(fetched.ingredients.len(), 1);
        assert_eq!(fetched.ingredients[0].amount, 200);
    }

    #[tokio::test]
    async fn test_patch_keeps_missing_header_fields() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let flour = new_ingredient(&db, "Flour", "g").await.unwrap();
        let created = create(&db, ann.id, write(vec![amount(flour.id, 200)]))
            .await
            .unwrap();

        let patched = patch(
            &db,
            ann.id,
            created.id,
            RecipePatch {
                ingredients: vec![amount(flour.id, 250)],
                image: None,
                name: None,
                text: None,
                cooking_time: Some(25),
            },
        )
        .await
        .unwrap();

        assert_eq!(patched.name, created.name);
        assert_eq!(patched.text, created.text);
        assert_eq!(patched.cooking_time, 25);
        assert_eq!(patched.ingredients[0].amount, 250);
    }

    #[tokio::test]
    async fn test_only_author_may_modify() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let bob = new_user(&db, "bob").await.unwrap();
        let flour = new_ingredient(&db, "Flour", "g").await.unwrap();
        let created = create(&db, ann.id, write(vec![amount(flour.id, 200)]))
            .await
            .unwrap();

        let result = update(&db, bob.id, created.id, write(vec![amount(flour.id, 1)])).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
        let result = delete(&db, bob.id, created.id).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
        let result = delete(&db, bob.id, 999).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        delete(&db, ann.id, created.id).await.unwrap();
        assert!(matches!(
            get(&db, None, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_flags() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let bob = new_user(&db, "bob").await.unwrap();
        let soup = new_recipe(&db, &ann, "Soup", &[]).await.unwrap();
        let pie = new_recipe(&db, &bob, "Pie", &[]).await.unwrap();
        let cake = new_recipe(&db, &bob, "Cake", &[]).await.unwrap();

        toggle::add(&db, RecipeCollection::Favorites, ann.id, pie.id)
            .await
            .unwrap();
        add_to_cart(&db, &ann, &cake).await.unwrap();

        let all = list(&db, None, RecipeFilter::default()).await.unwrap();
        let ids: Vec<i32> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![cake.id, pie.id, soup.id]);
        assert!(all.iter().all(|r| !r.is_favorited && !r.is_in_shopping_cart));

        let favorites = RecipeFilter {
            is_favorited: true,
            ..Default::default()
        };
        let found = list(&db, Some(ann.id), favorites).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, pie.id);
        assert!(found[0].is_favorited);

        // Anonymous callers get the unfiltered listing.
        assert_eq!(list(&db, None, favorites).await.unwrap().len(), 3);

        let cart = RecipeFilter {
            is_in_shopping_cart: true,
            ..Default::default()
        };
        let found = list(&db, Some(ann.id), cart).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].is_in_shopping_cart);

        let by_bob = RecipeFilter {
            author: Some(bob.id),
            ..Default::default()
        };
        let found = list(&db, Some(ann.id), by_bob).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.author.id == bob.id));
    }

    #[tokio::test]
    async fn test_short_link() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let soup = new_recipe(&db, &ann, "Soup", &[]).await.unwrap();

        let link = short_link(&db, "https://foodgram.example/", soup.id)
            .await
            .unwrap();
        assert_eq!(
            link.short_link,
            format!("https://foodgram.example/recipes/{}/", soup.id)
        );
        assert!(matches!(
            short_link(&db, "https://foodgram.example", 999).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
