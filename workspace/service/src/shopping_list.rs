//! Shopping list aggregation over a user's cart.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::ShoppingListItem;
use model::entities::{ingredient, recipe_ingredient, shopping_cart_entry};
use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, instrument};

use crate::error::Result;

pub const TITLE: &str = "Shopping list";

/// One recipe line item resolved to its ingredient's name and unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Rendered report ready to be served as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingList {
    pub file_name: String,
    pub body: String,
    pub items: Vec<ShoppingListItem>,
}

/// Sums amounts per `(name, measurement_unit)`.
///
/// Pairs with different units never merge. The result is ordered by name in
/// code-point order, then by unit.
pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for line in lines {
        *totals.entry((line.name, line.measurement_unit)).or_insert(0) += i64::from(line.amount);
    }
    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| ShoppingListItem {
            name,
            measurement_unit,
            amount,
        })
        .collect()
}

/// Plain-text report: title, generation time, a blank line, then one line per item.
pub fn render(items: &[ShoppingListItem], generated_at: DateTime<Utc>) -> String {
    let header = format!(
        "{}\nDate: {}\n\n",
        TITLE,
        generated_at.format("%d.%m.%Y %H:%M")
    );
    let lines: String = items
        .iter()
        .map(|item| format!("{} ({}) — {}\n", item.name, item.measurement_unit, item.amount))
        .collect();
    header + &lines
}

pub fn file_name(generated_at: DateTime<Utc>) -> String {
    format!("shopping_list_{}.txt", generated_at.format("%d%m%Y_%H%M"))
}

/// Builds the shopping list for every recipe in the user's cart.
#[instrument(skip(db))]
pub async fn build(
    db: &DatabaseConnection,
    user_id: i32,
    generated_at: DateTime<Utc>,
) -> Result<ShoppingList> {
    let rows = recipe_ingredient::Entity::find()
        .filter(
            recipe_ingredient::Column::RecipeId.in_subquery(
                Query::select()
                    .column(shopping_cart_entry::Column::RecipeId)
                    .from(shopping_cart_entry::Entity)
                    .and_where(shopping_cart_entry::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        )
        .find_also_related(ingredient::Entity)
        .all(db)
        .await?;
    debug!("Aggregating {} line items for user {}", rows.len(), user_id);

    let lines = rows.into_iter().filter_map(|(line, ingredient)| {
        ingredient.map(|i| CartLine {
            name: i.name,
            measurement_unit: i.measurement_unit,
            amount: line.amount,
        })
    });
    let items = aggregate(lines);

    Ok(ShoppingList {
        file_name: file_name(generated_at),
        body: render(&items, generated_at),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{add_to_cart, new_ingredient, new_recipe, new_user, setup_db};
    use chrono::TimeZone;

    fn line(name: &str, unit: &str, amount: i32) -> CartLine {
        CartLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    fn item(name: &str, unit: &str, amount: i64) -> ShoppingListItem {
        ShoppingListItem {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 7, 0).unwrap()
    }

    #[test]
    fn test_same_unit_amounts_are_summed() {
        let items = aggregate(vec![line("Sugar", "g", 100), line("Sugar", "g", 50)]);
        assert_eq!(items, vec![item("Sugar", "g", 150)]);
    }

    #[test]
    fn test_different_units_stay_separate() {
        let items = aggregate(vec![line("Sugar", "kg", 1), line("Sugar", "g", 100)]);
        assert_eq!(items, vec![item("Sugar", "g", 100), item("Sugar", "kg", 1)]);
    }

    #[test]
    fn test_render_report() {
        let items = aggregate(vec![
            line("Flour", "g", 200),
            line("Milk", "ml", 300),
            line("Egg", "pcs", 2),
            line("Flour", "g", 100),
        ]);
        let body = render(&items, noon());
        assert_eq!(
            body,
            "Shopping list\nDate: 05.03.2024 12:07\n\nEgg (pcs) — 2\nFlour (g) — 300\nMilk (ml) — 300\n"
        );
        assert_eq!(file_name(noon()), "shopping_list_05032024_1207.txt");
    }

    #[test]
    fn test_empty_cart_renders_header_only() {
        let body = render(&[], noon());
        assert_eq!(body, "Shopping list\nDate: 05.03.2024 12:07\n\n");
    }

    #[tokio::test]
    async fn test_build_covers_only_cart_recipes() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let sugar = new_ingredient(&db, "Sugar", "g").await.unwrap();
        let egg = new_ingredient(&db, "Egg", "pcs").await.unwrap();

        let cake = new_recipe(&db, &ann, "Cake", &[(&sugar, 100), (&egg, 3)])
            .await
            .unwrap();
        let tea = new_recipe(&db, &ann, "Tea", &[(&sugar, 50)]).await.unwrap();
        new_recipe(&db, &ann, "Omelette", &[(&egg, 4)]).await.unwrap();

        add_to_cart(&db, &ann, &cake).await.unwrap();
        add_to_cart(&db, &ann, &tea).await.unwrap();

        let list = build(&db, ann.id, noon()).await.unwrap();
        assert_eq!(list.items, vec![item("Egg", "pcs", 3), item("Sugar", "g", 150)]);
        assert!(list.body.ends_with("Egg (pcs) — 3\nSugar (g) — 150\n"));
    }
}
