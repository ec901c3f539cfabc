//! Transport-layer types shared between the service layer and the HTTP handlers.
//!
//! Every endpoint gets its own named shape: `*Write` types are what clients
//! submit, `*Read` types are what the API returns. Nothing switches its
//! serialized form based on the operation being performed.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Characters allowed in a username besides letters and digits.
pub const USERNAME_EXTRA_CHARS: &str = ".@+-_";

// ===================== Users =====================

/// Public representation of a user, relative to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserRead {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller is subscribed to this user (false for anonymous callers).
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

/// Request body for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Validate)]
pub struct UserWrite {
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: String,
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1 to 150 characters long."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(length(min = 1, max = 150, message = "First name must be 1 to 150 characters long."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150, message = "Last name must be 1 to 150 characters long."))]
    pub last_name: String,
}

/// Usernames are restricted to letters, digits and `. @ + - _`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || USERNAME_EXTRA_CHARS.contains(c));
    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_username");
        error.message =
            Some("Username may contain only letters, digits and . @ + - _ characters.".into());
        Err(error)
    }
}

/// Request body for setting the caller's avatar.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Validate)]
pub struct AvatarWrite {
    /// Image reference on the content store (for example a `data:image/...` URI).
    #[validate(length(min = 1, message = "Avatar must not be empty."))]
    pub avatar: String,
}

/// Avatar response model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AvatarRead {
    pub avatar: Option<String>,
}

/// A subscribed author together with their recipes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SubscriptionRead {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Always true: the caller is subscribed to every author in this listing.
    pub is_subscribed: bool,
    pub avatar: Option<String>,
    /// The author's recipes, newest first, optionally truncated by `recipes_limit`.
    pub recipes: Vec<RecipeMinified>,
    /// Total number of recipes by this author, regardless of truncation.
    pub recipes_count: u64,
}

// ===================== Ingredients =====================

/// Ingredient catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IngredientRead {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

/// One entry of an ingredient import file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientImport {
    pub name: String,
    pub measurement_unit: String,
}

// ===================== Recipes =====================

/// A `{id, amount}` pair submitted as part of a recipe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IngredientAmountWrite {
    /// Ingredient ID from the catalog
    pub id: i32,
    /// Quantity in the ingredient's unit, at least 1
    pub amount: i32,
}

/// Request body for creating or fully replacing a recipe.
///
/// The author is never part of the body; it is the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Validate)]
pub struct RecipeWrite {
    pub ingredients: Vec<IngredientAmountWrite>,
    #[validate(length(min = 1, message = "Image must not be empty."))]
    pub image: String,
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters long."))]
    pub name: String,
    #[validate(length(min = 1, message = "Text must not be empty."))]
    pub text: String,
    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute."))]
    pub cooking_time: i32,
}

/// Request body for a partial recipe update.
///
/// Header fields are optional, but the ingredient list is always replaced as a
/// whole and therefore required.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Validate)]
pub struct RecipePatch {
    pub ingredients: Vec<IngredientAmountWrite>,
    #[validate(length(min = 1, message = "Image must not be empty."))]
    pub image: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters long."))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Text must not be empty."))]
    pub text: Option<String>,
    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute."))]
    pub cooking_time: Option<i32>,
}

/// An expanded recipe line item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecipeIngredientRead {
    /// Ingredient ID
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe representation, relative to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecipeRead {
    pub id: i32,
    pub author: UserRead,
    pub ingredients: Vec<RecipeIngredientRead>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Reduced recipe projection used in favorites, cart and subscription listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecipeMinified {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Shareable link to a recipe page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ShortLink {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

// ===================== Shopping list =====================

/// One aggregated shopping list line: the summed amount of an ingredient
/// identified by its `(name, measurement_unit)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_write(username: &str) -> UserWrite {
        UserWrite {
            email: "cook@example.com".to_string(),
            username: username.to_string(),
            first_name: "Ann".to_string(),
            last_name: "Cook".to_string(),
        }
    }

    #[test]
    fn test_username_charset() {
        assert!(user_write("ann.cook+1@home_-").validate().is_ok());
        assert!(user_write("анна").validate().is_ok());

        let errors = user_write("ann cook").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));

        let errors = user_write("ann#cook").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_user_email_must_be_valid() {
        let mut request = user_write("ann");
        request.email = "not-an-email".to_string();

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_recipe_write_minimums() {
        let mut recipe = RecipeWrite {
            ingredients: vec![IngredientAmountWrite { id: 1, amount: 1 }],
            image: "data:image/png;base64,AAAA".to_string(),
            name: "Soup".to_string(),
            text: "Boil.".to_string(),
            cooking_time: 1,
        };
        assert!(recipe.validate().is_ok());

        recipe.cooking_time = 0;
        let errors = recipe.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cooking_time"));

        recipe.cooking_time = 10;
        recipe.name = "x".repeat(201);
        let errors = recipe.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_recipe_patch_skips_absent_fields() {
        let patch = RecipePatch {
            ingredients: vec![],
            image: None,
            name: None,
            text: None,
            cooking_time: None,
        };
        assert!(patch.validate().is_ok());

        let patch = RecipePatch {
            cooking_time: Some(0),
            ..patch
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_short_link_serializes_with_dash() {
        let link = ShortLink {
            short_link: "http://localhost/recipes/1/".to_string(),
        };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["short-link"], "http://localhost/recipes/1/");
    }
}
