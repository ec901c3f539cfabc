//! Business rules of the recipe platform, on top of the `model` entities.

pub mod error;
pub mod ingredients;
pub mod recipes;
pub mod shopping_list;
pub mod subscriptions;
pub mod toggle;
pub mod users;

#[cfg(test)]
mod testing;

pub use error::{Result, ServiceError};
