pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod users;
