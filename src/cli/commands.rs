pub mod import_ingredients;
pub mod initdb;
pub mod migrate_and_serve;
pub mod serve;

pub use import_ingredients::import_ingredients;
pub use initdb::init_database;
pub use migrate_and_serve::migrate_and_serve;
pub use serve::serve;
