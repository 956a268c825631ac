pub mod categories;
pub mod repo;
pub mod schema;
pub mod store;
