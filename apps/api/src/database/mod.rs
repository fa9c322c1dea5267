pub mod albums;
pub mod images;
pub mod migration;
mod pool;
pub mod queries;
pub mod schema;
pub mod users;

pub use migration::run_migrations;
pub use pool::*;
pub use schema::init_database;
