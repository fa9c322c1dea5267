pub mod app;
pub mod auth;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod traq;
pub mod utils;

mod test_utils;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
