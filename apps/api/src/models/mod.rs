mod album;
mod auth;
mod image;
mod search;
mod user;

pub use album::*;
pub use auth::*;
pub use image::*;
pub use search::*;
pub use user::*;
