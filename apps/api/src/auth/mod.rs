pub mod cookies;
mod extractors;
pub mod pkce;

pub use extractors::{AppState, ForwardedUser, TraqToken};
