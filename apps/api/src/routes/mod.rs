mod albums;
mod auth;
mod images;
mod traq;
mod users;

use axum::Router;
use crate::auth::AppState;

/// Routes mounted under `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(albums::router())
        .merge(users::router())
        .merge(images::router())
        .merge(traq::router())
}

/// OAuth flow, mounted under `/api/auth`.
pub fn auth_router() -> Router<AppState> {
    auth::router()
}
