use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::auth::AppState;
use crate::database::{get_connection, users};
use crate::error::{AppError, AppResult};
use crate::models::{User, UserCreateRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user))
}

async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let conn = get_connection(&state.pool)?;
    Ok(Json(users::get_users(&conn)?))
}

async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<UserCreateRequest>, AppError>,
) -> AppResult<(StatusCode, Json<User>)> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    let conn = get_connection(&state.pool)?;
    let user = users::create_user(&conn, request)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Json<User>> {
    let conn = get_connection(&state.pool)?;
    Ok(Json(users::get_user(&conn, id)?))
}
