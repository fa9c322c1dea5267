use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::{Query, WithRejection};
use uuid::Uuid;

use crate::auth::{AppState, TraqToken};
use crate::error::{AppError, AppResult};
use crate::models::{MessageSearchParams, MessageSearchQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/traq/files/:uuid", get(get_file))
        .route("/traq/files/:uuid/thumbnail", get(get_file_thumbnail))
        .route("/traq/users/:id", get(get_user))
        .route("/traq/messages", get(search_messages))
}

async fn get_file(
    State(state): State<AppState>,
    TraqToken(token): TraqToken,
    WithRejection(Path(file_id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Response> {
    let upstream = state.traq.fetch_file(&token, file_id).await?;
    Ok(upstream.into_response())
}

async fn get_file_thumbnail(
    State(state): State<AppState>,
    TraqToken(token): TraqToken,
    WithRejection(Path(file_id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Response> {
    let upstream = state.traq.fetch_file_thumbnail(&token, file_id).await?;
    Ok(upstream.into_response())
}

async fn get_user(
    State(state): State<AppState>,
    TraqToken(token): TraqToken,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Response> {
    let upstream = state.traq.fetch_user(&token, user_id).await?;
    Ok(upstream.into_response())
}

/// Upstream status and body are returned as-is, errors included.
async fn search_messages(
    State(state): State<AppState>,
    TraqToken(token): TraqToken,
    WithRejection(Query(query), _): WithRejection<Query<MessageSearchQuery>, AppError>,
) -> AppResult<Response> {
    let params = MessageSearchParams::from(query);
    let response = state.traq.search_messages(&token, &params).await?;
    if let Some(ref failure) = response.failure {
        tracing::warn!("{}", failure);
    }

    Ok((
        response.status,
        [(CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response())
}
