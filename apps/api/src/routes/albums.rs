use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{AppState, ForwardedUser};
use crate::database::{albums, get_connection};
use crate::error::{AppError, AppResult};
use crate::models::{
    Album, AlbumCreateRequest, AlbumFilter, AlbumItem, AlbumListQuery, AlbumUpdateRequest,
    PostAlbumParams, UpdateAlbumParams,
};
use crate::utils::datetime::parse_rfc3339;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/albums", get(list_albums).post(create_album))
        .route(
            "/albums/:id",
            get(get_album)
                .patch(update_album)
                .put(update_album)
                .delete(delete_album),
        )
}

fn parse_date(value: Option<String>, field: &str) -> AppResult<Option<DateTime<Utc>>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_rfc3339(raw)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Invalid {}", field))),
    }
}

fn parse_int(value: Option<String>, field: &str) -> AppResult<Option<i64>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Invalid {}", field))),
    }
}

impl TryFrom<AlbumListQuery> for AlbumFilter {
    type Error = AppError;

    fn try_from(query: AlbumListQuery) -> AppResult<Self> {
        Ok(AlbumFilter {
            creator_id: query.creator_id.filter(|c| !c.is_empty()),
            before_date: parse_date(query.before_date, "before date")?,
            after_date: parse_date(query.after_date, "after date")?,
            // Out-of-range limits are clamped by the query layer.
            limit: parse_int(query.limit, "limit")?,
            offset: match parse_int(query.offset, "offset")? {
                Some(n) if n < 0 => return Err(AppError::Validation("Invalid offset".to_string())),
                offset => offset,
            },
        })
    }
}

/// Blank entries are skipped; anything else must be a UUID.
fn parse_image_ids(raw: Vec<String>) -> AppResult<Vec<Uuid>> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| AppError::Validation(format!("invalid image id: {}", s)))
        })
        .collect()
}

async fn list_albums(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AlbumListQuery>, AppError>,
) -> AppResult<Json<Vec<AlbumItem>>> {
    let filter = AlbumFilter::try_from(query)?;
    let conn = get_connection(&state.pool)?;
    Ok(Json(albums::get_albums(&conn, &filter)?))
}

async fn get_album(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Json<Album>> {
    let conn = get_connection(&state.pool)?;
    Ok(Json(albums::get_album(&conn, id)?))
}

async fn create_album(
    State(state): State<AppState>,
    ForwardedUser(creator): ForwardedUser,
    WithRejection(Json(request), _): WithRejection<Json<AlbumCreateRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Album>)> {
    let params = PostAlbumParams {
        title: request.title,
        description: request.description,
        creator,
        images: parse_image_ids(request.images)?,
    };

    let mut conn = get_connection(&state.pool)?;
    let album = albums::post_album(&mut conn, params)?;
    tracing::info!("Album {} created by {}", album.id, album.creator);

    Ok((StatusCode::CREATED, Json(album)))
}

async fn update_album(
    State(state): State<AppState>,
    ForwardedUser(_user): ForwardedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<AlbumUpdateRequest>, AppError>,
) -> AppResult<Json<Album>> {
    let params = UpdateAlbumParams {
        title: request.title,
        description: request.description,
        images: request.images.map(parse_image_ids).transpose()?,
    };

    let mut conn = get_connection(&state.pool)?;
    albums::update_album(&mut conn, id, params)?;
    Ok(Json(albums::get_album(&conn, id)?))
}

async fn delete_album(
    State(state): State<AppState>,
    ForwardedUser(user): ForwardedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<StatusCode> {
    let conn = get_connection(&state.pool)?;
    albums::delete_album(&conn, id)?;
    tracing::info!("Album {} deleted by {}", id, user);
    Ok(StatusCode::NO_CONTENT)
}
