use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{types::Type, Connection, Row, ToSql};
use uuid::Uuid;

use crate::constants::{DEFAULT_ALBUM_LIMIT, MAX_ALBUM_LIMIT};
use crate::database::{fetch_all, fetch_one, queries};
use crate::error::{AppError, AppResult};
use crate::models::{Album, AlbumFilter, AlbumItem, PostAlbumParams, UpdateAlbumParams};
use crate::utils::datetime::{format_timestamp, parse_rfc3339};

/// Page size for an album listing: 20 when unset, and anything outside
/// `(0, 100)` becomes 100.
pub fn effective_limit(limit: Option<i64>) -> i64 {
    match limit {
        None => DEFAULT_ALBUM_LIMIT,
        Some(n) if n > 0 && n < MAX_ALBUM_LIMIT => n,
        Some(_) => MAX_ALBUM_LIMIT,
    }
}

pub(crate) fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_rfc3339(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {}", raw).into(),
        )
    })
}

fn map_album_item(row: &Row<'_>) -> rusqlite::Result<AlbumItem> {
    Ok(AlbumItem {
        id: uuid_column(row, 0)?,
        title: row.get(1)?,
        creator: row.get(2)?,
    })
}

pub fn get_albums(conn: &Connection, filter: &AlbumFilter) -> AppResult<Vec<AlbumItem>> {
    let mut sql = queries::albums::SELECT_ITEMS.trim_end().to_string();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(ref creator) = filter.creator_id {
        sql.push_str(" AND creator = ?");
        params.push(Box::new(creator.clone()));
    }
    if let Some(ref after) = filter.after_date {
        sql.push_str(" AND created_at >= ?");
        params.push(Box::new(format_timestamp(after)));
    }
    if let Some(ref before) = filter.before_date {
        sql.push_str(" AND created_at <= ?");
        params.push(Box::new(format_timestamp(before)));
    }

    sql.push_str(" ORDER BY created_at DESC LIMIT ?");
    params.push(Box::new(effective_limit(filter.limit)));

    if let Some(offset) = filter.offset {
        sql.push_str(" OFFSET ?");
        params.push(Box::new(offset));
    }

    let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
    fetch_all(conn, &sql, &param_refs, map_album_item)
        .map_err(|e| AppError::query("select album items", e))
}

pub fn get_album(conn: &Connection, album_id: Uuid) -> AppResult<Album> {
    let id = album_id.to_string();

    let album = fetch_one(conn, queries::albums::SELECT_BY_ID, &[&id], |row| {
        Ok(Album {
            id: uuid_column(row, 0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            creator: row.get(3)?,
            images: Vec::new(),
            created_at: timestamp_column(row, 4)?,
            updated_at: timestamp_column(row, 5)?,
        })
    })
    .map_err(|e| AppError::query(format!("get album (id={})", album_id), e))?
    .ok_or_else(|| AppError::NotFound("Album not found".to_string()))?;

    let images = fetch_all(conn, queries::albums::SELECT_IMAGES, &[&id], |row| {
        uuid_column(row, 0)
    })
    .map_err(|e| AppError::query(format!("get album images (id={})", album_id), e))?;

    Ok(Album { images, ..album })
}

fn insert_album_images(conn: &Connection, album_id: Uuid, images: &[Uuid]) -> AppResult<()> {
    let mut stmt = conn
        .prepare(queries::albums::INSERT_IMAGE)
        .map_err(|e| AppError::query(format!("insert album images (id={})", album_id), e))?;

    let album = album_id.to_string();
    for image in images {
        stmt.execute([Uuid::new_v4().to_string(), album.clone(), image.to_string()])
            .map_err(|e| {
                AppError::query(
                    format!("insert album image (id={}, image={})", album_id, image),
                    e,
                )
            })?;
    }
    Ok(())
}

/// Creates the album and its image set in one transaction.
pub fn post_album(conn: &mut Connection, params: PostAlbumParams) -> AppResult<Album> {
    post_album_at(conn, params, Utc::now())
}

pub(crate) fn post_album_at(
    conn: &mut Connection,
    params: PostAlbumParams,
    now: DateTime<Utc>,
) -> AppResult<Album> {
    let now = now.trunc_subsecs(6);
    let album = Album {
        id: Uuid::new_v4(),
        title: params.title,
        description: params.description,
        creator: params.creator,
        images: params.images,
        created_at: now,
        updated_at: now,
    };
    let timestamp = format_timestamp(&now);

    let tx = conn.transaction()?;
    tx.execute(
        queries::albums::INSERT,
        rusqlite::params![
            album.id.to_string(),
            album.title,
            album.description,
            album.creator,
            timestamp,
            timestamp,
        ],
    )
    .map_err(|e| AppError::query(format!("insert album (id={})", album.id), e))?;

    insert_album_images(&tx, album.id, &album.images)?;
    tx.commit()?;

    Ok(album)
}

/// Partial update. A supplied image set replaces the existing one.
pub fn update_album(
    conn: &mut Connection,
    album_id: Uuid,
    params: UpdateAlbumParams,
) -> AppResult<()> {
    if album_id.is_nil() {
        return Err(AppError::Validation("invalid album id".to_string()));
    }
    if params.is_empty() {
        return Err(AppError::NoFieldsToUpdate);
    }

    let mut updates = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(title) = params.title {
        updates.push("title = ?");
        values.push(Box::new(title));
    }
    if let Some(description) = params.description {
        updates.push("description = ?");
        values.push(Box::new(description));
    }
    updates.push("updated_at = ?");
    values.push(Box::new(format_timestamp(&Utc::now())));
    values.push(Box::new(album_id.to_string()));

    let sql = format!("UPDATE albums SET {} WHERE id = ?", updates.join(", "));
    let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

    let tx = conn.transaction()?;
    let affected = tx
        .execute(&sql, param_refs.as_slice())
        .map_err(|e| AppError::query(format!("update album (id={})", album_id), e))?;
    if affected == 0 {
        return Err(AppError::NotFound("Album not found".to_string()));
    }

    if let Some(images) = params.images {
        tx.execute(queries::albums::DELETE_IMAGES, [album_id.to_string()])
            .map_err(|e| AppError::query(format!("delete album images (id={})", album_id), e))?;
        insert_album_images(&tx, album_id, &images)?;
    }

    tx.commit()?;
    Ok(())
}

/// Image associations go with the album through `ON DELETE CASCADE`.
pub fn delete_album(conn: &Connection, album_id: Uuid) -> AppResult<()> {
    if album_id.is_nil() {
        return Err(AppError::Validation("invalid album id".to_string()));
    }

    let affected = conn
        .execute(queries::albums::DELETE, [album_id.to_string()])
        .map_err(|e| AppError::query(format!("delete album (id={})", album_id), e))?;

    if affected == 0 {
        return Err(AppError::NotFound("Album not found".to_string()));
    }
    Ok(())
}
