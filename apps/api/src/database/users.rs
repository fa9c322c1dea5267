use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::database::albums::uuid_column;
use crate::database::{fetch_all, fetch_one, queries};
use crate::error::{AppError, AppResult};
use crate::models::{User, UserCreateRequest};

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        email: row.get(2)?,
    })
}

pub fn get_users(conn: &Connection) -> AppResult<Vec<User>> {
    fetch_all(conn, queries::users::SELECT_ALL, &[], map_user)
        .map_err(|e| AppError::query("select users", e))
}

pub fn create_user(conn: &Connection, req: UserCreateRequest) -> AppResult<User> {
    let user = User {
        id: Uuid::new_v4(),
        name: req.name,
        email: req.email,
    };

    conn.execute(
        queries::users::INSERT,
        rusqlite::params![user.id.to_string(), user.name, user.email],
    )
    .map_err(|e| AppError::query(format!("insert user (id={})", user.id), e))?;

    Ok(user)
}

pub fn get_user(conn: &Connection, user_id: Uuid) -> AppResult<User> {
    fetch_one(
        conn,
        queries::users::SELECT_BY_ID,
        &[&user_id.to_string()],
        map_user,
    )
    .map_err(|e| AppError::query(format!("get user (id={})", user_id), e))?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
