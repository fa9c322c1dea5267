use rusqlite::Connection;
use uuid::Uuid;

use crate::database::albums::uuid_column;
use crate::database::{fetch_one, queries};
use crate::error::{AppError, AppResult};

/// Registers a bare image id. Image bytes live on the platform.
pub fn post_image(conn: &Connection, id: Uuid) -> AppResult<Uuid> {
    conn.execute(queries::images::INSERT, [id.to_string()])
        .map_err(|e| AppError::query(format!("insert image (id={})", id), e))?;
    Ok(id)
}

pub fn get_image(conn: &Connection, image_id: Uuid) -> AppResult<Uuid> {
    fetch_one(
        conn,
        queries::images::SELECT_BY_ID,
        &[&image_id.to_string()],
        |row| uuid_column(row, 0),
    )
    .map_err(|e| AppError::query(format!("get image (id={})", image_id), e))?
    .ok_or_else(|| AppError::NotFound("Image not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_db;

    #[test]
    fn test_post_then_get_image() {
        let pool = create_test_db();
        let conn = pool.get().unwrap();

        let id = post_image(&conn, Uuid::new_v4()).unwrap();
        assert_eq!(get_image(&conn, id).unwrap(), id);
        assert!(matches!(
            get_image(&conn, Uuid::new_v4()).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn test_post_duplicate_image_fails() {
        let pool = create_test_db();
        let conn = pool.get().unwrap();

        let id = post_image(&conn, Uuid::new_v4()).unwrap();
        assert!(matches!(
            post_image(&conn, id).unwrap_err(),
            AppError::Query { .. }
        ));
    }
}
