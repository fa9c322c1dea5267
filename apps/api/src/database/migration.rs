use rusqlite::Connection;

use crate::error::AppResult;

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

const CREATE_SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
)
"#;

const CREATE_ALBUM_IMAGES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_album_images_album ON album_images(album_id)";

const CREATE_ALBUMS_CREATED_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_albums_created_at ON albums(created_at)";

const CREATE_ALBUMS_CREATOR_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_albums_creator ON albums(creator, created_at)";

fn table_exists(conn: &Connection, table: &str) -> AppResult<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn get_schema_version(conn: &Connection) -> AppResult<i32> {
    if !table_exists(conn, "schema_version")? {
        return Ok(0);
    }

    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })
        .ok()
        .flatten();

    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i32) -> AppResult<()> {
    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(CREATE_SCHEMA_VERSION_TABLE)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        record_migration(conn, 1)?;
    }

    Ok(())
}

/// Migration v1: lookup indexes for album listing and image sets
fn migrate_v1(conn: &Connection) -> AppResult<()> {
    conn.execute(CREATE_ALBUM_IMAGES_INDEX, [])?;
    conn.execute(CREATE_ALBUMS_CREATED_INDEX, [])?;
    conn.execute(CREATE_ALBUMS_CREATOR_INDEX, [])?;
    Ok(())
}
