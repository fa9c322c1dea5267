pub mod albums {
    /// Filters, ordering and paging are appended by `database::albums::get_albums`.
    pub const SELECT_ITEMS: &str = r#"
    SELECT id
         , title
         , creator
      FROM albums
     WHERE 1 = 1
    "#;

    pub const SELECT_BY_ID: &str = r#"
    SELECT id
         , title
         , description
         , creator
         , created_at
         , updated_at
      FROM albums
     WHERE id = ?
    "#;

    pub const INSERT: &str = r#"
    INSERT INTO albums (
        id
      , title
      , description
      , creator
      , created_at
      , updated_at
    ) VALUES (?, ?, ?, ?, ?, ?)
    "#;

    pub const DELETE: &str = r#"
    DELETE FROM albums
     WHERE id = ?
    "#;

    pub const SELECT_IMAGES: &str = r#"
    SELECT image_id
      FROM album_images
     WHERE album_id = ?
     ORDER BY rowid
    "#;

    pub const INSERT_IMAGE: &str = r#"
    INSERT INTO album_images (
        id
      , album_id
      , image_id
    ) VALUES (?, ?, ?)
    "#;

    pub const DELETE_IMAGES: &str = r#"
    DELETE FROM album_images
     WHERE album_id = ?
    "#;
}

pub mod images {
    pub const INSERT: &str = r#"
    INSERT INTO images (id) VALUES (?)
    "#;

    pub const SELECT_BY_ID: &str = r#"
    SELECT id
      FROM images
     WHERE id = ?
    "#;
}

pub mod users {
    pub const SELECT_ALL: &str = r#"
    SELECT id
         , name
         , email
      FROM users
     ORDER BY name
    "#;

    pub const SELECT_BY_ID: &str = r#"
    SELECT id
         , name
         , email
      FROM users
     WHERE id = ?
    "#;

    pub const INSERT: &str = r#"
    INSERT INTO users (
        id
      , name
      , email
    ) VALUES (?, ?, ?)
    "#;
}
