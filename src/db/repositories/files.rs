use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

use crate::db::{
    connection::Database,
    helpers::get_datetime,
    models::{validation::validate_image, FileInput, StoredFile},
};

/// Insert an image inside an existing connection or transaction.
pub(crate) fn insert_file(conn: &Connection, input: FileInput) -> Result<StoredFile> {
    validate_image(&input.mime_type, &input.data)?;
    let now = Utc::now();

    conn.execute(
        "INSERT INTO campaign_file (title, mime_type, data, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![input.title, input.mime_type, input.data, now.to_rfc3339()],
    )
    .with_context(|| format!("failed to store file '{}'", input.title))?;

    Ok(StoredFile {
        id: conn.last_insert_rowid(),
        title: input.title,
        mime_type: input.mime_type,
        data: input.data,
        created_at: now,
    })
}

impl Database {
    pub async fn store_file(&self, input: FileInput) -> Result<StoredFile> {
        self.execute(move |conn| insert_file(conn, input)).await
    }

    pub async fn find_file(&self, file_id: i64) -> Result<Option<StoredFile>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_file, title, mime_type, data, created_at
                 FROM campaign_file
                 WHERE id_file = ?1",
            )?;

            let mut rows = stmt.query(params![file_id])?;
            let file = match rows.next()? {
                Some(row) => Some(StoredFile {
                    id: row.get("id_file")?,
                    title: row.get("title")?,
                    mime_type: row.get("mime_type")?,
                    data: row.get("data")?,
                    created_at: get_datetime(row, "created_at")?,
                }),
                None => None,
            };
            Ok(file)
        })
        .await
    }

    pub async fn delete_file(&self, file_id: i64) -> Result<()> {
        self.execute(move |conn| {
            conn.execute("DELETE FROM campaign_file WHERE id_file = ?1", params![file_id])?;
            Ok(())
        })
        .await
    }
}
