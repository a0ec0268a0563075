//! Note repository implementation.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use nimbus_core::{Error, NoteRecord, NoteRepository, Result};

/// PostgreSQL implementation of NoteRepository.
///
/// Every query filters by `user_id`; the repository never exposes a
/// path to another owner's rows, even given a valid foreign id.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const NOTE_COLUMNS: &str =
    "id, user_id, title, content, folder, local_id, updated_at, last_modified, links";

fn map_row(row: sqlx::postgres::PgRow) -> NoteRecord {
    let links: Json<Vec<String>> = row.get("links");
    NoteRecord {
        id: row.get("id"),
        owner_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        folder: row.get("folder"),
        local_id: row.get("local_id"),
        updated_at: row.get("updated_at"),
        last_modified: row.get("last_modified"),
        links: links.0,
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list(&self, owner_id: &str) -> Result<Vec<NoteRecord>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM note
            WHERE user_id = $1
            ORDER BY last_modified DESC, updated_at DESC
            "#,
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row).collect())
    }

    async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<NoteRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE id = $1 AND user_id = $2",
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row))
    }

    async fn find_by_local_id(
        &self,
        owner_id: &str,
        local_id: &str,
    ) -> Result<Option<NoteRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE user_id = $1 AND local_id = $2",
        ))
        .bind(owner_id)
        .bind(local_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row))
    }

    async fn insert(&self, note: &NoteRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO note (id, user_id, title, content, folder, local_id,
                              updated_at, last_modified, links)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(note.id)
        .bind(&note.owner_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.folder)
        .bind(&note.local_id)
        .bind(&note.updated_at)
        .bind(note.last_modified)
        .bind(Json(&note.links))
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn update(&self, note: &NoteRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE note
            SET title = $3, content = $4, folder = $5, local_id = $6,
                updated_at = $7, last_modified = $8, links = $9
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(note.id)
        .bind(&note.owner_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.folder)
        .bind(&note.local_id)
        .bind(&note.updated_at)
        .bind(note.last_modified)
        .bind(Json(&note.links))
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(note.id));
        }
        Ok(())
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<()> {
        // Deleting a missing or foreign id is a silent no-op.
        sqlx::query("DELETE FROM note WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
