use sqlx::SqlitePool;

use crate::models::FormDraftRow;

const SQL_CREATE_FORM_DRAFTS: &str = r#"
CREATE TABLE IF NOT EXISTS form_drafts (
  draft_key TEXT PRIMARY KEY,
  payload TEXT NOT NULL,
  saved_at TEXT NOT NULL
)
"#;

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(SQL_CREATE_FORM_DRAFTS).execute(pool).await?;
    Ok(())
}

const SQL_UPSERT_DRAFT: &str = r#"
INSERT INTO form_drafts (draft_key, payload, saved_at)
VALUES (?1, ?2, datetime('now'))
ON CONFLICT(draft_key) DO UPDATE SET
  payload = excluded.payload,
  saved_at = excluded.saved_at
"#;

pub async fn save_draft(pool: &SqlitePool, draft_key: &str, payload: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_DRAFT)
        .bind(draft_key)
        .bind(payload)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LOAD_DRAFT: &str = r#"
SELECT
  draft_key,
  payload,
  saved_at
FROM form_drafts
WHERE draft_key = ?1
LIMIT 1
"#;

pub async fn load_draft(pool: &SqlitePool, draft_key: &str) -> sqlx::Result<Option<FormDraftRow>> {
    sqlx::query_as::<_, FormDraftRow>(SQL_LOAD_DRAFT)
        .bind(draft_key)
        .fetch_optional(pool)
        .await
}

const SQL_DELETE_DRAFT: &str = r#"
DELETE FROM form_drafts
WHERE draft_key = ?1
"#;

pub async fn delete_draft(pool: &SqlitePool, draft_key: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_DRAFT)
        .bind(draft_key)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
