use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::draft_repo;

/// The one draft slot the registration form uses.
pub const DRAFT_KEY: &str = "campDraft";

pub type DraftFields = Map<String, Value>;

#[derive(Debug, Clone, Serialize)]
pub struct SavedDraft {
    pub fields: DraftFields,
    pub saved_at: String,
}

/// Replaces the whole draft.
pub async fn save_draft(pool: &SqlitePool, fields: &DraftFields) -> sqlx::Result<()> {
    let payload = Value::Object(fields.clone()).to_string();
    draft_repo::save_draft(pool, DRAFT_KEY, &payload).await
}

pub async fn load_draft(pool: &SqlitePool) -> sqlx::Result<Option<SavedDraft>> {
    let Some(row) = draft_repo::load_draft(pool, DRAFT_KEY).await? else {
        return Ok(None);
    };

    let fields = match serde_json::from_str::<Value>(&row.payload) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) | Err(_) => {
            warn!("📝 Stored draft '{}' is not a JSON object, ignoring", row.draft_key);
            return Ok(None);
        }
    };

    Ok(Some(SavedDraft {
        fields,
        saved_at: row.saved_at,
    }))
}

pub async fn clear_draft(pool: &SqlitePool) -> sqlx::Result<bool> {
    Ok(draft_repo::delete_draft(pool, DRAFT_KEY).await? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        draft_repo::ensure_schema(&pool).await.unwrap();
        pool
    }

    fn fields(value: Value) -> DraftFields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    async fn save_overwrites_wholesale() {
        let pool = memory_pool().await;
        save_draft(
            &pool,
            &fields(serde_json::json!({ "campName": "A", "city": "Pune" })),
        )
        .await
        .unwrap();
        save_draft(&pool, &fields(serde_json::json!({ "campName": "B" })))
            .await
            .unwrap();

        let draft = load_draft(&pool).await.unwrap().unwrap();
        assert_eq!(draft.fields.get("campName"), Some(&Value::from("B")));
        assert!(draft.fields.get("city").is_none());
    }

    #[tokio::test]
    async fn clear_removes_the_draft() {
        let pool = memory_pool().await;
        assert!(!clear_draft(&pool).await.unwrap());
        save_draft(&pool, &fields(serde_json::json!({ "email": "x@y.z" })))
            .await
            .unwrap();
        assert!(clear_draft(&pool).await.unwrap());
        assert!(load_draft(&pool).await.unwrap().is_none());
    }
}
