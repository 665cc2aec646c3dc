#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FormDraftRow {
    pub draft_key: String,
    pub payload: String,
    pub saved_at: String,
}
