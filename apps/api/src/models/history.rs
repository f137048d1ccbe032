use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One entry in the per-user review history log. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewLogRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub overall_score: Option<i32>,
    pub summary: String,
    pub result: Value,
    pub created_at: DateTime<Utc>,
}
