//! Profile persistence collaborator — keyed upsert of the structured
//! profile record, stored as a JSONB payload per user.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::ProfileRecord;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> Result<Option<ProfileRecord>>;
    /// Keyed upsert; the caller's record is passed wholesale.
    async fn save(&self, user_id: Uuid, record: &ProfileRecord) -> Result<()>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<ProfileRecord>> {
        let data: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT data FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        data.map(|value| {
            serde_json::from_value(value).context("Stored profile payload is malformed")
        })
        .transpose()
    }

    async fn save(&self, user_id: Uuid, record: &ProfileRecord) -> Result<()> {
        let data = serde_json::to_value(record)?;
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, data, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(&data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
