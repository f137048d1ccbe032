//! Review history — a keyed append-only log per user identity.
//!
//! Durability is best-effort: the review result shown to the user never
//! depends on the log write. When the durable store fails, entries land in
//! a bounded in-memory buffer instead (a documented lesser guarantee) and
//! the failure is logged.

pub mod handlers;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::history::ReviewLogRow;
use crate::review::models::ReviewResult;

/// Entries kept per user in the in-memory fallback buffer.
const FALLBACK_CAP: usize = 20;

/// A new, not-yet-persisted history entry.
#[derive(Debug, Clone)]
pub struct NewReviewLog {
    pub user_id: Uuid,
    pub overall_score: Option<i32>,
    pub summary: String,
    pub result: serde_json::Value,
}

impl NewReviewLog {
    pub fn from_result(user_id: Uuid, result: &ReviewResult) -> Result<Self> {
        Ok(Self {
            user_id,
            overall_score: result.overall_score.map(i32::from),
            summary: result.overall_summary.clone(),
            result: serde_json::to_value(result)?,
        })
    }
}

/// The history persistence collaborator: keyed append-only log.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: NewReviewLog) -> Result<ReviewLogRow>;
    /// Most-recent-first.
    async fn list(&self, user_id: Uuid, limit: i64) -> Result<Vec<ReviewLogRow>>;
    /// `entry_id: None` clears every entry for the identity. Returns the
    /// number of removed entries.
    async fn delete(&self, user_id: Uuid, entry_id: Option<Uuid>) -> Result<u64>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres-backed store
// ────────────────────────────────────────────────────────────────────────────

pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn append(&self, entry: NewReviewLog) -> Result<ReviewLogRow> {
        let row: ReviewLogRow = sqlx::query_as(
            r#"
            INSERT INTO review_logs (id, user_id, overall_score, summary, result)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.overall_score)
        .bind(&entry.summary)
        .bind(&entry.result)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self, user_id: Uuid, limit: i64) -> Result<Vec<ReviewLogRow>> {
        Ok(sqlx::query_as::<_, ReviewLogRow>(
            r#"
            SELECT * FROM review_logs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete(&self, user_id: Uuid, entry_id: Option<Uuid>) -> Result<u64> {
        let result = match entry_id {
            Some(id) => {
                sqlx::query("DELETE FROM review_logs WHERE user_id = $1 AND id = $2")
                    .bind(user_id)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("DELETE FROM review_logs WHERE user_id = $1")
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?
            }
        };
        Ok(result.rows_affected())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store — fallback buffer and test double
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<HashMap<Uuid, VecDeque<ReviewLogRow>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: NewReviewLog) -> Result<ReviewLogRow> {
        let row = ReviewLogRow {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            overall_score: entry.overall_score,
            summary: entry.summary,
            result: entry.result,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().await;
        let entries = inner.entry(entry.user_id).or_default();
        entries.push_front(row.clone());
        entries.truncate(FALLBACK_CAP);
        Ok(row)
    }

    async fn list(&self, user_id: Uuid, limit: i64) -> Result<Vec<ReviewLogRow>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .get(&user_id)
            .map(|entries| entries.iter().take(limit.max(0) as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, user_id: Uuid, entry_id: Option<Uuid>) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let Some(entries) = inner.get_mut(&user_id) else {
            return Ok(0);
        };
        match entry_id {
            Some(id) => {
                let before = entries.len();
                entries.retain(|e| e.id != id);
                Ok((before - entries.len()) as u64)
            }
            None => {
                let removed = entries.len() as u64;
                entries.clear();
                Ok(removed)
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recorder — durable store with in-memory degradation
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the durable store with the degraded path. Appends never propagate
/// an error to the review flow.
#[derive(Clone)]
pub struct HistoryRecorder {
    durable: Arc<dyn HistoryStore>,
    fallback: Arc<MemoryHistoryStore>,
}

impl HistoryRecorder {
    pub fn new(durable: Arc<dyn HistoryStore>) -> Self {
        Self {
            durable,
            fallback: Arc::new(MemoryHistoryStore::new()),
        }
    }

    /// Best-effort append. Falls back to the in-memory buffer when the
    /// durable write fails; a fallback failure only logs.
    pub async fn record(&self, entry: NewReviewLog) {
        match self.durable.append(entry.clone()).await {
            Ok(row) => info!("Recorded review history entry {} for user {}", row.id, row.user_id),
            Err(e) => {
                warn!("Durable history append failed, keeping in-memory copy only: {e}");
                if let Err(e) = self.fallback.append(entry).await {
                    warn!("In-memory history fallback also failed: {e}");
                }
            }
        }
    }

    /// Lists history, preferring the durable store; on failure serves the
    /// in-memory buffer so the user still sees recent entries.
    pub async fn list(&self, user_id: Uuid, limit: i64) -> Result<Vec<ReviewLogRow>> {
        match self.durable.list(user_id, limit).await {
            Ok(rows) => Ok(rows),
            Err(e) => {
                warn!("Durable history list failed, serving in-memory buffer: {e}");
                self.fallback.list(user_id, limit).await
            }
        }
    }

    pub async fn delete(&self, user_id: Uuid, entry_id: Option<Uuid>) -> Result<u64> {
        let removed_fallback = self.fallback.delete(user_id, entry_id).await.unwrap_or(0);
        let removed = self.durable.delete(user_id, entry_id).await?;
        Ok(removed + removed_fallback)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cancellable retrieval — per-viewer token registry
// ────────────────────────────────────────────────────────────────────────────

/// Tracks the outstanding history retrieval per viewing identity. Starting
/// a new retrieval cancels the previous one, so a stale result is
/// discarded rather than applied when the viewing context changes.
#[derive(Clone, Default)]
pub struct HistoryViews {
    inner: Arc<std::sync::Mutex<HashMap<Uuid, CancellationToken>>>,
}

impl HistoryViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh retrieval for `viewer`, cancelling any outstanding
    /// one. The returned token is tied to the new request's lifetime.
    pub fn begin(&self, viewer: Uuid) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self
            .inner
            .lock()
            .expect("history view registry poisoned")
            .insert(viewer, token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
