//! Sync Engine — merges caller-approved review output into the structured
//! profile under a copy-on-write, commit-on-success contract.
//!
//! The cached profile per identity is the only long-lived shared state in
//! the service. It is never mutated directly: every sync builds a clone,
//! persists the clone, and only then swaps it into the cache. A failed
//! persistence call therefore can never leave the cache mixed or
//! inconsistent, and the caller may retry with the same assignments.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{ProfileField, ProfileRecord, ProjectEntry};
use crate::review::models::ReviewResult;
use crate::sync::store::ProfileStore;

/// Project name used when neither the assignment nor the section supplies one.
const DEFAULT_PROJECT_NAME: &str = "新しいプロジェクト";

/// A caller-approved mapping from a reviewed section to a profile field.
/// Ephemeral; consumed once. `field` stays a string on the wire — anything
/// unresolvable is simply not actionable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAssignment {
    pub section_id: String,
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

/// Outcome of a committed sync.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub applied: usize,
    /// Assignments skipped non-fatally (missing feedback, blank revision),
    /// with a reason each.
    pub skipped: Vec<String>,
    pub profile: ProfileRecord,
}

/// Per-identity cache of the last known structured profile. Updated only
/// through the commit path of [`apply_assignments`] or an explicit load.
#[derive(Clone, Default)]
pub struct ProfileCache {
    inner: Arc<Mutex<HashMap<Uuid, ProfileRecord>>>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: Uuid) -> Option<ProfileRecord> {
        self.inner.lock().await.get(&user_id).cloned()
    }

    pub async fn put(&self, user_id: Uuid, record: ProfileRecord) {
        self.inner.lock().await.insert(user_id, record);
    }
}

/// Applies caller-approved assignments to the cached profile and persists
/// the result.
///
/// Non-fatal skips: an assignment whose section has no feedback in
/// `result`, or whose revised text is blank after trimming, is skipped
/// silently and the remaining valid assignments still apply.
pub async fn apply_assignments(
    store: &dyn ProfileStore,
    cache: &ProfileCache,
    user_id: Option<Uuid>,
    assignments: &[SyncAssignment],
    result: &ReviewResult,
) -> Result<SyncReport, AppError> {
    let user_id = user_id.ok_or(AppError::NotAuthenticated)?;
    let cached = cache.get(user_id).await.ok_or(AppError::ProfileNotLoaded)?;

    let actionable: Vec<(&SyncAssignment, ProfileField)> = assignments
        .iter()
        .filter_map(|a| ProfileField::parse(&a.field).map(|field| (a, field)))
        .collect();
    if actionable.is_empty() {
        return Err(AppError::NoActionableAssignment(
            "None of the assignments name a known profile field".to_string(),
        ));
    }

    // All mutation happens on the clone; `cached` stays the pre-sync snapshot.
    let mut draft = cached.clone();
    let mut applied = 0usize;
    let mut skipped = Vec::new();

    for (assignment, field) in actionable {
        let Some(feedback) = result
            .sections
            .iter()
            .find(|f| f.section_id == assignment.section_id)
        else {
            skipped.push(format!(
                "section '{}' has no feedback in this review",
                assignment.section_id
            ));
            continue;
        };

        let revised = feedback.revised_text.trim();
        if revised.is_empty() {
            skipped.push(format!(
                "section '{}' has no usable revised text",
                assignment.section_id
            ));
            continue;
        }

        match field {
            ProfileField::Projects => {
                let name = assignment
                    .project_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .or_else(|| {
                        Some(feedback.section_title.trim().to_string())
                            .filter(|t| !t.is_empty())
                    })
                    .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
                // Append-only: existing projects are never overwritten.
                draft.projects.push(ProjectEntry {
                    name,
                    description: revised.to_string(),
                });
            }
            scalar => {
                draft.set_scalar(scalar, revised.to_string());
            }
        }
        applied += 1;
    }

    if applied == 0 {
        return Err(AppError::NoActionableAssignment(format!(
            "No assignment could be applied: {}",
            skipped.join("; ")
        )));
    }

    // Commit-on-success: the cache is replaced only after the store accepts
    // the clone.
    if let Err(e) = store.save(user_id, &draft).await {
        warn!("Profile save failed for user {user_id}: {e}");
        return Err(AppError::PersistenceFailure(e.to_string()));
    }
    cache.put(user_id, draft.clone()).await;

    info!(
        "Synced {applied} assignment(s) into profile of user {user_id} ({} skipped)",
        skipped.len()
    );

    Ok(SyncReport {
        applied,
        skipped,
        profile: draft,
    })
}
