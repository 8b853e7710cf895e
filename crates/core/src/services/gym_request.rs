//! Gym request review workflow.
//!
//! Requests move `pending -> approved | rejected` and `rejected -> pending`.
//! Approval creates the gym and marks the request in one transaction; the
//! status update only matches rows that are still pending, so a second
//! concurrent approval changes nothing and rolls back its gym insert.
//! History entries are appended after the primary write and a failure to
//! record one is logged, never surfaced.

use std::sync::LazyLock;

use chrono::Utc;
use gymhub_common::{AppError, AppResult, IdGenerator};
use gymhub_db::{
    entities::{
        gym,
        gym_request::{self, GymRequestAction, GymRequestStatus},
        gym_request_history,
    },
    repositories::{GymRepository, GymRequestRepository, ReviewStamp},
};
use regex::Regex;
use sea_orm::{DatabaseTransaction, Set};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};
use validator::Validate;

use super::{BulkOutcome, dedup_ids, finish_transaction};

// Trailing "[Submitted by ...]" / "[Requested by ...]" line added by the
// submission form.
#[allow(clippy::unwrap_used)]
static PROVENANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\[(?:submitted|requested) by[^\]]*\]\s*$").unwrap()
});

/// Remove the provenance annotation from a request description.
///
/// Returns `None` when nothing but the annotation was left.
#[must_use]
pub fn strip_provenance(description: &str) -> Option<String> {
    let stripped = PROVENANCE_RE.replace(description, "");
    let trimmed = stripped.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Visibility of the gym created by an approval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GymVisibility {
    #[default]
    Shown,
    Hidden,
}

impl GymVisibility {
    const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }
}

/// Result of approving one request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalOutcome {
    pub gym: gym::Model,
    pub request: gym_request::Model,
    /// Gym to open next, when the caller asked to navigate.
    pub navigate_to: Option<String>,
}

/// Editable fields of a pending request.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GymRequestPatch {
    #[validate(length(min = 1, max = 200))]
    pub gym_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    pub address: Option<Option<String>>,
    #[validate(length(max = 5000))]
    pub description: Option<Option<String>>,
    #[validate(url)]
    pub website: Option<Option<String>>,
    pub facilities: Option<Value>,
    pub difficulty_levels: Option<Value>,
    pub opening_hours: Option<Value>,
    pub notes: Option<String>,
}

/// Gym request review service.
#[derive(Clone)]
pub struct GymRequestService {
    request_repo: GymRequestRepository,
    id_gen: IdGenerator,
}

impl GymRequestService {
    /// Create a new gym request service.
    #[must_use]
    pub const fn new(request_repo: GymRequestRepository) -> Self {
        Self {
            request_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List requests, optionally by status.
    pub async fn list(
        &self,
        status: Option<GymRequestStatus>,
    ) -> AppResult<Vec<gym_request::Model>> {
        self.request_repo.list(status).await
    }

    /// Get a request by ID.
    pub async fn get(&self, id: &str) -> AppResult<gym_request::Model> {
        self.request_repo.get_by_id(id).await
    }

    /// History of one request, oldest first.
    pub async fn history(&self, id: &str) -> AppResult<Vec<gym_request_history::Model>> {
        self.request_repo.find_history(id).await
    }

    // ========== Approval ==========

    /// Approve a pending request, creating its gym.
    pub async fn approve(
        &self,
        admin_id: &str,
        request_id: &str,
        visibility: GymVisibility,
        navigate: bool,
    ) -> AppResult<ApprovalOutcome> {
        let txn = self.request_repo.begin().await?;

        let result = self
            .approve_in(&txn, admin_id, request_id, visibility)
            .await;
        let (request, gym) = finish_transaction(txn, result).await?;

        info!(
            admin_id,
            request_id,
            gym_id = %gym.id,
            hidden = gym.is_hidden,
            "Gym request approved"
        );

        self.record_history(
            request_id,
            "approved",
            admin_id,
            json!({
                "status": { "old": GymRequestStatus::Pending.as_str(), "new": GymRequestStatus::Approved.as_str() },
                "approved_gym_id": { "old": Value::Null, "new": gym.id },
            }),
            None,
        )
        .await;

        Ok(ApprovalOutcome {
            navigate_to: navigate.then(|| gym.id.clone()),
            gym,
            request,
        })
    }

    async fn approve_in(
        &self,
        txn: &DatabaseTransaction,
        admin_id: &str,
        request_id: &str,
        visibility: GymVisibility,
    ) -> AppResult<(gym_request::Model, gym::Model)> {
        let request = GymRequestRepository::lock_many_in(txn, &[request_id.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Gym request: {request_id}")))?;

        let next = request.status.transition(GymRequestAction::Approve)?;

        let gym = GymRepository::insert_in(
            txn,
            gym_from_request(self.id_gen.generate(), &request, visibility),
        )
        .await?;

        let stamp = review_stamp(admin_id, None);
        let changed = GymRequestRepository::approve_many_in(
            txn,
            &[(request.id.clone(), gym.id.clone())],
            stamp.clone(),
        )
        .await?;
        if changed == 0 {
            return Err(AppError::Conflict(
                "Gym request was reviewed concurrently".to_string(),
            ));
        }

        let request = gym_request::Model {
            status: next,
            reviewed_by: Some(stamp.reviewed_by),
            reviewed_at: Some(stamp.reviewed_at),
            approved_gym_id: Some(gym.id.clone()),
            ..request
        };

        Ok((request, gym))
    }

    /// Approve every pending request among `ids` in one transaction.
    ///
    /// Gyms are inserted with a single statement and the requests are
    /// marked with a single statement. Requests that are not pending, or
    /// do not exist, are skipped.
    pub async fn bulk_approve(
        &self,
        admin_id: &str,
        ids: &[String],
        visibility: GymVisibility,
    ) -> AppResult<BulkOutcome> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let txn = self.request_repo.begin().await?;
        let result = self.bulk_approve_in(&txn, admin_id, &ids, visibility).await;
        let approved = finish_transaction(txn, result).await?;

        for (request_id, gym_id) in &approved {
            self.record_history(
                request_id,
                "approved",
                admin_id,
                json!({
                    "status": { "old": "pending", "new": "approved" },
                    "approved_gym_id": { "old": Value::Null, "new": gym_id },
                }),
                Some("Bulk approval".to_string()),
            )
            .await;
        }

        let outcome = BulkOutcome::new(ids.len(), approved.len() as u64);
        info!(
            admin_id,
            applied = outcome.applied,
            skipped = outcome.skipped,
            "Gym requests bulk approved"
        );
        Ok(outcome)
    }

    async fn bulk_approve_in(
        &self,
        txn: &DatabaseTransaction,
        admin_id: &str,
        ids: &[String],
        visibility: GymVisibility,
    ) -> AppResult<Vec<(String, String)>> {
        let pending: Vec<gym_request::Model> = GymRequestRepository::lock_many_in(txn, ids)
            .await?
            .into_iter()
            .filter(|r| r.status.transition(GymRequestAction::Approve).is_ok())
            .collect();

        if pending.is_empty() {
            return Ok(vec![]);
        }

        let mut gyms = Vec::with_capacity(pending.len());
        let mut approvals = Vec::with_capacity(pending.len());
        for request in &pending {
            let gym_id = self.id_gen.generate();
            approvals.push((request.id.clone(), gym_id.clone()));
            gyms.push(gym_from_request(gym_id, request, visibility));
        }

        GymRepository::insert_many_in(txn, gyms).await?;

        let changed =
            GymRequestRepository::approve_many_in(txn, &approvals, review_stamp(admin_id, None))
                .await?;
        if changed != approvals.len() as u64 {
            return Err(AppError::Conflict(
                "Gym requests were reviewed concurrently".to_string(),
            ));
        }

        Ok(approvals)
    }

    // ========== Rejection and restore ==========

    /// Reject a pending request. No gym rows are touched.
    pub async fn reject(
        &self,
        admin_id: &str,
        request_id: &str,
        notes: Option<String>,
    ) -> AppResult<gym_request::Model> {
        let request = self.request_repo.get_by_id(request_id).await?;
        let next = request.status.transition(GymRequestAction::Reject)?;

        let stamp = review_stamp(admin_id, notes.clone());
        let changed = self
            .request_repo
            .transition_many(
                &[request.id.clone()],
                GymRequestStatus::Pending,
                next,
                Some(stamp.clone()),
            )
            .await?;
        if changed == 0 {
            return Err(AppError::Conflict(
                "Gym request was reviewed concurrently".to_string(),
            ));
        }

        info!(admin_id, request_id, "Gym request rejected");
        self.record_history(
            request_id,
            "rejected",
            admin_id,
            json!({ "status": { "old": "pending", "new": "rejected" } }),
            notes,
        )
        .await;

        Ok(gym_request::Model {
            status: next,
            reviewed_by: Some(stamp.reviewed_by),
            reviewed_at: Some(stamp.reviewed_at),
            admin_notes: stamp.admin_notes,
            ..request
        })
    }

    /// Reject every pending request among `ids`.
    pub async fn bulk_reject(
        &self,
        admin_id: &str,
        ids: &[String],
        notes: Option<String>,
    ) -> AppResult<BulkOutcome> {
        let ids = dedup_ids(ids);
        let pending: Vec<String> = self
            .request_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .filter(|r| r.status == GymRequestStatus::Pending)
            .map(|r| r.id)
            .collect();

        let applied = self
            .request_repo
            .transition_many(
                &pending,
                GymRequestStatus::Pending,
                GymRequestStatus::Rejected,
                Some(review_stamp(admin_id, notes.clone())),
            )
            .await?;

        // Some rows moved on between the read and the update; only log the
        // ones this call actually rejected.
        let rejected = if applied == pending.len() as u64 {
            pending
        } else {
            self.request_repo
                .find_by_ids(&pending)
                .await?
                .into_iter()
                .filter(|r| {
                    r.status == GymRequestStatus::Rejected
                        && r.reviewed_by.as_deref() == Some(admin_id)
                })
                .map(|r| r.id)
                .collect()
        };

        for request_id in &rejected {
            self.record_history(
                request_id,
                "rejected",
                admin_id,
                json!({ "status": { "old": "pending", "new": "rejected" } }),
                notes.clone(),
            )
            .await;
        }

        let outcome = BulkOutcome::new(ids.len(), applied);
        info!(
            admin_id,
            applied = outcome.applied,
            skipped = outcome.skipped,
            "Gym requests bulk rejected"
        );
        Ok(outcome)
    }

    /// Move a rejected request back to pending.
    pub async fn restore(
        &self,
        admin_id: &str,
        request_id: &str,
    ) -> AppResult<gym_request::Model> {
        let request = self.request_repo.get_by_id(request_id).await?;
        let next = request.status.transition(GymRequestAction::Restore)?;

        let changed = self
            .request_repo
            .transition_many(
                &[request.id.clone()],
                GymRequestStatus::Rejected,
                next,
                None,
            )
            .await?;
        if changed == 0 {
            return Err(AppError::Conflict(
                "Gym request changed concurrently".to_string(),
            ));
        }

        info!(admin_id, request_id, "Gym request restored");
        self.record_history(
            request_id,
            "restored",
            admin_id,
            json!({ "status": { "old": "rejected", "new": "pending" } }),
            None,
        )
        .await;

        Ok(gym_request::Model {
            status: next,
            reviewed_by: None,
            reviewed_at: None,
            admin_notes: None,
            ..request
        })
    }

    /// Delete requests by IDs.
    pub async fn delete(&self, admin_id: &str, ids: &[String]) -> AppResult<u64> {
        let deleted = self.request_repo.delete_many(&dedup_ids(ids)).await?;
        info!(admin_id, count = deleted, "Gym requests deleted");
        Ok(deleted)
    }

    // ========== Editing ==========

    /// Edit a pending request, recording the changed fields in its history.
    pub async fn update(
        &self,
        admin_id: &str,
        request_id: &str,
        patch: GymRequestPatch,
    ) -> AppResult<gym_request::Model> {
        patch.validate()?;

        let request = self.request_repo.get_by_id(request_id).await?;
        if request.status != GymRequestStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "cannot edit a gym request that is {}",
                request.status.as_str()
            )));
        }

        let changes = diff_request(&request, &patch);
        if changes.is_empty() {
            return Ok(request);
        }

        let notes = patch.notes.clone();
        let mut model: gym_request::ActiveModel = request.into();
        if let Some(v) = patch.gym_name {
            model.gym_name = Set(v);
        }
        if let Some(v) = patch.country {
            model.country = Set(v);
        }
        if let Some(v) = patch.city {
            model.city = Set(v);
        }
        if let Some(v) = patch.address {
            model.address = Set(v);
        }
        if let Some(v) = patch.description {
            model.description = Set(v);
        }
        if let Some(v) = patch.website {
            model.website = Set(v);
        }
        if let Some(v) = patch.facilities {
            model.facilities = Set(v);
        }
        if let Some(v) = patch.difficulty_levels {
            model.difficulty_levels = Set(v);
        }
        if let Some(v) = patch.opening_hours {
            model.opening_hours = Set(v);
        }

        let updated = self.request_repo.update(model).await?;
        info!(admin_id, request_id, fields = changes.len(), "Gym request edited");

        self.record_history(request_id, "updated", admin_id, Value::Object(changes), notes)
            .await;

        Ok(updated)
    }

    // ========== Helpers ==========

    async fn record_history(
        &self,
        request_id: &str,
        action: &str,
        changed_by: &str,
        changes: Value,
        notes: Option<String>,
    ) {
        let entry = gym_request_history::ActiveModel {
            id: Set(self.id_gen.generate()),
            gym_request_id: Set(request_id.to_string()),
            action: Set(action.to_string()),
            changed_by: Set(changed_by.to_string()),
            changes: Set(changes),
            notes: Set(notes),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = self.request_repo.append_history(entry).await {
            warn!(error = %e, request_id, action, "Failed to record gym request history");
        }
    }
}

fn gym_from_request(
    gym_id: String,
    request: &gym_request::Model,
    visibility: GymVisibility,
) -> gym::ActiveModel {
    gym::ActiveModel {
        id: Set(gym_id),
        name: Set(request.gym_name.trim().to_string()),
        country: Set(request.country.clone()),
        city: Set(request.city.clone()),
        address: Set(request.address.clone()),
        description: Set(request.description.as_deref().and_then(strip_provenance)),
        website: Set(request.website.clone()),
        is_hidden: Set(visibility.is_hidden()),
        facilities: Set(request.facilities.clone()),
        difficulty_levels: Set(request.difficulty_levels.clone()),
        opening_hours: Set(request.opening_hours.clone()),
        created_by: Set(Some(request.requested_by.clone())),
        created_at: Set(Utc::now().into()),
    }
}

fn review_stamp(admin_id: &str, notes: Option<String>) -> ReviewStamp {
    ReviewStamp {
        reviewed_by: admin_id.to_string(),
        reviewed_at: Utc::now().fixed_offset(),
        admin_notes: notes,
    }
}

fn push_change<T: Serialize + PartialEq>(
    changes: &mut Map<String, Value>,
    field: &str,
    old: &T,
    new: Option<&T>,
) {
    if let Some(new) = new {
        if new != old {
            changes.insert(field.to_string(), json!({ "old": old, "new": new }));
        }
    }
}

/// Field-level diff `{field: {old, new}}` between a request and a patch.
fn diff_request(request: &gym_request::Model, patch: &GymRequestPatch) -> Map<String, Value> {
    let mut changes = Map::new();
    push_change(&mut changes, "gym_name", &request.gym_name, patch.gym_name.as_ref());
    push_change(&mut changes, "country", &request.country, patch.country.as_ref());
    push_change(&mut changes, "city", &request.city, patch.city.as_ref());
    push_change(&mut changes, "address", &request.address, patch.address.as_ref());
    push_change(
        &mut changes,
        "description",
        &request.description,
        patch.description.as_ref(),
    );
    push_change(&mut changes, "website", &request.website, patch.website.as_ref());
    push_change(
        &mut changes,
        "facilities",
        &request.facilities,
        patch.facilities.as_ref(),
    );
    push_change(
        &mut changes,
        "difficulty_levels",
        &request.difficulty_levels,
        patch.difficulty_levels.as_ref(),
    );
    push_change(
        &mut changes,
        "opening_hours",
        &request.opening_hours,
        patch.opening_hours.as_ref(),
    );
    changes
}
