//! Gym administration service.

use gymhub_common::AppResult;
use gymhub_db::{entities::gym, repositories::GymRepository};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use validator::Validate;

use super::{BulkOutcome, dedup_ids, needing_change};

/// Editable gym fields.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GymPatch {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
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
}

/// Service for gym visibility and edits.
#[derive(Clone)]
pub struct GymService {
    gym_repo: GymRepository,
}

impl GymService {
    /// Create a new gym service.
    #[must_use]
    pub const fn new(gym_repo: GymRepository) -> Self {
        Self { gym_repo }
    }

    /// List all gyms.
    pub async fn list(&self) -> AppResult<Vec<gym::Model>> {
        self.gym_repo.list().await
    }

    /// Hide or show one gym. Returns whether a write happened.
    pub async fn set_hidden(&self, admin_id: &str, id: &str, hidden: bool) -> AppResult<bool> {
        let gym = self.gym_repo.get_by_id(id).await?;
        if gym.is_hidden == hidden {
            return Ok(false);
        }

        self.gym_repo.set_hidden_many(&[gym.id], hidden).await?;
        info!(admin_id, gym_id = id, hidden, "Gym visibility changed");
        Ok(true)
    }

    /// Hide or show several gyms. Gyms already in the target state are skipped.
    pub async fn bulk_set_hidden(
        &self,
        admin_id: &str,
        ids: &[String],
        hidden: bool,
    ) -> AppResult<BulkOutcome> {
        let ids = dedup_ids(ids);
        let gyms = self.gym_repo.find_by_ids(&ids).await?;
        let to_change = needing_change(&gyms, |g| g.id.as_str(), |g| g.is_hidden == hidden);

        let applied = self.gym_repo.set_hidden_many(&to_change, hidden).await?;

        let outcome = BulkOutcome::new(ids.len(), applied);
        info!(
            admin_id,
            hidden,
            applied = outcome.applied,
            skipped = outcome.skipped,
            "Gyms bulk updated"
        );
        Ok(outcome)
    }

    /// Edit a gym.
    pub async fn update(&self, admin_id: &str, id: &str, patch: GymPatch) -> AppResult<gym::Model> {
        patch.validate()?;

        let gym = self.gym_repo.get_by_id(id).await?;
        let mut model: gym::ActiveModel = gym.into();

        if let Some(v) = patch.name {
            model.name = Set(v);
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

        let updated = self.gym_repo.update(model).await?;
        info!(admin_id, gym_id = id, "Gym updated");
        Ok(updated)
    }

    /// Delete gyms by IDs.
    pub async fn delete(&self, admin_id: &str, ids: &[String]) -> AppResult<u64> {
        let deleted = self.gym_repo.delete_many(&dedup_ids(ids)).await?;
        info!(admin_id, count = deleted, "Gyms deleted");
        Ok(deleted)
    }
}
