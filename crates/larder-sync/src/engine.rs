//! Reconciliation engine: the load path and the diff-by-identity write
//! path.
//!
//! Every operation receives the current household (or none) explicitly;
//! the Local-vs-Remote branch is a pure function of that argument, never
//! of ambient state. The engine holds no pointer cache of its own — that
//! lives in [`Membership`](crate::Membership), mutated only by the
//! service facade.
//!
//! ## Consistency model
//!
//! Remote writes reconcile by identity: delete the remote rows whose ids
//! are absent from the caller's full collection, then upsert every row in
//! it. Nothing serializes the delete/upsert pair across devices — two
//! devices saving concurrently interleave at row granularity and the last
//! write per row wins. A row added by one device after another device
//! snapshotted the remote id set can be removed by that device's delete
//! pass. This gap is accepted: the UI layer re-derives its collection
//! from the latest load, and the next save converges.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use larder_core::{
    defaults, migrate, Household, LocalStore, MealPlanItem, Recipe, RemoteStore, Result,
    UserProfile,
};

/// Everything a caller needs to render after a load.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub recipes: Vec<Recipe>,
    pub plan: Vec<MealPlanItem>,
    pub profile: UserProfile,
    /// Remote display name that differs from the passed pointer, if any.
    /// The remote name is authoritative; the facade writes it back to the
    /// cached pointer.
    pub refreshed_name: Option<String>,
}

/// Outcome of a collection save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the device store; no household active.
    Local,
    /// Remote reconciliation completed fully.
    Synced,
    /// One of the delete/upsert steps failed; the remote is partially
    /// updated.
    Partial,
    /// No remote progress was made. The caller's in-memory state remains
    /// the visible truth until the next successful sync.
    Failed,
}

impl SaveOutcome {
    /// Whether the save left the authoritative store fully up to date.
    pub fn is_settled(&self) -> bool {
        matches!(self, SaveOutcome::Local | SaveOutcome::Synced)
    }

    fn from_steps(deleted: bool, upserted: bool) -> Self {
        match (deleted, upserted) {
            (true, true) => SaveOutcome::Synced,
            (false, false) => SaveOutcome::Failed,
            _ => SaveOutcome::Partial,
        }
    }
}

/// The reconciliation engine.
pub struct SyncEngine {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    // One in-flight reconciliation per collection kind per device. Two
    // overlapping diff+upsert passes would race and re-create rows the
    // other just deleted.
    recipes_flight: Mutex<()>,
    plan_flight: Mutex<()>,
}

impl SyncEngine {
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            local,
            remote,
            recipes_flight: Mutex::new(()),
            plan_flight: Mutex::new(()),
        }
    }

    // =========================================================================
    // LOAD PATH
    // =========================================================================

    /// Load everything the UI needs.
    ///
    /// Remote failures degrade to empty collections rather than
    /// propagating, so the caller always receives a renderable state.
    /// Local store failures are real errors.
    pub async fn load_data(&self, household: Option<&Household>) -> Result<LoadOutcome> {
        let profile = self.local.load_profile().await?.unwrap_or_default();

        match household {
            Some(household) => Ok(self.load_remote(household, profile).await),
            None => self.load_local(profile).await,
        }
    }

    async fn load_local(&self, profile: UserProfile) -> Result<LoadOutcome> {
        let recipes = decode_recipes(self.local.load_recipes().await?);
        let plan = self.local.load_plan().await?;

        debug!(
            subsystem = "sync",
            component = "engine",
            op = "load",
            row_count = recipes.len() + plan.len(),
            "Loaded collections from device store"
        );
        Ok(LoadOutcome {
            recipes,
            plan,
            profile,
            refreshed_name: None,
        })
    }

    async fn load_remote(&self, household: &Household, profile: UserProfile) -> LoadOutcome {
        let recipes = match self.remote.fetch_recipes(&household.id).await {
            Ok(raw) => decode_recipes(raw),
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "engine",
                    op = "load",
                    household_id = %household.id,
                    collection = "recipes",
                    error = %e,
                    "Remote read failed; degrading to empty collection"
                );
                Vec::new()
            }
        };

        let plan = match self.remote.fetch_plan(&household.id).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "engine",
                    op = "load",
                    household_id = %household.id,
                    collection = "plan",
                    error = %e,
                    "Remote read failed; degrading to empty collection"
                );
                Vec::new()
            }
        };

        // The household row may have been renamed by another member.
        let refreshed_name = match self.remote.household_name(&household.id).await {
            Ok(Some(name)) if name != household.name => Some(name),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "engine",
                    op = "load",
                    household_id = %household.id,
                    error = %e,
                    "Household name refresh failed"
                );
                None
            }
        };

        LoadOutcome {
            recipes,
            plan,
            profile,
            refreshed_name,
        }
    }

    // =========================================================================
    // WRITE PATH
    // =========================================================================

    /// Profile writes always target the device store, unconditionally.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.local.store_profile(profile).await
    }

    /// Save the full recipe collection (not a delta).
    pub async fn save_recipes(
        &self,
        household: Option<&Household>,
        recipes: &[Recipe],
    ) -> Result<SaveOutcome> {
        let Some(household) = household else {
            self.local.store_recipes(recipes).await?;
            return Ok(SaveOutcome::Local);
        };

        let _flight = self.recipes_flight.lock().await;

        let local_ids: HashSet<&str> = recipes.iter().map(|r| r.id.as_str()).collect();
        let to_delete = match self.remote.recipe_ids(&household.id).await {
            Ok(remote_ids) => stale_ids(remote_ids, &local_ids),
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "engine",
                    op = "reconcile",
                    household_id = %household.id,
                    collection = "recipes",
                    error = %e,
                    "Remote id snapshot failed; nothing written"
                );
                return Ok(SaveOutcome::Failed);
            }
        };

        debug!(
            subsystem = "sync",
            component = "engine",
            op = "reconcile",
            household_id = %household.id,
            collection = "recipes",
            row_count = recipes.len(),
            delete_count = to_delete.len(),
            "Reconciling collection"
        );

        let deleted = if to_delete.is_empty() {
            true
        } else {
            self.log_step(
                "recipes",
                &household.id,
                self.remote.delete_recipes(&household.id, &to_delete).await,
                "delete",
            )
        };

        let upserted = if recipes.is_empty() {
            true
        } else {
            let mut ok = false;
            for attempt in 0..=defaults::UPSERT_MAX_RETRIES {
                // Idempotent full-row replaces; retrying cannot duplicate
                // data.
                match self.remote.upsert_recipes(&household.id, recipes).await {
                    Ok(()) => {
                        ok = true;
                        break;
                    }
                    Err(e) => warn!(
                        subsystem = "sync",
                        component = "engine",
                        op = "reconcile",
                        household_id = %household.id,
                        collection = "recipes",
                        attempt,
                        error = %e,
                        "Remote upsert pass failed"
                    ),
                }
            }
            ok
        };

        Ok(self.settle("recipes", &household.id, deleted, upserted))
    }

    /// Save the full meal plan (not a delta).
    pub async fn save_plan(
        &self,
        household: Option<&Household>,
        plan: &[MealPlanItem],
    ) -> Result<SaveOutcome> {
        let Some(household) = household else {
            self.local.store_plan(plan).await?;
            return Ok(SaveOutcome::Local);
        };

        let _flight = self.plan_flight.lock().await;

        let local_ids: HashSet<&str> = plan.iter().map(|p| p.id.as_str()).collect();
        let to_delete = match self.remote.plan_ids(&household.id).await {
            Ok(remote_ids) => stale_ids(remote_ids, &local_ids),
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "engine",
                    op = "reconcile",
                    household_id = %household.id,
                    collection = "plan",
                    error = %e,
                    "Remote id snapshot failed; nothing written"
                );
                return Ok(SaveOutcome::Failed);
            }
        };

        debug!(
            subsystem = "sync",
            component = "engine",
            op = "reconcile",
            household_id = %household.id,
            collection = "plan",
            row_count = plan.len(),
            delete_count = to_delete.len(),
            "Reconciling collection"
        );

        let deleted = if to_delete.is_empty() {
            true
        } else {
            self.log_step(
                "plan",
                &household.id,
                self.remote.delete_plan(&household.id, &to_delete).await,
                "delete",
            )
        };

        let upserted = if plan.is_empty() {
            true
        } else {
            let mut ok = false;
            for attempt in 0..=defaults::UPSERT_MAX_RETRIES {
                match self.remote.upsert_plan(&household.id, plan).await {
                    Ok(()) => {
                        ok = true;
                        break;
                    }
                    Err(e) => warn!(
                        subsystem = "sync",
                        component = "engine",
                        op = "reconcile",
                        household_id = %household.id,
                        collection = "plan",
                        attempt,
                        error = %e,
                        "Remote upsert pass failed"
                    ),
                }
            }
            ok
        };

        Ok(self.settle("plan", &household.id, deleted, upserted))
    }

    fn log_step(
        &self,
        collection: &'static str,
        household_id: &str,
        result: Result<()>,
        step: &'static str,
    ) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "engine",
                    op = "reconcile",
                    household_id,
                    collection,
                    step,
                    error = %e,
                    "Remote reconciliation step failed"
                );
                false
            }
        }
    }

    fn settle(
        &self,
        collection: &'static str,
        household_id: &str,
        deleted: bool,
        upserted: bool,
    ) -> SaveOutcome {
        let outcome = SaveOutcome::from_steps(deleted, upserted);
        if outcome == SaveOutcome::Synced {
            info!(
                subsystem = "sync",
                component = "engine",
                op = "reconcile",
                household_id,
                collection,
                success = true,
                "Collection synced"
            );
        }
        outcome
    }

    // =========================================================================
    // ONE-TIME MERGE
    // =========================================================================

    /// Merge pre-existing local collections into a newly adopted
    /// household. Upsert-only — this must never delete remote rows
    /// belonging to other members. Run exactly once at create/join time;
    /// failures are surfaced so the caller can retry.
    pub async fn sync_local_to_cloud(
        &self,
        household_id: &str,
        recipes: &[Recipe],
        plan: &[MealPlanItem],
    ) -> Result<()> {
        info!(
            subsystem = "sync",
            component = "engine",
            op = "merge",
            household_id,
            row_count = recipes.len() + plan.len(),
            "Merging local data into household"
        );

        if !recipes.is_empty() {
            self.remote.upsert_recipes(household_id, recipes).await?;
        }
        if !plan.is_empty() {
            self.remote.upsert_plan(household_id, plan).await?;
        }
        Ok(())
    }
}

/// Remote identities absent from the caller's full collection.
fn stale_ids(remote_ids: HashSet<String>, local_ids: &HashSet<&str>) -> Vec<String> {
    remote_ids
        .into_iter()
        .filter(|id| !local_ids.contains(id.as_str()))
        .collect()
}

/// Run the migration chain over raw payloads, dropping the undecodable
/// ones instead of failing the load.
fn decode_recipes(raw: Vec<JsonValue>) -> Vec<Recipe> {
    raw.into_iter()
        .filter_map(|payload| match migrate::upgrade_recipe(payload) {
            Ok(recipe) => Some(recipe),
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "engine",
                    op = "load",
                    error = %e,
                    "Skipping undecodable recipe payload"
                );
                None
            }
        })
        .collect()
}
