//! Core traits for larder store abstractions.
//!
//! These traits define the seams between the reconciliation engine and
//! the two stores it targets, enabling pluggable backends and
//! testability. The engine never talks to sled or PostgreSQL directly.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::events::ChangeFeed;
use crate::models::{Household, MealPlanItem, Recipe, UserProfile};

// =============================================================================
// LOCAL STORE
// =============================================================================

/// Durable device-local persistence: four independent keyed blobs
/// (profile, recipes, plan, household pointer).
///
/// Always present. Authoritative for recipes and plan while no household
/// is joined; always authoritative for the profile and for the household
/// pointer.
///
/// Recipe reads return raw JSON payloads — the engine runs the migration
/// chain before payloads reach a caller, so the store stays oblivious to
/// schema versions.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn load_profile(&self) -> Result<Option<UserProfile>>;

    async fn store_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Raw recipe payloads; empty when never written.
    async fn load_recipes(&self) -> Result<Vec<JsonValue>>;

    /// Whole-value overwrite of the recipes blob.
    async fn store_recipes(&self, recipes: &[Recipe]) -> Result<()>;

    /// Empty when never written.
    async fn load_plan(&self) -> Result<Vec<MealPlanItem>>;

    /// Whole-value overwrite of the plan blob.
    async fn store_plan(&self, plan: &[MealPlanItem]) -> Result<()>;

    async fn load_household(&self) -> Result<Option<Household>>;

    async fn store_household(&self, household: &Household) -> Result<()>;

    /// Discard the household pointer. Leaving a household is exactly this
    /// and nothing more.
    async fn clear_household(&self) -> Result<()>;
}

// =============================================================================
// REMOTE STORE
// =============================================================================

/// Shared, network-accessible store holding the household directory and
/// every household's recipe and plan rows.
///
/// Authoritative for recipes and plan while a household is joined. Row
/// updates are atomic per row but nothing is serialized across rows or
/// across a delete/upsert pair; concurrent writers interleave at row
/// granularity.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // ─── Household directory ───────────────────────────────────────────

    async fn insert_household(&self, household: &Household) -> Result<()>;

    /// Resolve a join code. `Ok(None)` is the normal "no such code"
    /// outcome, not an error.
    async fn find_household_by_code(&self, code: &str) -> Result<Option<Household>>;

    /// Current display name of a household, if it still exists.
    async fn household_name(&self, id: &str) -> Result<Option<String>>;

    async fn rename_household(&self, id: &str, name: &str) -> Result<()>;

    // ─── Recipes ───────────────────────────────────────────────────────

    /// Raw `data` payloads of every recipe row in the household.
    async fn fetch_recipes(&self, household_id: &str) -> Result<Vec<JsonValue>>;

    /// Identities currently present remotely for this household.
    async fn recipe_ids(&self, household_id: &str) -> Result<HashSet<String>>;

    /// Insert-or-replace each row; a full-value replace per row, never a
    /// field-level merge.
    async fn upsert_recipes(&self, household_id: &str, recipes: &[Recipe]) -> Result<()>;

    async fn delete_recipes(&self, household_id: &str, ids: &[String]) -> Result<()>;

    // ─── Plan ──────────────────────────────────────────────────────────

    async fn fetch_plan(&self, household_id: &str) -> Result<Vec<MealPlanItem>>;

    async fn plan_ids(&self, household_id: &str) -> Result<HashSet<String>>;

    async fn upsert_plan(&self, household_id: &str, items: &[MealPlanItem]) -> Result<()>;

    async fn delete_plan(&self, household_id: &str, ids: &[String]) -> Result<()>;
}

// =============================================================================
// CHANGE NOTIFIER
// =============================================================================

/// Push channel from the remote store to every device subscribed to a
/// household.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Open a feed of change events scoped to one household. The feed
    /// tears its listener down when dropped.
    async fn watch(&self, household_id: &str) -> Result<ChangeFeed>;
}
