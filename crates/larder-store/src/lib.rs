//! # larder-store
//!
//! Store implementations for the larder sync engine.
//!
//! This crate provides:
//! - The sled-backed device-local store (four keyed JSON blobs)
//! - PostgreSQL repositories for the three remote tables
//!   (households / recipes / plans)
//! - The LISTEN/NOTIFY-backed realtime change notifier
//! - Connection pool management
//!
//! ## Example
//!
//! ```rust,ignore
//! use larder_store::{CloudStore, SledLocalStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let local = SledLocalStore::open(".larder")?;
//!     let cloud = CloudStore::connect("postgres://localhost/larder").await?;
//!
//!     let household = cloud.households.find_by_code("ABC123").await?;
//!     println!("resolved: {household:?}");
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

pub mod households;
pub mod local;
pub mod notifier;
pub mod plans;
pub mod pool;
pub mod recipes;

#[cfg(test)]
mod tests;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use larder_core::*;

// Re-export store implementations
pub use households::PgHouseholdDirectory;
pub use local::SledLocalStore;
pub use notifier::{PgChangeNotifier, NOTIFY_CHANNEL};
pub use plans::PgPlanStore;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use recipes::PgRecipeStore;

/// Combined remote store: the connection pool plus one repository per
/// table, implementing [`RemoteStore`] by delegation.
#[derive(Clone)]
pub struct CloudStore {
    /// The underlying connection pool.
    pub pool: sqlx::PgPool,
    /// Household directory (join codes, names).
    pub households: PgHouseholdDirectory,
    /// Recipe rows.
    pub recipes: PgRecipeStore,
    /// Plan rows.
    pub plans: PgPlanStore,
}

impl CloudStore {
    /// Create a new CloudStore from a connection pool.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            households: PgHouseholdDirectory::new(pool.clone()),
            recipes: PgRecipeStore::new(pool.clone()),
            plans: PgPlanStore::new(pool.clone()),
            pool,
        }
    }

    /// Create a new CloudStore by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait]
impl RemoteStore for CloudStore {
    async fn insert_household(&self, household: &Household) -> Result<()> {
        self.households.insert(household).await
    }

    async fn find_household_by_code(&self, code: &str) -> Result<Option<Household>> {
        self.households.find_by_code(code).await
    }

    async fn household_name(&self, id: &str) -> Result<Option<String>> {
        self.households.name(id).await
    }

    async fn rename_household(&self, id: &str, name: &str) -> Result<()> {
        self.households.rename(id, name).await
    }

    async fn fetch_recipes(&self, household_id: &str) -> Result<Vec<JsonValue>> {
        self.recipes.fetch_for_household(household_id).await
    }

    async fn recipe_ids(&self, household_id: &str) -> Result<HashSet<String>> {
        self.recipes.ids_for_household(household_id).await
    }

    async fn upsert_recipes(&self, household_id: &str, recipes: &[Recipe]) -> Result<()> {
        self.recipes.upsert(household_id, recipes).await
    }

    async fn delete_recipes(&self, household_id: &str, ids: &[String]) -> Result<()> {
        self.recipes.delete(household_id, ids).await
    }

    async fn fetch_plan(&self, household_id: &str) -> Result<Vec<MealPlanItem>> {
        self.plans.fetch_for_household(household_id).await
    }

    async fn plan_ids(&self, household_id: &str) -> Result<HashSet<String>> {
        self.plans.ids_for_household(household_id).await
    }

    async fn upsert_plan(&self, household_id: &str, items: &[MealPlanItem]) -> Result<()> {
        self.plans.upsert(household_id, items).await
    }

    async fn delete_plan(&self, household_id: &str, ids: &[String]) -> Result<()> {
        self.plans.delete(household_id, ids).await
    }
}
