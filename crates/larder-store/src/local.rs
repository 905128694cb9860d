//! Device-local store backed by sled.
//!
//! Four independent keyed blobs (profile, recipes, plan, household
//! pointer), each a JSON document. Single-writer by construction: one
//! device, one process. Every write flushes so the blobs survive abrupt
//! process death.

use std::path::Path;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use larder_core::{
    Household, LocalStore, MealPlanItem, Recipe, Result, UserProfile,
};

const PROFILE_KEY: &str = "profile";
const RECIPES_KEY: &str = "recipes";
const PLAN_KEY: &str = "plan";
const HOUSEHOLD_KEY: &str = "household";

/// Durable device cache holding the four keyed JSON blobs.
#[derive(Clone)]
pub struct SledLocalStore {
    db: sled::Db,
}

impl SledLocalStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        debug!(
            subsystem = "store",
            component = "local",
            op = "open",
            path = %path.as_ref().display(),
            "Opened device-local store"
        );
        Ok(Self { db })
    }

    /// Open a throwaway in-memory store. Test use only; nothing persists.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.db.get(key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.insert(key, bytes)?;
        self.db.flush()?;
        Ok(())
    }
}

#[async_trait]
impl LocalStore for SledLocalStore {
    async fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.read_json(PROFILE_KEY)
    }

    async fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        self.write_json(PROFILE_KEY, profile)
    }

    async fn load_recipes(&self) -> Result<Vec<JsonValue>> {
        Ok(self.read_json(RECIPES_KEY)?.unwrap_or_default())
    }

    async fn store_recipes(&self, recipes: &[Recipe]) -> Result<()> {
        self.write_json(RECIPES_KEY, recipes)
    }

    async fn load_plan(&self) -> Result<Vec<MealPlanItem>> {
        Ok(self.read_json(PLAN_KEY)?.unwrap_or_default())
    }

    async fn store_plan(&self, plan: &[MealPlanItem]) -> Result<()> {
        self.write_json(PLAN_KEY, plan)
    }

    async fn load_household(&self) -> Result<Option<Household>> {
        self.read_json(HOUSEHOLD_KEY)
    }

    async fn store_household(&self, household: &Household) -> Result<()> {
        self.write_json(HOUSEHOLD_KEY, household)
    }

    async fn clear_household(&self) -> Result<()> {
        self.db.remove(HOUSEHOLD_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}
