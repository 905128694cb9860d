//! In-memory store fixtures for engine and service tests.
//!
//! Faithful stand-ins for the real stores: the remote fixture keys rows
//! by identity exactly like the PostgreSQL tables, and both fixtures can
//! inject failures so the degrade paths are testable without a network.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;

use larder_core::{
    defaults, ChangeEvent, ChangeFeed, ChangeNotifier, Error, FeedGuard, Household, LocalStore,
    MealPlanItem, Recipe, RemoteStore, Result, UserProfile,
};

fn injected() -> Error {
    Error::Internal("injected failure".to_string())
}

// =============================================================================
// LOCAL STORE FIXTURE
// =============================================================================

#[derive(Default)]
struct LocalState {
    profile: Option<UserProfile>,
    recipes: Option<Vec<JsonValue>>,
    plan: Option<Vec<MealPlanItem>>,
    household: Option<Household>,
}

/// In-memory [`LocalStore`].
#[derive(Default)]
pub struct MemLocalStore {
    state: Mutex<LocalState>,
}

impl MemLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LocalState> {
        self.state.lock().expect("fixture lock poisoned")
    }

    /// Seed the recipes blob with raw payloads (e.g. legacy shapes).
    pub fn seed_raw_recipes(&self, payloads: Vec<JsonValue>) {
        self.lock().recipes = Some(payloads);
    }

    /// Seed the household pointer directly.
    pub fn seed_household(&self, household: Household) {
        self.lock().household = Some(household);
    }
}

#[async_trait]
impl LocalStore for MemLocalStore {
    async fn load_profile(&self) -> Result<Option<UserProfile>> {
        Ok(self.lock().profile.clone())
    }

    async fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        self.lock().profile = Some(profile.clone());
        Ok(())
    }

    async fn load_recipes(&self) -> Result<Vec<JsonValue>> {
        Ok(self.lock().recipes.clone().unwrap_or_default())
    }

    async fn store_recipes(&self, recipes: &[Recipe]) -> Result<()> {
        let payloads = recipes
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.lock().recipes = Some(payloads);
        Ok(())
    }

    async fn load_plan(&self) -> Result<Vec<MealPlanItem>> {
        Ok(self.lock().plan.clone().unwrap_or_default())
    }

    async fn store_plan(&self, plan: &[MealPlanItem]) -> Result<()> {
        self.lock().plan = Some(plan.to_vec());
        Ok(())
    }

    async fn load_household(&self) -> Result<Option<Household>> {
        Ok(self.lock().household.clone())
    }

    async fn store_household(&self, household: &Household) -> Result<()> {
        self.lock().household = Some(household.clone());
        Ok(())
    }

    async fn clear_household(&self) -> Result<()> {
        self.lock().household = None;
        Ok(())
    }
}

// =============================================================================
// REMOTE STORE FIXTURE
// =============================================================================

#[derive(Default)]
struct RemoteState {
    households: HashMap<String, Household>,
    /// recipe id -> (household id, payload)
    recipes: HashMap<String, (String, JsonValue)>,
    /// plan id -> (household id, item)
    plans: HashMap<String, (String, MealPlanItem)>,
}

/// In-memory [`RemoteStore`] with failure injection.
#[derive(Default)]
pub struct MemRemoteStore {
    state: Mutex<RemoteState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_upserts: AtomicBool,
}

impl MemRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RemoteState> {
        self.state.lock().expect("fixture lock poisoned")
    }

    /// Make every read return an error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write return an error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make only upserts fail, leaving deletes working (partial-sync
    /// scenarios).
    pub fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(())
    }

    fn check_upsert(&self) -> Result<()> {
        self.check_write()?;
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(())
    }

    /// Seed a household row without going through the directory.
    pub fn seed_household(&self, household: Household) {
        self.lock()
            .households
            .insert(household.id.clone(), household);
    }

    /// Overwrite a household row's display name.
    pub fn set_household_name(&self, id: &str, name: &str) {
        if let Some(household) = self.lock().households.get_mut(id) {
            household.name = name.to_string();
        }
    }

    /// Current display name of a household row (assertion helper).
    pub fn household_name_of(&self, id: &str) -> Option<String> {
        self.lock().households.get(id).map(|h| h.name.clone())
    }

    /// Seed a recipe row directly.
    pub fn seed_recipe(&self, household_id: &str, recipe: &Recipe) {
        let payload = serde_json::to_value(recipe).expect("fixture recipe serializes");
        self.lock().recipes.insert(
            recipe.id.clone(),
            (household_id.to_string(), payload),
        );
    }

    /// Current recipe identities in a household (assertion helper).
    pub fn recipe_ids_in(&self, household_id: &str) -> HashSet<String> {
        self.lock()
            .recipes
            .iter()
            .filter(|(_, (hh, _))| hh == household_id)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Current plan identities in a household (assertion helper).
    pub fn plan_ids_in(&self, household_id: &str) -> HashSet<String> {
        self.lock()
            .plans
            .iter()
            .filter(|(_, (hh, _))| hh == household_id)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteStore for MemRemoteStore {
    async fn insert_household(&self, household: &Household) -> Result<()> {
        self.check_write()?;
        self.lock()
            .households
            .insert(household.id.clone(), household.clone());
        Ok(())
    }

    async fn find_household_by_code(&self, code: &str) -> Result<Option<Household>> {
        self.check_read()?;
        Ok(self
            .lock()
            .households
            .values()
            .find(|h| h.code == code)
            .cloned())
    }

    async fn household_name(&self, id: &str) -> Result<Option<String>> {
        self.check_read()?;
        Ok(self.lock().households.get(id).map(|h| h.name.clone()))
    }

    async fn rename_household(&self, id: &str, name: &str) -> Result<()> {
        self.check_write()?;
        let mut state = self.lock();
        match state.households.get_mut(id) {
            Some(household) => {
                household.name = name.to_string();
                Ok(())
            }
            None => Err(Error::NotFound(format!("household {id}"))),
        }
    }

    async fn fetch_recipes(&self, household_id: &str) -> Result<Vec<JsonValue>> {
        self.check_read()?;
        Ok(self
            .lock()
            .recipes
            .values()
            .filter(|(hh, _)| hh == household_id)
            .map(|(_, payload)| payload.clone())
            .collect())
    }

    async fn recipe_ids(&self, household_id: &str) -> Result<HashSet<String>> {
        self.check_read()?;
        Ok(self.recipe_ids_in(household_id))
    }

    async fn upsert_recipes(&self, household_id: &str, recipes: &[Recipe]) -> Result<()> {
        self.check_upsert()?;
        let mut state = self.lock();
        for recipe in recipes {
            let payload = serde_json::to_value(recipe)?;
            state.recipes.insert(
                recipe.id.clone(),
                (household_id.to_string(), payload),
            );
        }
        Ok(())
    }

    async fn delete_recipes(&self, household_id: &str, ids: &[String]) -> Result<()> {
        self.check_write()?;
        let mut state = self.lock();
        for id in ids {
            if state
                .recipes
                .get(id)
                .is_some_and(|(hh, _)| hh == household_id)
            {
                state.recipes.remove(id);
            }
        }
        Ok(())
    }

    async fn fetch_plan(&self, household_id: &str) -> Result<Vec<MealPlanItem>> {
        self.check_read()?;
        Ok(self
            .lock()
            .plans
            .values()
            .filter(|(hh, _)| hh == household_id)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn plan_ids(&self, household_id: &str) -> Result<HashSet<String>> {
        self.check_read()?;
        Ok(self.plan_ids_in(household_id))
    }

    async fn upsert_plan(&self, household_id: &str, items: &[MealPlanItem]) -> Result<()> {
        self.check_upsert()?;
        let mut state = self.lock();
        for item in items {
            state
                .plans
                .insert(item.id.clone(), (household_id.to_string(), item.clone()));
        }
        Ok(())
    }

    async fn delete_plan(&self, household_id: &str, ids: &[String]) -> Result<()> {
        self.check_write()?;
        let mut state = self.lock();
        for id in ids {
            if state
                .plans
                .get(id)
                .is_some_and(|(hh, _)| hh == household_id)
            {
                state.plans.remove(id);
            }
        }
        Ok(())
    }
}

// =============================================================================
// NOTIFIER FIXTURE
// =============================================================================

/// A [`ChangeNotifier`] whose events are pushed by the test.
#[derive(Default)]
pub struct ScriptedNotifier {
    senders: Mutex<Vec<mpsc::Sender<ChangeEvent>>>,
}

impl ScriptedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every open feed.
    pub async fn emit(&self, event: ChangeEvent) {
        let senders = self
            .senders
            .lock()
            .expect("fixture lock poisoned")
            .clone();
        for sender in senders {
            let _ = sender.send(event.clone()).await;
        }
    }
}

#[async_trait]
impl ChangeNotifier for ScriptedNotifier {
    async fn watch(&self, _household_id: &str) -> Result<ChangeFeed> {
        let (tx, rx) = mpsc::channel(defaults::CHANGE_FEED_CAPACITY);
        self.senders
            .lock()
            .expect("fixture lock poisoned")
            .push(tx);

        // Nothing to listen to; the guard just needs a task to own.
        let handle = tokio::spawn(std::future::pending::<()>());
        Ok(ChangeFeed::new(rx, FeedGuard::new(handle)))
    }
}
