//! The boundary consumed by the UI layer.
//!
//! [`SyncService`] composes the reconciliation engine, the membership
//! cache, and the change notifier into the operation set the rest of the
//! application is written against. It is the only component that mutates
//! the household pointer.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use larder_core::{
    new_id, new_join_code, ChangeEvent, ChangeNotifier, Household, LocalStore, MealPlanItem,
    Recipe, RemoteStore, Result, UserProfile,
};
use larder_store::{CloudStore, PgChangeNotifier, SledLocalStore};

use crate::config::SyncConfig;
use crate::engine::{SaveOutcome, SyncEngine};
use crate::membership::Membership;

/// Collections and profile, ready to render.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub recipes: Vec<Recipe>,
    pub plan: Vec<MealPlanItem>,
    pub profile: UserProfile,
}

/// An active change subscription.
///
/// Dropping it (or calling [`unsubscribe`](Self::unsubscribe)) stops the
/// forwarder task, which in turn tears down the underlying listener. Tear
/// subscriptions down whenever the device leaves the household or the
/// owning context goes away, so channels never leak across household
/// switches.
pub struct ChangeSubscription {
    forwarder: JoinHandle<()>,
}

impl ChangeSubscription {
    /// Stop delivering change callbacks.
    pub fn unsubscribe(self) {}
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// The storage service: transparent Local-vs-Remote data access plus the
/// household lifecycle.
pub struct SyncService {
    engine: SyncEngine,
    membership: Arc<Membership>,
    remote: Arc<dyn RemoteStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl SyncService {
    /// Compose a service from explicit store implementations.
    pub async fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Result<Self> {
        let membership = Arc::new(Membership::new(local.clone()));
        membership.restore().await?;

        Ok(Self {
            engine: SyncEngine::new(local, remote.clone()),
            membership,
            remote,
            notifier,
        })
    }

    /// Open the sled device cache and connect to the remote store per the
    /// given configuration.
    pub async fn connect(config: &SyncConfig) -> Result<Self> {
        let local = Arc::new(SledLocalStore::open(&config.data_dir)?);
        let cloud =
            CloudStore::connect_with_config(&config.database_url, config.pool.clone()).await?;
        let notifier = Arc::new(PgChangeNotifier::new(cloud.pool().clone()));

        info!(
            subsystem = "sync",
            component = "service",
            op = "connect",
            data_dir = %config.data_dir.display(),
            "Sync service connected"
        );
        Self::new(local, Arc::new(cloud), notifier).await
    }

    // =========================================================================
    // DATA ACCESS
    // =========================================================================

    /// Synchronous read of the cached household pointer.
    pub fn household(&self) -> Option<Household> {
        self.membership.current()
    }

    /// Load collections and profile from whichever store is
    /// authoritative. Never fails on remote errors; the result is always
    /// renderable.
    pub async fn load_data(&self) -> Result<LoadedData> {
        let household = self.membership.current();
        let outcome = self.engine.load_data(household.as_ref()).await?;

        // Remote rename observed during the load: write the
        // authoritative name back into the cached pointer. Failing to
        // persist the pointer must not un-render the load.
        if let Some(name) = outcome.refreshed_name {
            if let Err(e) = self.membership.set_name(&name).await {
                warn!(
                    subsystem = "sync",
                    component = "service",
                    op = "load",
                    error = %e,
                    "Failed to persist refreshed household name"
                );
            }
        }

        Ok(LoadedData {
            recipes: outcome.recipes,
            plan: outcome.plan,
            profile: outcome.profile,
        })
    }

    /// Save the full recipe collection.
    pub async fn save_recipes(&self, recipes: &[Recipe]) -> Result<SaveOutcome> {
        let household = self.membership.current();
        self.engine.save_recipes(household.as_ref(), recipes).await
    }

    /// Save the full meal plan.
    pub async fn save_plan(&self, plan: &[MealPlanItem]) -> Result<SaveOutcome> {
        let household = self.membership.current();
        self.engine.save_plan(household.as_ref(), plan).await
    }

    /// Save the profile. Always local-only, never replicated.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.engine.save_profile(profile).await
    }

    // =========================================================================
    // HOUSEHOLD LIFECYCLE
    // =========================================================================

    /// Create a household and adopt it. Callers are expected to follow up
    /// with [`sync_local_to_cloud`](Self::sync_local_to_cloud) so
    /// pre-existing local data is not silently stranded.
    ///
    /// Failures are surfaced: there is no safe default to fall back to.
    pub async fn create_household(&self, name: &str) -> Result<Household> {
        let household = Household {
            id: new_id(),
            name: name.to_string(),
            code: new_join_code(),
        };

        if let Err(e) = self.remote.insert_household(&household).await {
            error!(
                subsystem = "sync",
                component = "service",
                op = "create_household",
                error = %e,
                "Failed to create household"
            );
            return Err(e);
        }

        self.membership.set(household.clone()).await?;
        info!(
            subsystem = "sync",
            component = "service",
            op = "create_household",
            household_id = %household.id,
            "Household created"
        );
        Ok(household)
    }

    /// Resolve a join code and adopt the household. `Ok(None)` is the
    /// normal "no such code" outcome — the pointer is left untouched and
    /// the caller decides what to tell the user.
    pub async fn join_household(&self, code: &str) -> Result<Option<Household>> {
        let Some(household) = self.remote.find_household_by_code(code).await? else {
            info!(
                subsystem = "sync",
                component = "service",
                op = "join_household",
                "Join code not found"
            );
            return Ok(None);
        };

        self.membership.set(household.clone()).await?;
        info!(
            subsystem = "sync",
            component = "service",
            op = "join_household",
            household_id = %household.id,
            "Household joined"
        );
        Ok(Some(household))
    }

    /// One-time upsert of the device's local collections into a newly
    /// adopted household. Never deletes remote rows.
    pub async fn sync_local_to_cloud(
        &self,
        household_id: &str,
        recipes: &[Recipe],
        plan: &[MealPlanItem],
    ) -> Result<()> {
        self.engine
            .sync_local_to_cloud(household_id, recipes, plan)
            .await
    }

    /// Discard the local pointer. The remote household and its data
    /// persist for other members.
    pub async fn leave_household(&self) -> Result<()> {
        self.membership.clear().await
    }

    /// Rename the household remotely, then update the cached pointer to
    /// match. Failures are surfaced for a retry prompt.
    pub async fn update_household_name(&self, id: &str, name: &str) -> Result<()> {
        self.remote.rename_household(id, name).await?;

        if self
            .membership
            .current()
            .is_some_and(|current| current.id == id)
        {
            self.membership.set_name(name).await?;
        }
        Ok(())
    }

    // =========================================================================
    // CHANGE NOTIFICATIONS
    // =========================================================================

    /// Subscribe to remote changes for a household. `on_change` fires on
    /// any insert/update/delete of the household's recipe or plan rows
    /// and on a rename of the household itself; the caller reacts by
    /// reloading.
    ///
    /// On a rename the cached pointer is updated *before* `on_change`
    /// fires, so observers always read a consistent pointer.
    pub async fn subscribe_to_changes(
        &self,
        household_id: &str,
        on_change: impl Fn() + Send + Sync + 'static,
    ) -> Result<ChangeSubscription> {
        let mut feed = self.notifier.watch(household_id).await?;
        let membership = self.membership.clone();

        let forwarder = tokio::spawn(async move {
            while let Some(event) = feed.next().await {
                if let ChangeEvent::HouseholdRenamed { ref name } = event {
                    if let Err(e) = membership.set_name(name).await {
                        warn!(
                            subsystem = "sync",
                            component = "service",
                            op = "subscribe",
                            error = %e,
                            "Failed to persist renamed household pointer"
                        );
                    }
                }
                on_change();
            }
        });

        Ok(ChangeSubscription { forwarder })
    }
}
