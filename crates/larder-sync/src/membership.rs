//! Cached household membership pointer.
//!
//! Every component decides Local-vs-Remote targeting from this pointer,
//! so it must be readable without a network round trip — the cache is a
//! plain in-process copy of the local store's household blob, hydrated
//! once at service start and written through on every mutation.

use std::sync::{Arc, RwLock};

use tracing::info;

use larder_core::{Household, LocalStore, Result};

/// In-process household pointer backed by the local store.
pub struct Membership {
    local: Arc<dyn LocalStore>,
    cached: RwLock<Option<Household>>,
}

impl Membership {
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self {
            local,
            cached: RwLock::new(None),
        }
    }

    /// Hydrate the cache from the local store. Run once at service start.
    pub async fn restore(&self) -> Result<()> {
        let stored = self.local.load_household().await?;
        *self.cached.write().expect("membership lock poisoned") = stored;
        Ok(())
    }

    /// Synchronous read of the cached pointer.
    pub fn current(&self) -> Option<Household> {
        self.cached.read().expect("membership lock poisoned").clone()
    }

    /// Adopt a household: persist the pointer, then cache it.
    pub async fn set(&self, household: Household) -> Result<()> {
        self.local.store_household(&household).await?;
        *self.cached.write().expect("membership lock poisoned") = Some(household);
        Ok(())
    }

    /// Overwrite the cached pointer's display name. The remote name is
    /// authoritative over the cache for this one field. No-op when no
    /// household is joined.
    pub async fn set_name(&self, name: &str) -> Result<()> {
        let updated = {
            let mut guard = self.cached.write().expect("membership lock poisoned");
            match guard.as_mut() {
                Some(household) => {
                    household.name = name.to_string();
                    Some(household.clone())
                }
                None => None,
            }
        };
        if let Some(household) = updated {
            self.local.store_household(&household).await?;
        }
        Ok(())
    }

    /// Leave the household: discard the pointer. Never a remote mutation;
    /// the household row and its data persist for other members.
    pub async fn clear(&self) -> Result<()> {
        self.local.clear_household().await?;
        *self.cached.write().expect("membership lock poisoned") = None;
        info!(
            subsystem = "sync",
            component = "membership",
            op = "leave",
            "Household pointer discarded"
        );
        Ok(())
    }
}
