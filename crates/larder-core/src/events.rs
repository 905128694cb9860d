//! Change events and the feed that delivers them.
//!
//! When a household is active, every device subscribed to it receives a
//! [`ChangeEvent`] whenever any member writes to the household's recipe
//! rows, plan rows, or renames the household itself. Events carry no row
//! data; the consumer reacts by re-running the load path.
//!
//! Delivery is an mpsc channel owned by a listener task. Dropping the
//! [`ChangeFeed`] aborts that task, so a feed can never outlive its
//! consumer and leak a channel across household switches.

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A remote change observed for the subscribed household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    /// A recipe row was inserted, updated, or deleted.
    RecipesChanged,
    /// A plan row was inserted, updated, or deleted.
    PlanChanged,
    /// The household's display name was updated.
    HouseholdRenamed { name: String },
}

impl ChangeEvent {
    /// Event type name, as used in structured logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            ChangeEvent::RecipesChanged => "RecipesChanged",
            ChangeEvent::PlanChanged => "PlanChanged",
            ChangeEvent::HouseholdRenamed { .. } => "HouseholdRenamed",
        }
    }

    /// The remote table this event originates from.
    pub fn table(&self) -> &'static str {
        match self {
            ChangeEvent::RecipesChanged => "recipes",
            ChangeEvent::PlanChanged => "plans",
            ChangeEvent::HouseholdRenamed { .. } => "households",
        }
    }
}

/// Guard that aborts the producing listener task when dropped.
pub struct FeedGuard {
    handle: JoinHandle<()>,
}

impl FeedGuard {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }
}

impl Drop for FeedGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Stream of change events for one household subscription.
pub struct ChangeFeed {
    events: mpsc::Receiver<ChangeEvent>,
    _guard: FeedGuard,
}

impl ChangeFeed {
    pub fn new(events: mpsc::Receiver<ChangeEvent>, guard: FeedGuard) -> Self {
        Self {
            events,
            _guard: guard,
        }
    }

    /// Receive the next event. `None` once the producing listener is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Tear the subscription down, stopping the listener task.
    pub fn close(self) {}
}
