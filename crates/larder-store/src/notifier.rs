//! Realtime change notifications via Postgres LISTEN/NOTIFY.
//!
//! The migration installs triggers on `households`, `recipes`, and
//! `plans` that `pg_notify` the [`NOTIFY_CHANNEL`] with a small JSON
//! payload on every row change. [`PgChangeNotifier`] holds one LISTEN
//! session per watch, filters notifications down to the subscribed
//! household, and forwards typed [`ChangeEvent`]s over the feed.
//!
//! Notifications are fire-and-forget on the Postgres side: a listener
//! that reconnects after a network blip may have missed events. That is
//! acceptable here because consumers react to any event by reloading the
//! full state, and the next write produces the next event.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::{PgListener, PgPool};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use larder_core::{
    defaults, ChangeEvent, ChangeFeed, ChangeNotifier, Error, FeedGuard, Result,
};

/// Notification channel shared by the triggers and every listener.
pub const NOTIFY_CHANNEL: &str = "larder_changes";

/// Wire payload emitted by the notify triggers.
#[derive(Debug, Deserialize)]
struct ChangeNotification {
    table: String,
    op: String,
    household_id: String,
    #[serde(default)]
    name: Option<String>,
}

/// Map a trigger payload to the event a subscriber of `household_id`
/// should observe, if any.
fn map_notification(change: ChangeNotification, household_id: &str) -> Option<ChangeEvent> {
    if change.household_id != household_id {
        return None;
    }
    match change.table.as_str() {
        "recipes" => Some(ChangeEvent::RecipesChanged),
        "plans" => Some(ChangeEvent::PlanChanged),
        // Only a rename matters on the household row itself.
        "households" if change.op == "UPDATE" => change
            .name
            .map(|name| ChangeEvent::HouseholdRenamed { name }),
        _ => None,
    }
}

/// LISTEN/NOTIFY-backed change notifier.
#[derive(Clone)]
pub struct PgChangeNotifier {
    pool: PgPool,
}

impl PgChangeNotifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChangeNotifier for PgChangeNotifier {
    async fn watch(&self, household_id: &str) -> Result<ChangeFeed> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(Error::Database)?;
        listener
            .listen(NOTIFY_CHANNEL)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "notifier",
            op = "watch",
            household_id,
            "Change subscription opened"
        );

        let (tx, rx) = mpsc::channel(defaults::CHANGE_FEED_CAPACITY);
        let household_id = household_id.to_string();

        let handle = tokio::spawn(async move {
            loop {
                let notification = match listener.recv().await {
                    Ok(n) => n,
                    Err(e) => {
                        // recv re-establishes the connection itself; back
                        // off so a dead server does not spin the task.
                        warn!(
                            subsystem = "notifier",
                            household_id = %household_id,
                            error = %e,
                            "Notification listener error"
                        );
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                };

                let change: ChangeNotification =
                    match serde_json::from_str(notification.payload()) {
                        Ok(c) => c,
                        Err(e) => {
                            warn!(
                                subsystem = "notifier",
                                error = %e,
                                "Undecodable change notification payload"
                            );
                            continue;
                        }
                    };

                if let Some(event) = map_notification(change, &household_id) {
                    if tx.send(event).await.is_err() {
                        // Feed dropped; subscription is over.
                        break;
                    }
                }
            }
        });

        Ok(ChangeFeed::new(rx, FeedGuard::new(handle)))
    }
}
