//! Service facade tests: household lifecycle, pointer consistency, and
//! change-notification wiring.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::engine::SaveOutcome;
use crate::service::SyncService;
use crate::test_fixtures::{MemLocalStore, MemRemoteStore, ScriptedNotifier};
use larder_core::{Category, ChangeEvent, Household, LocalStore, Recipe};

fn recipe(id: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: format!("recipe {id}"),
        description: String::new(),
        image: String::new(),
        category: Category::MainMeal,
        tags: vec![],
        ingredients: vec![],
        steps: vec![],
        created_at: 1_700_000_000_000,
        is_favorite: false,
        rating: 0,
        schema_version: larder_core::CURRENT_SCHEMA_VERSION,
    }
}

fn household(id: &str, name: &str, code: &str) -> Household {
    Household {
        id: id.to_string(),
        name: name.to_string(),
        code: code.to_string(),
    }
}

fn ids(values: &[&str]) -> HashSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

struct Harness {
    service: SyncService,
    local: Arc<MemLocalStore>,
    remote: Arc<MemRemoteStore>,
    notifier: Arc<ScriptedNotifier>,
}

async fn harness() -> Harness {
    let local = Arc::new(MemLocalStore::new());
    let remote = Arc::new(MemRemoteStore::new());
    let notifier = Arc::new(ScriptedNotifier::new());
    let service = SyncService::new(local.clone(), remote.clone(), notifier.clone())
        .await
        .unwrap();
    Harness {
        service,
        local,
        remote,
        notifier,
    }
}

// =============================================================================
// Household lifecycle
// =============================================================================

#[tokio::test]
async fn test_create_household_adopts_pointer() {
    let h = harness().await;
    assert!(h.service.household().is_none());

    let created = h.service.create_household("我们家").await.unwrap();
    assert_eq!(created.name, "我们家");
    assert_eq!(created.code.len(), 6);
    assert_eq!(h.service.household(), Some(created.clone()));

    // The pointer is persisted, not just cached.
    assert_eq!(h.local.load_household().await.unwrap(), Some(created));
}

#[tokio::test]
async fn test_create_household_failure_surfaces_and_leaves_pointer() {
    let h = harness().await;
    h.remote.set_fail_writes(true);

    assert!(h.service.create_household("x").await.is_err());
    assert!(h.service.household().is_none());
}

#[tokio::test]
async fn test_join_unknown_code_returns_none_pointer_unchanged() {
    let h = harness().await;
    let joined = h.service.join_household("ZZZZZZ").await.unwrap();
    assert!(joined.is_none());
    assert!(h.service.household().is_none());
}

#[tokio::test]
async fn test_join_known_code_adopts_pointer() {
    let h = harness().await;
    h.remote
        .seed_household(household("h1", "Home", "AAA111"));

    let joined = h.service.join_household("AAA111").await.unwrap();
    assert_eq!(joined.as_ref().map(|x| x.id.as_str()), Some("h1"));
    assert_eq!(h.service.household().map(|x| x.id), Some("h1".to_string()));
}

#[tokio::test]
async fn test_leave_household_discards_pointer_only() {
    let h = harness().await;
    h.remote
        .seed_household(household("h1", "Home", "AAA111"));
    h.service.join_household("AAA111").await.unwrap();
    h.remote.seed_recipe("h1", &recipe("r1"));

    h.service.leave_household().await.unwrap();

    assert!(h.service.household().is_none());
    assert!(h.local.load_household().await.unwrap().is_none());
    // The remote household and its data persist for other members.
    assert_eq!(h.remote.recipe_ids_in("h1"), ids(&["r1"]));
}

#[tokio::test]
async fn test_update_household_name_updates_remote_and_pointer() {
    let h = harness().await;
    h.remote
        .seed_household(household("h1", "Old", "AAA111"));
    h.service.join_household("AAA111").await.unwrap();

    h.service
        .update_household_name("h1", "New")
        .await
        .unwrap();

    assert_eq!(h.service.household().map(|x| x.name), Some("New".to_string()));
    let remote_name = h.remote.household_name_of("h1");
    assert_eq!(remote_name.as_deref(), Some("New"));
}

#[tokio::test]
async fn test_update_other_household_leaves_pointer() {
    let h = harness().await;
    h.remote
        .seed_household(household("h1", "Mine", "AAA111"));
    h.remote
        .seed_household(household("h2", "Theirs", "BBB222"));
    h.service.join_household("AAA111").await.unwrap();

    h.service
        .update_household_name("h2", "Renamed")
        .await
        .unwrap();

    assert_eq!(
        h.service.household().map(|x| x.name),
        Some("Mine".to_string())
    );
}

// =============================================================================
// Local/remote targeting through the facade
// =============================================================================

#[tokio::test]
async fn test_saves_route_by_membership() {
    let h = harness().await;

    // No household: local.
    assert_eq!(
        h.service.save_recipes(&[recipe("r1")]).await.unwrap(),
        SaveOutcome::Local
    );

    h.remote
        .seed_household(household("h1", "Home", "AAA111"));
    h.service.join_household("AAA111").await.unwrap();

    // Household active: remote.
    assert_eq!(
        h.service.save_recipes(&[recipe("r1")]).await.unwrap(),
        SaveOutcome::Synced
    );
    assert_eq!(h.remote.recipe_ids_in("h1"), ids(&["r1"]));

    // Leaving routes back to local.
    h.service.leave_household().await.unwrap();
    assert_eq!(
        h.service.save_recipes(&[recipe("r2")]).await.unwrap(),
        SaveOutcome::Local
    );
    assert_eq!(h.remote.recipe_ids_in("h1"), ids(&["r1"]));
}

#[tokio::test]
async fn test_load_refreshes_pointer_name_from_remote() {
    let h = harness().await;
    h.remote
        .seed_household(household("h1", "Old", "AAA111"));
    h.service.join_household("AAA111").await.unwrap();

    h.remote.set_household_name("h1", "Renamed Remotely");
    h.service.load_data().await.unwrap();

    assert_eq!(
        h.service.household().map(|x| x.name),
        Some("Renamed Remotely".to_string())
    );
}

#[tokio::test]
async fn test_membership_restored_from_local_store() {
    let local = Arc::new(MemLocalStore::new());
    let remote = Arc::new(MemRemoteStore::new());
    let notifier = Arc::new(ScriptedNotifier::new());

    local.seed_household(household("h1", "Home", "AAA111"));
    let service = SyncService::new(local, remote, notifier).await.unwrap();

    assert_eq!(service.household().map(|x| x.id), Some("h1".to_string()));
}

// =============================================================================
// End-to-end adoption scenario
// =============================================================================

#[tokio::test]
async fn test_local_to_household_adoption_scenario() {
    let h = harness().await;

    // Start with no household and one locally saved recipe.
    h.service.save_recipes(&[recipe("r1")]).await.unwrap();

    // Create a household and merge the local data into it.
    let created = h.service.create_household("Home").await.unwrap();
    let loaded = h.service.load_data().await;
    assert!(loaded.is_ok()); // remote is empty but renderable
    h.service
        .sync_local_to_cloud(&created.id, &[recipe("r1")], &[])
        .await
        .unwrap();
    assert_eq!(h.remote.recipe_ids_in(&created.id), ids(&["r1"]));

    // The user deletes the recipe; the empty save reconciles it away.
    h.service.save_recipes(&[]).await.unwrap();
    assert!(h.remote.recipe_ids_in(&created.id).is_empty());
}

// =============================================================================
// Change notifications
// =============================================================================

#[tokio::test]
async fn test_change_callback_fires() {
    let h = harness().await;
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);

    let _sub = h
        .service
        .subscribe_to_changes("h1", move || {
            let _ = tx.try_send(());
        })
        .await
        .unwrap();

    h.notifier.emit(ChangeEvent::RecipesChanged).await;

    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("callback did not fire")
        .expect("channel closed");
}

#[tokio::test]
async fn test_rename_event_updates_pointer_before_callback() {
    let h = harness().await;
    h.remote
        .seed_household(household("h1", "Old", "AAA111"));
    h.service.join_household("AAA111").await.unwrap();

    let (tx, mut rx) = tokio::sync::mpsc::channel(8);
    let _sub = h
        .service
        .subscribe_to_changes("h1", move || {
            let _ = tx.try_send(());
        })
        .await
        .unwrap();

    h.notifier
        .emit(ChangeEvent::HouseholdRenamed {
            name: "新家".to_string(),
        })
        .await;

    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("callback did not fire")
        .expect("channel closed");

    // By the time the callback has fired, the pointer is consistent.
    assert_eq!(
        h.service.household().map(|x| x.name),
        Some("新家".to_string())
    );
}

#[tokio::test]
async fn test_unsubscribe_stops_callbacks() {
    let h = harness().await;
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);

    let sub = h
        .service
        .subscribe_to_changes("h1", move || {
            let _ = tx.try_send(());
        })
        .await
        .unwrap();
    sub.unsubscribe();

    h.notifier.emit(ChangeEvent::RecipesChanged).await;

    assert!(
        timeout(Duration::from_millis(100), rx.recv())
            .await
            .is_err(),
        "callback fired after unsubscribe"
    );
}
