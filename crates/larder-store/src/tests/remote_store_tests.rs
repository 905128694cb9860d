//! Integration tests for the PostgreSQL remote store.
//!
//! These tests require a running PostgreSQL database with DATABASE_URL
//! set (default: the local test instance on port 15432):
//! ```
//! cargo test -p larder-store -- --ignored
//! ```

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::test_fixtures::TestDatabase;
use larder_core::{
    new_id, Category, ChangeEvent, ChangeNotifier, MealPlanItem, MealSlot, Recipe,
};

fn recipe(id: &str, title: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: title.to_string(),
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

fn plan_item(id: &str, day: u32, slot: MealSlot) -> MealPlanItem {
    MealPlanItem {
        id: id.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 5, day).unwrap(),
        slot,
        recipe_id: new_id(),
    }
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_recipe_upsert_and_ids() {
    let test_db = TestDatabase::new().await;
    let household = test_db.seed_household("Home").await;

    test_db
        .store
        .recipes
        .upsert(&household.id, &[recipe("r1", "a"), recipe("r2", "b")])
        .await
        .unwrap();

    let ids = test_db
        .store
        .recipes
        .ids_for_household(&household.id)
        .await
        .unwrap();
    assert_eq!(
        ids,
        HashSet::from(["r1".to_string(), "r2".to_string()])
    );

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_recipe_upsert_replaces_full_row() {
    let test_db = TestDatabase::new().await;
    let household = test_db.seed_household("Home").await;

    test_db
        .store
        .recipes
        .upsert(&household.id, &[recipe("r1", "original")])
        .await
        .unwrap();

    let mut updated = recipe("r1", "updated");
    updated.rating = 5;
    test_db
        .store
        .recipes
        .upsert(&household.id, &[updated])
        .await
        .unwrap();

    let payloads = test_db
        .store
        .recipes
        .fetch_for_household(&household.id)
        .await
        .unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["title"], "updated");
    assert_eq!(payloads[0]["rating"], 5);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_recipe_delete_scoped_to_ids() {
    let test_db = TestDatabase::new().await;
    let household = test_db.seed_household("Home").await;

    test_db
        .store
        .recipes
        .upsert(
            &household.id,
            &[recipe("r1", "a"), recipe("r2", "b"), recipe("r3", "c")],
        )
        .await
        .unwrap();

    test_db
        .store
        .recipes
        .delete(&household.id, &["r1".to_string(), "r3".to_string()])
        .await
        .unwrap();

    let ids = test_db
        .store
        .recipes
        .ids_for_household(&household.id)
        .await
        .unwrap();
    assert_eq!(ids, HashSet::from(["r2".to_string()]));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_diff_by_identity_sequence() {
    // The exact fetch-ids / delete / upsert sequence the engine performs.
    let test_db = TestDatabase::new().await;
    let household = test_db.seed_household("Home").await;
    let store = &test_db.store;

    store
        .recipes
        .upsert(
            &household.id,
            &[recipe("r1", "a"), recipe("r2", "b"), recipe("r3", "c")],
        )
        .await
        .unwrap();

    // New full collection drops r1/r3 and introduces r4.
    let local = [recipe("r2", "b"), recipe("r4", "d")];
    let local_ids: HashSet<&str> = local.iter().map(|r| r.id.as_str()).collect();

    let remote_ids = store.recipes.ids_for_household(&household.id).await.unwrap();
    let to_delete: Vec<String> = remote_ids
        .into_iter()
        .filter(|id| !local_ids.contains(id.as_str()))
        .collect();

    store
        .recipes
        .delete(&household.id, &to_delete)
        .await
        .unwrap();
    store.recipes.upsert(&household.id, &local).await.unwrap();

    let after = store.recipes.ids_for_household(&household.id).await.unwrap();
    assert_eq!(
        after,
        HashSet::from(["r2".to_string(), "r4".to_string()])
    );

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_plan_round_trip() {
    let test_db = TestDatabase::new().await;
    let household = test_db.seed_household("Home").await;

    let items = vec![
        plan_item("p1", 1, MealSlot::Breakfast),
        plan_item("p2", 1, MealSlot::Snack),
        plan_item("p3", 2, MealSlot::Dinner),
    ];
    test_db
        .store
        .plans
        .upsert(&household.id, &items)
        .await
        .unwrap();

    let mut fetched = test_db
        .store
        .plans
        .fetch_for_household(&household.id)
        .await
        .unwrap();
    fetched.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(fetched, items);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_household_rename_and_name() {
    let test_db = TestDatabase::new().await;
    let household = test_db.seed_household("Old Name").await;

    test_db
        .store
        .households
        .rename(&household.id, "New Name")
        .await
        .unwrap();

    let name = test_db
        .store
        .households
        .name(&household.id)
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some("New Name"));

    // Renaming a household that does not exist is surfaced.
    let missing = test_db.store.households.rename(&new_id(), "x").await;
    assert!(missing.is_err());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_unknown_join_code_resolves_to_none() {
    let test_db = TestDatabase::new().await;
    let resolved = test_db
        .store
        .households
        .find_by_code("ZZZZZZ")
        .await
        .unwrap();
    assert!(resolved.is_none());
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_notifier_delivers_recipe_change() {
    let test_db = TestDatabase::new().await;
    let household = test_db.seed_household("Home").await;

    let notifier = crate::PgChangeNotifier::new(test_db.pool.clone());
    let mut feed = notifier.watch(&household.id).await.unwrap();

    test_db
        .store
        .recipes
        .upsert(&household.id, &[recipe("r1", "a")])
        .await
        .unwrap();

    let event = tokio::time::timeout(std::time::Duration::from_secs(5), feed.next())
        .await
        .expect("timed out waiting for change event");
    assert_eq!(event, Some(ChangeEvent::RecipesChanged));

    test_db.cleanup().await;
}
