//! Versioned upgrade chain for stored recipe payloads.
//!
//! Recipe payloads are persisted as free-form JSON (the device cache blobs
//! and the remote `data` column), stamped with a `schemaVersion` field.
//! Every read path runs [`upgrade_recipe`] before a payload reaches the
//! caller, so obsolete field values written by earlier releases keep
//! loading. Upgraded payloads are only re-persisted by the next save.
//!
//! The chain operates on raw [`serde_json::Value`] rather than typed
//! records: legacy values (for example the retired lunch/dinner category
//! strings) no longer deserialize into the current enums, so the rewrite
//! has to happen before the typed decode.

use serde_json::{json, Value as JsonValue};
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{Category, Recipe};

/// Current recipe payload schema version.
///
/// * v1 — first release: separate lunch/dinner categories, no `tags`.
/// * v2 — unified main-meal category, `tags` always present.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Retired category value that used to denote the lunch meal slot.
pub const LEGACY_LUNCH: &str = "午餐";

/// Retired category value that used to denote the dinner meal slot.
pub const LEGACY_DINNER: &str = "晚餐";

const VERSION_FIELD: &str = "schemaVersion";

/// Run the upgrade chain on a raw recipe payload and decode it.
///
/// Idempotent: a payload that is already current passes through the chain
/// unchanged. Payloads stamped with a version newer than
/// [`CURRENT_SCHEMA_VERSION`] are decoded as-is and keep their stamp.
pub fn upgrade_recipe(mut payload: JsonValue) -> Result<Recipe> {
    if !payload.is_object() {
        return Err(Error::Serialization(
            "recipe payload is not a JSON object".to_string(),
        ));
    }

    let mut version = payload
        .get(VERSION_FIELD)
        .and_then(JsonValue::as_u64)
        .unwrap_or(1) as u32;

    while version < CURRENT_SCHEMA_VERSION {
        match version {
            1 => upgrade_v1_to_v2(&mut payload),
            other => {
                // Unknown intermediate version; nothing left to apply.
                warn!(
                    subsystem = "sync",
                    component = "migrate",
                    schema_version = other,
                    "No upgrade step registered for payload version"
                );
                break;
            }
        }
        version += 1;
    }

    if let Some(object) = payload.as_object_mut() {
        object.insert(VERSION_FIELD.to_string(), json!(version));
    }

    serde_json::from_value(payload).map_err(Error::from)
}

/// v1 → v2: rewrite the retired lunch/dinner categories to the unified
/// main-meal category and make `tags` always present.
fn upgrade_v1_to_v2(payload: &mut JsonValue) {
    let Some(object) = payload.as_object_mut() else {
        return;
    };

    if let Some(category) = object.get("category").and_then(JsonValue::as_str) {
        if category == LEGACY_LUNCH || category == LEGACY_DINNER {
            object.insert("category".to_string(), json!(Category::MainMeal));
        }
    }

    let has_tags = object.get("tags").is_some_and(JsonValue::is_array);
    if !has_tags {
        object.insert("tags".to_string(), json!([]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_payload(category: &str) -> JsonValue {
        json!({
            "id": "r1",
            "title": "红烧肉",
            "category": category,
            "createdAt": 1_600_000_000_000_i64
        })
    }

    #[test]
    fn test_legacy_lunch_becomes_main_meal() {
        let recipe = upgrade_recipe(legacy_payload(LEGACY_LUNCH)).unwrap();
        assert_eq!(recipe.category, Category::MainMeal);
        assert_eq!(recipe.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_legacy_dinner_becomes_main_meal() {
        let recipe = upgrade_recipe(legacy_payload(LEGACY_DINNER)).unwrap();
        assert_eq!(recipe.category, Category::MainMeal);
    }

    #[test]
    fn test_current_categories_untouched() {
        let recipe = upgrade_recipe(legacy_payload("早餐")).unwrap();
        assert_eq!(recipe.category, Category::Breakfast);

        let recipe = upgrade_recipe(legacy_payload("正餐")).unwrap();
        assert_eq!(recipe.category, Category::MainMeal);
    }

    #[test]
    fn test_missing_tags_backfilled() {
        let recipe = upgrade_recipe(legacy_payload(LEGACY_LUNCH)).unwrap();
        assert!(recipe.tags.is_empty());
    }

    #[test]
    fn test_existing_tags_preserved() {
        let mut payload = legacy_payload(LEGACY_DINNER);
        payload["tags"] = json!(["家常", "下饭"]);

        let recipe = upgrade_recipe(payload).unwrap();
        assert_eq!(recipe.tags, vec!["家常".to_string(), "下饭".to_string()]);
    }

    #[test]
    fn test_upgrade_is_idempotent() {
        let once = upgrade_recipe(legacy_payload(LEGACY_LUNCH)).unwrap();
        let twice =
            upgrade_recipe(serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_current_payload_passes_through() {
        let payload = json!({
            "id": "r2",
            "title": "奶茶",
            "category": "饮品",
            "tags": ["甜"],
            "createdAt": 1_700_000_000_000_i64,
            "schemaVersion": CURRENT_SCHEMA_VERSION
        });

        let recipe = upgrade_recipe(payload).unwrap();
        assert_eq!(recipe.category, Category::Drink);
        assert_eq!(recipe.tags, vec!["甜".to_string()]);
        assert_eq!(recipe.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_payload_keeps_version_stamp() {
        let payload = json!({
            "id": "r3",
            "title": "future",
            "category": "其他",
            "tags": [],
            "createdAt": 0,
            "schemaVersion": CURRENT_SCHEMA_VERSION + 1
        });

        let recipe = upgrade_recipe(payload).unwrap();
        assert_eq!(recipe.schema_version, CURRENT_SCHEMA_VERSION + 1);
    }

    #[test]
    fn test_non_object_payload_rejected() {
        assert!(upgrade_recipe(json!("not a recipe")).is_err());
        assert!(upgrade_recipe(json!(42)).is_err());
    }

    #[test]
    fn test_undecodable_payload_is_error() {
        // Category string that never existed in any release.
        let payload = legacy_payload("夜宵");
        assert!(upgrade_recipe(payload).is_err());
    }
}
