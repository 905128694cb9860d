//! Domain models for the larder sync engine.
//!
//! The wire shape of every type here is load-bearing: recipes, plan items
//! and profiles round-trip through JSON blobs in the device cache and
//! through the `data` column of the remote store, and payloads written by
//! earlier releases must keep loading. Field names serialize in camelCase
//! and category values serialize to their historical display strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::defaults;

// =============================================================================
// CATEGORIES
// =============================================================================

/// Recipe category.
///
/// `Message` and `ShoppingListData` repurpose the recipe shape as a generic
/// record for the kitchen message board and for shopping-list persistence.
/// That schema reuse is intentional; both are filtered out of normal recipe
/// listings by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "早餐")]
    Breakfast,
    /// Unified main-meal category. Historical payloads used two separate
    /// values for lunch and dinner; the migration chain rewrites both here.
    #[serde(rename = "正餐")]
    MainMeal,
    #[serde(rename = "小食/甜点")]
    Snack,
    #[serde(rename = "饮品")]
    Drink,
    #[serde(rename = "其他")]
    Other,
    #[serde(rename = "留言")]
    Message,
    #[serde(rename = "清单数据")]
    ShoppingListData,
}

impl Category {
    /// The serialized display string for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Breakfast => "早餐",
            Category::MainMeal => "正餐",
            Category::Snack => "小食/甜点",
            Category::Drink => "饮品",
            Category::Other => "其他",
            Category::Message => "留言",
            Category::ShoppingListData => "清单数据",
        }
    }

    /// Whether this category is an internal record kind rather than a
    /// user-visible recipe.
    pub fn is_internal(&self) -> bool {
        matches!(self, Category::Message | Category::ShoppingListData)
    }
}

// =============================================================================
// RECIPES
// =============================================================================

/// A single ingredient line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    /// Shopping-list tick state; only meaningful on `ShoppingListData`
    /// records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

/// A single preparation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub description: String,
    /// URL or inline-encoded bitmap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A recipe record.
///
/// Identity is an opaque, client-generated string; the stores never mint
/// recipe ids. Whichever store is currently authoritative owns the record;
/// the UI layer only ever holds a read cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// URL or inline-encoded bitmap; opaque to the sync core.
    #[serde(default)]
    pub image: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<RecipeStep>,
    /// Creation stamp in epoch milliseconds. Display ordering, and the
    /// sort key for `Message` records.
    pub created_at: i64,
    #[serde(default)]
    pub is_favorite: bool,
    /// 0–5.
    #[serde(default)]
    pub rating: u8,
    /// Payload schema version, stamped by the migration chain.
    #[serde(default = "defaults::schema_version")]
    pub schema_version: u32,
}

// =============================================================================
// MEAL PLAN
// =============================================================================

/// Slot of the day a plan item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    /// Whether the slot admits at most one item per date. Snacks are
    /// unbounded; every other slot is exclusive.
    pub fn is_exclusive(&self) -> bool {
        !matches!(self, MealSlot::Snack)
    }

    /// The serialized (lowercase) name of this slot.
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }
}

impl std::str::FromStr for MealSlot {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            "snack" => Ok(MealSlot::Snack),
            other => Err(crate::Error::Serialization(format!(
                "unknown meal slot: {other}"
            ))),
        }
    }
}

/// One scheduled meal.
///
/// `recipe_id` is a loose reference: a recipe deleted while still planned
/// leaves a dangling id, which readers must tolerate rather than treat as
/// corruption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanItem {
    pub id: String,
    /// Calendar date, no timezone.
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub slot: MealSlot,
    pub recipe_id: String,
}

// =============================================================================
// PROFILE
// =============================================================================

/// The four customizable UI-label slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileTitles {
    #[serde(default = "defaults::title_home")]
    pub home: String,
    #[serde(default = "defaults::title_planner")]
    pub planner: String,
    #[serde(default = "defaults::title_planner_subtitle")]
    pub planner_subtitle: String,
    #[serde(default = "defaults::title_shopping")]
    pub shopping: String,
}

impl Default for ProfileTitles {
    fn default() -> Self {
        Self {
            home: defaults::title_home(),
            planner: defaults::title_planner(),
            planner_subtitle: defaults::title_planner_subtitle(),
            shopping: defaults::title_shopping(),
        }
    }
}

/// Per-device user profile.
///
/// Always local-only: never replicated to the remote store, and therefore
/// never shared across household members even while recipe and plan
/// collections are. Personalization is per-person, meal data is
/// per-household.
///
/// `tagline` and `titles` were added after the first release; profiles
/// persisted without them backfill their defaults at deserialization time,
/// and the backfilled shape is persisted by the next save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    /// Emoji glyph or inline-encoded bitmap.
    pub avatar: String,
    #[serde(default = "defaults::profile_tagline")]
    pub tagline: String,
    #[serde(default)]
    pub titles: ProfileTitles,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: defaults::PROFILE_NAME.to_string(),
            avatar: defaults::PROFILE_AVATAR.to_string(),
            tagline: defaults::profile_tagline(),
            titles: ProfileTitles::default(),
        }
    }
}

// =============================================================================
// HOUSEHOLD
// =============================================================================

/// The sharing scope: a group of devices that see the same recipe and plan
/// collections.
///
/// A device belongs to at most one household at a time. Membership is a
/// locally cached pointer, not a remote row — leaving a household discards
/// the pointer and never mutates the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    pub id: String,
    pub name: String,
    /// Short uppercase join token. Unique enough that collisions are
    /// operationally negligible, not cryptographically guaranteed.
    pub code: String,
}
