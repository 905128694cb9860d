//! Centralized default constants for the larder system.
//!
//! **This module is the single source of truth** for shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers. The `fn` helpers exist for serde `default = "..."`
//! attributes on wire-facing types.

use crate::migrate::CURRENT_SCHEMA_VERSION;

// =============================================================================
// PROFILE
// =============================================================================

/// Default profile display name.
pub const PROFILE_NAME: &str = "我的食堂";

/// Default profile avatar glyph.
pub const PROFILE_AVATAR: &str = "🐧";

/// Default profile tagline.
pub const PROFILE_TAGLINE: &str = "今天也要好好吃饭";

/// Default home-screen title.
pub const TITLE_HOME: &str = "企鹅食堂";

/// Default planner title.
pub const TITLE_PLANNER: &str = "饮食计划";

/// Default planner subtitle.
pub const TITLE_PLANNER_SUBTITLE: &str = "Meal Planner";

/// Default shopping-list title.
pub const TITLE_SHOPPING: &str = "购物清单";

// =============================================================================
// HOUSEHOLD
// =============================================================================

/// Length of a generated join code.
pub const JOIN_CODE_LENGTH: usize = 6;

/// Alphabet a join code is drawn from. Uppercase alphanumerics only, so
/// codes survive being read aloud or typed on a phone keyboard.
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// =============================================================================
// SYNC
// =============================================================================

/// Buffered capacity of a change feed before the listener applies
/// backpressure.
pub const CHANGE_FEED_CAPACITY: usize = 32;

/// Additional attempts for a failed remote upsert. Upserts are idempotent
/// full-row replaces, so retrying cannot duplicate data.
pub const UPSERT_MAX_RETRIES: u32 = 2;

// =============================================================================
// SERDE DEFAULT HELPERS
// =============================================================================

pub fn profile_tagline() -> String {
    PROFILE_TAGLINE.to_string()
}

pub fn title_home() -> String {
    TITLE_HOME.to_string()
}

pub fn title_planner() -> String {
    TITLE_PLANNER.to_string()
}

pub fn title_planner_subtitle() -> String {
    TITLE_PLANNER_SUBTITLE.to_string()
}

pub fn title_shopping() -> String {
    TITLE_SHOPPING.to_string()
}

pub fn schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}
