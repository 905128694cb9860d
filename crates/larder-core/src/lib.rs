//! # larder-core
//!
//! Core types, traits, and abstractions for the larder synchronization
//! engine.
//!
//! This crate provides the domain model (recipes, meal plan, profile,
//! household), the store traits the reconciliation engine is written
//! against, the versioned payload migration chain, and the change-event
//! types delivered by the realtime notifier. It performs no I/O.

pub mod defaults;
pub mod error;
pub mod events;
pub mod ids;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod plan;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{ChangeEvent, ChangeFeed, FeedGuard};
pub use ids::{new_id, new_join_code};
pub use migrate::{upgrade_recipe, CURRENT_SCHEMA_VERSION};
pub use models::*;
pub use traits::*;
