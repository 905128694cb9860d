//! # larder-sync
//!
//! The reconciliation engine and service facade for larder.
//!
//! A single user's locally-stored recipe and meal-plan data transparently
//! becomes a multi-device, multi-user shared dataset (a "household")
//! backed by the remote store with realtime change notifications — and
//! falls back to pure local storage when no household exists.
//!
//! ## Example
//!
//! ```rust,ignore
//! use larder_sync::{SyncConfig, SyncService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let _guard = larder_sync::logging::init_logging();
//!     let service = SyncService::connect(&SyncConfig::from_env()).await?;
//!
//!     let data = service.load_data().await?;
//!     println!("{} recipes", data.recipes.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod logging;
pub mod membership;
pub mod service;

#[cfg(test)]
mod tests;

// In-memory store fixtures for engine and service tests
// Note: Always compiled so downstream integration tests can use them
pub mod test_fixtures;

// Re-export core types
pub use larder_core::*;

pub use config::SyncConfig;
pub use engine::{LoadOutcome, SaveOutcome, SyncEngine};
pub use membership::Membership;
pub use service::{ChangeSubscription, LoadedData, SyncService};
