//! Structured logging schema and field name constants for larder.
//!
//! All crates use these constants for consistent structured logging
//! fields, so log aggregation tools can query by standardized field names
//! across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Surfaced failures (household lifecycle) requiring a user-visible retry |
//! | WARN  | Swallowed remote failures, degraded reads, skipped payloads |
//! | INFO  | Lifecycle events (connect, household create/join/leave), sync completions |
//! | DEBUG | Decision points: store targeting, diff sizes, config choices |
//! | TRACE | Per-row iteration during reconciliation |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "sync", "store", "notifier"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "engine", "pool", "local", "recipes", "households"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "load", "save", "reconcile", "watch"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Household the operation is scoped to.
pub const HOUSEHOLD_ID: &str = "household_id";

/// Collection kind being operated on ("recipes" or "plan").
pub const COLLECTION: &str = "collection";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows read, upserted, or deleted.
pub const ROW_COUNT: &str = "row_count";

/// Retry attempt counter for idempotent upserts.
pub const ATTEMPT: &str = "attempt";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
