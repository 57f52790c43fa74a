//! # Local Comment State
//!
//! Optimistic comment handling for a document view and the backoff policy
//! used by the HTTP collaborator.
//!
//! - `optimistic.rs`: ordered comment collection with provisional entries
//! - `reconciliation.rs`: matching provisional entries to server confirmations
//! - `retry.rs`: exponential backoff with jitter

pub mod optimistic;
pub mod reconciliation;
pub mod retry;

pub use optimistic::OptimisticStore;
pub use reconciliation::{find_provisional, matches_provisional, ReconcileOutcome};
pub use retry::RetryPolicy;
