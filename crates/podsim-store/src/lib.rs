//! podsim-store: Scenario and run registries
//!
//! This crate provides the in-memory state the API server keeps between
//! requests:
//! - Stored scenarios
//! - Completed scheduling runs, with oldest-first eviction
//!
//! Stores are plain values constructed by the caller and shared via `Arc`;
//! there is no process-global state.

pub mod runs;
pub mod scenarios;

pub use runs::RunStore;
pub use scenarios::ScenarioStore;
