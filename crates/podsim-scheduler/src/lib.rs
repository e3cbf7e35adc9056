//! podsim-scheduler: Resource-aware pod scheduler for podsim
//!
//! This crate provides the scheduling pass that places pods onto a cluster:
//! - Deterministic admission ordering (priority, then name)
//! - GPU-tier and standard-tier node selection
//! - Binpack and spread scoring

pub mod placement;
pub mod scheduler;

pub use placement::{choose_node, Placement};
pub use scheduler::{admission_order, run, Scheduler};
