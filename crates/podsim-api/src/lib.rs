//! podsim-api: REST API server for podsim
//!
//! This crate provides the REST API for interacting with podsim:
//! - Scenario management
//! - Scheduling runs and their decisions
//! - System status

pub mod rest;

pub use rest::{cors_layer, create_router, AppState};
