//! podsim-core: Core types for the podsim placement simulator
//!
//! This crate provides the data model every other podsim crate operates on:
//! - Resource vectors and their arithmetic
//! - Nodes, clusters and cluster/workload loaders
//! - Pods, strategies and placement decisions
//! - Scenario and run records
//! - Configuration types
//! - Error handling

pub mod cluster;
pub mod config;
pub mod decision;
pub mod error;
pub mod model;
pub mod resource;
pub mod workload;

pub use cluster::*;
pub use config::*;
pub use decision::*;
pub use error::*;
pub use model::*;
pub use resource::*;
pub use workload::*;
