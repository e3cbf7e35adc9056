//! Error types for podsim

use thiserror::Error;

/// Main error type for podsim
#[derive(Error, Debug)]
pub enum PodsimError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A cluster, workload or scenario definition failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Scenario not found
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Run not found
    #[error("Run not found: {0}")]
    RunNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for podsim operations
pub type PodsimResult<T> = Result<T, PodsimError>;

impl From<serde_json::Error> for PodsimError {
    fn from(err: serde_json::Error) -> Self {
        PodsimError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PodsimError {
    fn from(err: toml::de::Error) -> Self {
        PodsimError::Config(err.to_string())
    }
}
