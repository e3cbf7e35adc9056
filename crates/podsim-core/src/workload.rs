//! Pod and workload definitions

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cluster::load_definition;
use crate::{PodsimError, PodsimResult, Resource};

/// A workload unit to be placed on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    /// Pod name
    pub name: String,
    /// Optional namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Higher priorities are admitted first
    #[serde(default)]
    pub priority: i32,
    /// Requested resources
    #[serde(rename = "resources")]
    pub requests: Resource,
}

impl Pod {
    /// Create a pod with default priority and no namespace
    pub fn new(name: impl Into<String>, requests: Resource) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            priority: 0,
            requests,
        }
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// `namespace/name`, or just `name` when there is no namespace.
    ///
    /// Used for ordering and display only.
    pub fn full_name(&self) -> String {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => format!("{}/{}", ns, self.name),
            _ => self.name.clone(),
        }
    }

    /// Whether the pod asks for any GPUs
    pub fn wants_gpu(&self) -> bool {
        self.requests.gpus > 0
    }
}

/// Workload definition file format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub pods: Vec<Pod>,
}

impl Workload {
    /// Load a workload definition from a JSON or TOML file
    pub fn from_file(path: &Path) -> PodsimResult<Self> {
        let workload: Workload = load_definition(path, "workload")?;
        workload.validate()?;
        Ok(workload)
    }

    /// Parse and validate a workload definition from a JSON string
    pub fn from_json_str(json: &str) -> PodsimResult<Self> {
        let workload: Workload = serde_json::from_str(json)?;
        workload.validate()?;
        Ok(workload)
    }

    /// Check pod names are present and requests are non-negative
    pub fn validate(&self) -> PodsimResult<()> {
        validate_pods(&self.pods)
    }
}

/// Load the pods of a workload definition file
pub fn load_workload(path: &Path) -> PodsimResult<Vec<Pod>> {
    Ok(Workload::from_file(path)?.pods)
}

pub(crate) fn validate_pods(pods: &[Pod]) -> PodsimResult<()> {
    for pod in pods {
        if pod.name.trim().is_empty() {
            return Err(PodsimError::Validation(
                "pod name must not be empty".to_string(),
            ));
        }
        if !pod.requests.is_non_negative() {
            return Err(PodsimError::Validation(format!(
                "pod {} has negative resource requests",
                pod.full_name()
            )));
        }
    }
    Ok(())
}
