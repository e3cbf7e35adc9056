//! Node and cluster definitions

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::{PodsimError, PodsimResult, Resource};

/// A node with fixed capacity and cumulative allocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node name, unique within a cluster
    pub name: String,
    /// Total schedulable capacity
    pub capacity: Resource,
    /// Resources already committed on this node
    #[serde(default)]
    pub allocated: Resource,
}

impl Node {
    /// Create an empty node with the given capacity
    pub fn new(name: impl Into<String>, capacity: Resource) -> Self {
        Self {
            name: name.into(),
            capacity,
            allocated: Resource::zero(),
        }
    }

    /// Unallocated resources on the node
    pub fn remaining(&self) -> Resource {
        self.capacity.minus(&self.allocated)
    }

    /// Whether the node exposes at least one GPU
    pub fn has_gpu(&self) -> bool {
        self.capacity.gpus > 0
    }

    /// Whether the node has enough free capacity for `req` in every dimension
    pub fn can_schedule(&self, req: &Resource) -> bool {
        self.remaining().covers(req)
    }

    /// Commit `req` to this node.
    ///
    /// Callers must check [`Node::can_schedule`] first; the node does not
    /// re-check in release builds.
    pub fn allocate(&mut self, req: &Resource) {
        debug_assert!(
            self.can_schedule(req),
            "allocation of {} exceeds remaining {} on node {}",
            req,
            self.remaining(),
            self.name
        );
        self.allocated.add(req);
    }
}

/// An ordered collection of nodes.
///
/// Node order is significant: it is the tie-break of last resort during
/// placement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub nodes: Vec<Node>,
}

impl Cluster {
    /// Create a cluster from nodes, preserving their order
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Load a cluster definition from a JSON or TOML file
    pub fn from_file(path: &Path) -> PodsimResult<Self> {
        let cluster: Cluster = load_definition(path, "cluster")?;
        cluster.validate()?;
        Ok(cluster)
    }

    /// Parse and validate a cluster definition from a JSON string
    pub fn from_json_str(json: &str) -> PodsimResult<Self> {
        let cluster: Cluster = serde_json::from_str(json)?;
        cluster.validate()?;
        Ok(cluster)
    }

    /// Check node names are present and unique and quantities are non-negative
    pub fn validate(&self) -> PodsimResult<()> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.name.trim().is_empty() {
                return Err(PodsimError::Validation(
                    "node name must not be empty".to_string(),
                ));
            }
            if !seen.insert(node.name.as_str()) {
                return Err(PodsimError::Validation(format!(
                    "duplicate node name: {}",
                    node.name
                )));
            }
            if !node.capacity.is_non_negative() {
                return Err(PodsimError::Validation(format!(
                    "node {} has negative capacity",
                    node.name
                )));
            }
            if !node.allocated.is_non_negative() {
                return Err(PodsimError::Validation(format!(
                    "node {} has negative allocation",
                    node.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a node by name
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Whether any node in the cluster has GPU capacity
    pub fn has_gpu(&self) -> bool {
        self.nodes.iter().any(Node::has_gpu)
    }

    /// Sum of capacity across all nodes
    pub fn total_capacity(&self) -> Resource {
        self.nodes.iter().map(|n| n.capacity).sum()
    }

    /// Sum of allocations across all nodes
    pub fn total_allocated(&self) -> Resource {
        self.nodes.iter().map(|n| n.allocated).sum()
    }
}

/// Read a definition file, choosing the format from the extension
pub(crate) fn load_definition<T: DeserializeOwned>(path: &Path, kind: &str) -> PodsimResult<T> {
    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&content)
            .map_err(|e| PodsimError::Config(format!("Failed to parse {} toml: {}", kind, e)))
    } else {
        serde_json::from_str(&content).map_err(|e| {
            PodsimError::Serialization(format!("Failed to parse {} json: {}", kind, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_node_remaining_and_can_schedule() {
        let mut node = Node::new("n1", Resource::new(4000, 8192, 0));
        node.allocate(&Resource::new(1000, 2048, 0));

        assert_eq!(node.remaining(), Resource::new(3000, 6144, 0));
        assert!(node.can_schedule(&Resource::new(3000, 6144, 0)));
        assert!(!node.can_schedule(&Resource::new(3001, 0, 0)));
        assert!(!node.can_schedule(&Resource::new(0, 0, 1)));
        assert!(!node.has_gpu());
    }

    #[test]
    fn test_clone_is_independent() {
        let base = Cluster::new(vec![Node::new("gpu-1", Resource::new(8000, 32768, 2))]);
        let mut working = base.clone();
        working.nodes[0].allocate(&Resource::new(1000, 1024, 1));

        assert_eq!(base.nodes[0].allocated, Resource::zero());
        assert_eq!(working.nodes[0].allocated, Resource::new(1000, 1024, 1));
    }

    #[test]
    fn test_parse_with_default_allocation() {
        let json = r#"{
            "nodes": [
                {"name": "cpu-1", "capacity": {"cpuMilli": 4000, "memoryMB": 16384, "gpus": 0}},
                {"name": "gpu-1", "capacity": {"cpuMilli": 8000, "memoryMB": 65536, "gpus": 4},
                 "allocated": {"cpuMilli": 500, "memoryMB": 1024, "gpus": 1}}
            ]
        }"#;
        let cluster = Cluster::from_json_str(json).unwrap();

        assert_eq!(cluster.nodes.len(), 2);
        assert_eq!(cluster.nodes[0].allocated, Resource::zero());
        assert_eq!(cluster.nodes[1].remaining(), Resource::new(7500, 64512, 3));
        assert!(cluster.has_gpu());
        assert_eq!(cluster.total_capacity(), Resource::new(12000, 81920, 4));
    }

    #[test]
    fn test_rejects_duplicate_node_names() {
        let cluster = Cluster::new(vec![
            Node::new("n1", Resource::new(1000, 1024, 0)),
            Node::new("n1", Resource::new(2000, 2048, 0)),
        ]);
        let err = cluster.validate().unwrap_err();
        assert!(matches!(err, PodsimError::Validation(_)));
    }

    #[test]
    fn test_rejects_negative_capacity() {
        let cluster = Cluster::new(vec![Node::new("n1", Resource::new(-1, 1024, 0))]);
        assert!(cluster.validate().is_err());
    }

    #[test]
    fn test_from_file_json_and_toml() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            json,
            r#"{{"nodes": [{{"name": "a", "capacity": {{"cpuMilli": 1000, "memoryMB": 1024, "gpus": 0}}}}]}}"#
        )
        .unwrap();
        let cluster = Cluster::from_file(json.path()).unwrap();
        assert_eq!(cluster.nodes[0].name, "a");

        let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            toml_file,
            r#"
[[nodes]]
name = "b"
capacity = {{ cpuMilli = 2000, memoryMB = 4096, gpus = 1 }}
"#
        )
        .unwrap();
        let cluster = Cluster::from_file(toml_file.path()).unwrap();
        assert_eq!(cluster.nodes[0].capacity, Resource::new(2000, 4096, 1));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Cluster::from_file(Path::new("/nonexistent/cluster.json")).unwrap_err();
        assert!(matches!(err, PodsimError::Io(_)));
    }
}
