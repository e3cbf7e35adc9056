//! Placement strategies and decision records

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Cluster, Pod, PodsimError};

/// How to pick among nodes that can all fit a pod
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Leave the least headroom, concentrating load
    #[default]
    Binpack,
    /// Leave the most headroom, distributing load
    Spread,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Binpack => write!(f, "binpack"),
            Strategy::Spread => write!(f, "spread"),
        }
    }
}

impl FromStr for Strategy {
    type Err = PodsimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binpack" => Ok(Strategy::Binpack),
            "spread" => Ok(Strategy::Spread),
            other => Err(PodsimError::Validation(format!(
                "unknown strategy '{}' (expected binpack or spread)",
                other
            ))),
        }
    }
}

/// Why a pod landed where it did, or why it did not land at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    #[serde(rename = "scheduled on GPU-capable node")]
    ScheduledOnGpuNode,
    #[serde(rename = "scheduled on standard node")]
    ScheduledOnStandardNode,
    #[serde(rename = "scheduled on GPU node (no standard nodes fit)")]
    ScheduledOnGpuFallback,
    #[serde(rename = "no GPU nodes available")]
    NoGpuNodes,
    #[serde(rename = "GPU nodes lack free capacity for this pod")]
    GpuCapacityExhausted,
    #[serde(rename = "no nodes have sufficient free CPU/memory")]
    InsufficientCpuMemory,
}

impl Reason {
    /// The fixed message for this reason
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::ScheduledOnGpuNode => "scheduled on GPU-capable node",
            Reason::ScheduledOnStandardNode => "scheduled on standard node",
            Reason::ScheduledOnGpuFallback => "scheduled on GPU node (no standard nodes fit)",
            Reason::NoGpuNodes => "no GPU nodes available",
            Reason::GpuCapacityExhausted => "GPU nodes lack free capacity for this pod",
            Reason::InsufficientCpuMemory => "no nodes have sufficient free CPU/memory",
        }
    }

    /// Whether this reason accompanies a successful placement
    pub fn is_scheduled(&self) -> bool {
        matches!(
            self,
            Reason::ScheduledOnGpuNode
                | Reason::ScheduledOnStandardNode
                | Reason::ScheduledOnGpuFallback
        )
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling outcome for a single pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The pod the decision is about
    pub pod: Pod,
    /// Assigned node, `None` when unscheduled
    pub node: Option<String>,
    /// Fixed-set reason
    pub reason: Reason,
}

impl Decision {
    /// A successful placement
    pub fn scheduled(pod: Pod, node: impl Into<String>, reason: Reason) -> Self {
        Self {
            pod,
            node: Some(node.into()),
            reason,
        }
    }

    /// A pod that could not be placed
    pub fn unscheduled(pod: Pod, reason: Reason) -> Self {
        Self {
            pod,
            node: None,
            reason,
        }
    }

    /// Whether the pod was placed
    pub fn is_scheduled(&self) -> bool {
        self.node.is_some()
    }
}

/// Output of one scheduling pass: decisions in admission order plus the
/// cluster state after every committed allocation.
///
/// This pair is the input contract for downstream execution simulators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub decisions: Vec<Decision>,
    pub cluster: Cluster,
}

impl Schedule {
    /// Number of pods that were placed
    pub fn scheduled_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_scheduled()).count()
    }

    /// Number of pods left unscheduled
    pub fn unscheduled_count(&self) -> usize {
        self.decisions.len() - self.scheduled_count()
    }
}
