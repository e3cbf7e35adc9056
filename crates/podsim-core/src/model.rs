//! Scenario and run record definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workload::validate_pods;
use crate::{Cluster, Decision, Pod, PodsimError, PodsimResult, Schedule, Strategy};

/// A cluster, a workload and a strategy: everything one scheduling pass needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable name
    pub name: String,
    /// Starting cluster state
    pub cluster: Cluster,
    /// Pods to admit
    #[serde(default)]
    pub pods: Vec<Pod>,
    /// Placement strategy; the daemon default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
}

impl Scenario {
    /// Create a new scenario
    pub fn new(name: impl Into<String>, cluster: Cluster, pods: Vec<Pod>) -> Self {
        Self {
            name: name.into(),
            cluster,
            pods,
            strategy: None,
        }
    }

    /// Set the strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Validate the name, cluster and pods
    pub fn validate(&self) -> PodsimResult<()> {
        if self.name.trim().is_empty() {
            return Err(PodsimError::Validation(
                "scenario name must not be empty".to_string(),
            ));
        }
        self.cluster.validate()?;
        validate_pods(&self.pods)
    }
}

/// A stored scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Scenario definition
    pub scenario: Scenario,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ScenarioRecord {
    /// Wrap a scenario with a fresh identifier
    pub fn new(scenario: Scenario) -> Self {
        Self {
            id: Uuid::new_v4(),
            scenario,
            created_at: Utc::now(),
        }
    }
}

/// Counts of scheduled and unscheduled pods in a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub scheduled: usize,
    pub unscheduled: usize,
}

impl From<&Schedule> for RunSummary {
    fn from(schedule: &Schedule) -> Self {
        Self {
            total: schedule.decisions.len(),
            scheduled: schedule.scheduled_count(),
            unscheduled: schedule.unscheduled_count(),
        }
    }
}

/// The stored result of one scheduling pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Scenario the run was created from, if it was stored
    pub scenario_id: Option<Uuid>,
    /// Strategy the pass used
    pub strategy: Strategy,
    /// Per-pod decisions in admission order
    pub decisions: Vec<Decision>,
    /// Cluster state after the pass
    pub cluster: Cluster,
    /// Scheduled/unscheduled counts
    pub summary: RunSummary,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RunRecord {
    /// Record the outcome of a pass
    pub fn new(scenario_id: Option<Uuid>, strategy: Strategy, schedule: Schedule) -> Self {
        let summary = RunSummary::from(&schedule);
        Self {
            id: Uuid::new_v4(),
            scenario_id,
            strategy,
            decisions: schedule.decisions,
            cluster: schedule.cluster,
            summary,
            created_at: Utc::now(),
        }
    }

    /// The `(decisions, cluster)` pair consumed by downstream simulators
    pub fn schedule(&self) -> Schedule {
        Schedule {
            decisions: self.decisions.clone(),
            cluster: self.cluster.clone(),
        }
    }
}
