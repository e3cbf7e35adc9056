//! Run registry

use podsim_core::{PodsimError, PodsimResult, RunRecord};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Default)]
struct Runs {
    records: HashMap<Uuid, RunRecord>,
    /// Insertion order, oldest first
    order: VecDeque<Uuid>,
}

/// Completed runs indexed by ID.
///
/// Records and their insertion order share one lock, and every mutation
/// holds it for writing, so at most one mutation per run is ever in flight.
pub struct RunStore {
    runs: RwLock<Runs>,
    /// Maximum number of runs kept; 0 means unbounded
    max_runs: usize,
}

impl RunStore {
    /// Create a store that keeps at most `max_runs` records (0 for no limit)
    pub fn new(max_runs: usize) -> Self {
        Self {
            runs: RwLock::new(Runs::default()),
            max_runs,
        }
    }

    /// Store a run, evicting the oldest runs if the store is full
    pub async fn insert(&self, record: RunRecord) {
        let mut runs = self.runs.write().await;

        if self.max_runs > 0 {
            while runs.records.len() >= self.max_runs {
                let Some(oldest) = runs.order.pop_front() else {
                    break;
                };
                if runs.records.remove(&oldest).is_some() {
                    warn!(run_id = %oldest, "Evicting run (store full)");
                }
            }
        }

        info!(
            run_id = %record.id,
            strategy = %record.strategy,
            scheduled = record.summary.scheduled,
            unscheduled = record.summary.unscheduled,
            "Stored run"
        );
        runs.order.push_back(record.id);
        runs.records.insert(record.id, record);
    }

    /// Get a run by ID
    pub async fn get(&self, id: Uuid) -> PodsimResult<RunRecord> {
        self.runs
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| PodsimError::RunNotFound(id.to_string()))
    }

    /// List all runs, oldest first
    pub async fn list(&self) -> Vec<RunRecord> {
        let runs = self.runs.read().await;
        runs.order
            .iter()
            .filter_map(|id| runs.records.get(id))
            .cloned()
            .collect()
    }

    /// Remove a run
    pub async fn remove(&self, id: Uuid) -> PodsimResult<()> {
        let mut runs = self.runs.write().await;
        if runs.records.remove(&id).is_none() {
            return Err(PodsimError::RunNotFound(id.to_string()));
        }
        runs.order.retain(|r| *r != id);
        debug!(run_id = %id, "Removed run");
        Ok(())
    }

    /// Number of stored runs
    pub async fn len(&self) -> usize {
        self.runs.read().await.records.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.records.is_empty()
    }
}
