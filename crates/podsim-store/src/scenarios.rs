//! Scenario registry

use podsim_core::{PodsimError, PodsimResult, Scenario, ScenarioRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Default)]
struct Scenarios {
    records: HashMap<Uuid, ScenarioRecord>,
    /// Creation order, oldest first
    order: Vec<Uuid>,
}

/// Stored scenarios indexed by ID.
///
/// Every mutation holds the write lock, so at most one mutation per scenario
/// is ever in flight.
#[derive(Default)]
pub struct ScenarioStore {
    scenarios: RwLock<Scenarios>,
}

impl ScenarioStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a scenario under a fresh ID
    pub async fn insert(&self, scenario: Scenario) -> ScenarioRecord {
        let record = ScenarioRecord::new(scenario);
        {
            let mut scenarios = self.scenarios.write().await;
            scenarios.order.push(record.id);
            scenarios.records.insert(record.id, record.clone());
        }

        info!(
            scenario_id = %record.id,
            name = %record.scenario.name,
            nodes = record.scenario.cluster.nodes.len(),
            pods = record.scenario.pods.len(),
            "Stored scenario"
        );
        record
    }

    /// Get a scenario by ID
    pub async fn get(&self, id: Uuid) -> PodsimResult<ScenarioRecord> {
        self.scenarios
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| PodsimError::ScenarioNotFound(id.to_string()))
    }

    /// Find the most recently created scenario with the given name
    pub async fn find_by_name(&self, name: &str) -> Option<ScenarioRecord> {
        let scenarios = self.scenarios.read().await;
        scenarios
            .order
            .iter()
            .rev()
            .filter_map(|id| scenarios.records.get(id))
            .find(|r| r.scenario.name == name)
            .cloned()
    }

    /// List all scenarios, oldest first
    pub async fn list(&self) -> Vec<ScenarioRecord> {
        let scenarios = self.scenarios.read().await;
        scenarios
            .order
            .iter()
            .filter_map(|id| scenarios.records.get(id))
            .cloned()
            .collect()
    }

    /// Remove a scenario
    pub async fn remove(&self, id: Uuid) -> PodsimResult<()> {
        let mut scenarios = self.scenarios.write().await;
        if scenarios.records.remove(&id).is_none() {
            return Err(PodsimError::ScenarioNotFound(id.to_string()));
        }
        scenarios.order.retain(|s| *s != id);
        debug!(scenario_id = %id, "Removed scenario");
        Ok(())
    }

    /// Number of stored scenarios
    pub async fn len(&self) -> usize {
        self.scenarios.read().await.records.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.scenarios.read().await.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podsim_core::{Cluster, Node, Pod, Resource};

    fn scenario(name: &str) -> Scenario {
        Scenario::new(
            name,
            Cluster::new(vec![Node::new("n1", Resource::new(1000, 1024, 0))]),
            vec![Pod::new("p", Resource::new(100, 128, 0))],
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = ScenarioStore::new();
        assert!(store.is_empty().await);

        let record = store.insert(scenario("small")).await;
        let fetched = store.get(record.id).await.unwrap();

        assert_eq!(fetched.scenario, scenario("small"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = ScenarioStore::new();
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PodsimError::ScenarioNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_and_remove() {
        let store = ScenarioStore::new();
        let first = store.insert(scenario("first")).await;
        let second = store.insert(scenario("second")).await;

        let third = store.insert(scenario("third")).await;

        let ids: Vec<Uuid> = store.list().await.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);

        store.remove(second.id).await.unwrap();
        assert_eq!(store.len().await, 2);
        assert!(store.remove(second.id).await.is_err());

        let ids: Vec<Uuid> = store.list().await.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let store = ScenarioStore::new();
        store.insert(scenario("gpu-heavy")).await;
        let newer = store.insert(scenario("gpu-heavy")).await;
        store.insert(scenario("other")).await;

        assert_eq!(store.find_by_name("gpu-heavy").await.unwrap().id, newer.id);
        assert!(store.find_by_name("missing").await.is_none());

        store.remove(newer.id).await.unwrap();
        assert_ne!(store.find_by_name("gpu-heavy").await.unwrap().id, newer.id);
    }
}
