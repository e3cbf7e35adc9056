//! Per-pod node selection

use podsim_core::{Cluster, Pod, Reason, Resource, Strategy};

/// Placement decision for a single pod against the current cluster state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index of the chosen node in cluster order, `None` if nothing fits
    pub node_index: Option<usize>,
    /// Why the node was (or was not) chosen
    pub reason: Reason,
}

impl Placement {
    fn on(node_index: usize, reason: Reason) -> Self {
        Self {
            node_index: Some(node_index),
            reason,
        }
    }

    fn rejected(reason: Reason) -> Self {
        Self {
            node_index: None,
            reason,
        }
    }
}

/// Candidate pool and the keys it is scored by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    /// Scored by (remaining GPU, remaining CPU)
    Gpu,
    /// Scored by (remaining CPU, remaining memory)
    Standard,
}

impl Tier {
    fn score_key(self, after: &Resource) -> (i64, i64) {
        match self {
            Tier::Gpu => (after.gpus, after.cpu_milli),
            Tier::Standard => (after.cpu_milli, after.memory_mb),
        }
    }
}

/// Whether `candidate` strictly beats `best` under `strategy`.
///
/// Ties never win, so the earliest node in cluster order is kept.
fn prefers(strategy: Strategy, candidate: (i64, i64), best: (i64, i64)) -> bool {
    match strategy {
        Strategy::Binpack => candidate < best,
        Strategy::Spread => candidate > best,
    }
}

/// Pick the best node among those whose GPU capability matches `gpu_nodes`
/// and that can fit `req`.
fn pick_node(
    cluster: &Cluster,
    req: &Resource,
    strategy: Strategy,
    tier: Tier,
    gpu_nodes: bool,
) -> Option<usize> {
    let mut best: Option<(usize, (i64, i64))> = None;

    for (idx, node) in cluster.nodes.iter().enumerate() {
        if node.has_gpu() != gpu_nodes || !node.can_schedule(req) {
            continue;
        }
        let key = tier.score_key(&node.remaining().minus(req));
        let better = match best {
            None => true,
            Some((_, best_key)) => prefers(strategy, key, best_key),
        };
        if better {
            best = Some((idx, key));
        }
    }

    best.map(|(idx, _)| idx)
}

/// Choose a node for `pod` without mutating the cluster.
///
/// GPU pods only ever land on GPU nodes. CPU/memory-only pods prefer nodes
/// without GPUs and fall back to GPU nodes when no standard node fits.
pub fn choose_node(cluster: &Cluster, pod: &Pod, strategy: Strategy) -> Placement {
    let req = &pod.requests;

    if pod.wants_gpu() {
        return match pick_node(cluster, req, strategy, Tier::Gpu, true) {
            Some(idx) => Placement::on(idx, Reason::ScheduledOnGpuNode),
            None if !cluster.has_gpu() => Placement::rejected(Reason::NoGpuNodes),
            None => Placement::rejected(Reason::GpuCapacityExhausted),
        };
    }

    if let Some(idx) = pick_node(cluster, req, strategy, Tier::Standard, false) {
        return Placement::on(idx, Reason::ScheduledOnStandardNode);
    }

    match pick_node(cluster, req, strategy, Tier::Standard, true) {
        Some(idx) => Placement::on(idx, Reason::ScheduledOnGpuFallback),
        None => Placement::rejected(Reason::InsufficientCpuMemory),
    }
}
