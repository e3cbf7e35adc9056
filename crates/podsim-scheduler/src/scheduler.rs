//! Main scheduler logic

use podsim_core::{Cluster, Decision, Pod, Schedule, Strategy};
use std::cmp::Reverse;
use tracing::{debug, info};

use crate::placement::choose_node;

/// Scheduler runs sequential admission passes with a fixed strategy.
///
/// It holds no cluster state of its own; every pass works on a private copy
/// of the cluster it is given, so independent passes may run concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    strategy: Strategy,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// The strategy this scheduler scores candidates with
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Place `pods` onto a copy of `base`.
    ///
    /// Returns one decision per pod in admission order, together with the
    /// cluster after every committed allocation. `base` and `pods` are left
    /// untouched.
    pub fn run(&self, base: &Cluster, pods: &[Pod]) -> Schedule {
        let mut working = base.clone();
        let mut decisions = Vec::with_capacity(pods.len());

        for pod in admission_order(pods) {
            let placement = choose_node(&working, &pod, self.strategy);

            let decision = match placement.node_index {
                Some(idx) => {
                    let node = &mut working.nodes[idx];
                    node.allocate(&pod.requests);
                    Decision::scheduled(pod, node.name.clone(), placement.reason)
                }
                None => Decision::unscheduled(pod, placement.reason),
            };

            debug!(
                pod = %decision.pod.full_name(),
                node = decision.node.as_deref().unwrap_or("-"),
                reason = %decision.reason,
                "Pod decided"
            );
            decisions.push(decision);
        }

        let schedule = Schedule {
            decisions,
            cluster: working,
        };

        info!(
            strategy = %self.strategy,
            pods = schedule.decisions.len(),
            scheduled = schedule.scheduled_count(),
            unscheduled = schedule.unscheduled_count(),
            "Scheduling pass complete"
        );

        schedule
    }
}

/// Run a single pass with `strategy`
pub fn run(base: &Cluster, pods: &[Pod], strategy: Strategy) -> Schedule {
    Scheduler::new(strategy).run(base, pods)
}

/// Order pods for admission: higher priority first, then ascending full name.
///
/// Distinct pods can share a full name (`a` + `b/c` and `a/b` + `c`), so the
/// raw namespace, name and requests break any remaining tie. The result
/// depends only on the multiset of pods, never on the input order. The input
/// is not modified.
pub fn admission_order(pods: &[Pod]) -> Vec<Pod> {
    let mut ordered = pods.to_vec();
    ordered.sort_by_cached_key(|p| {
        (
            Reverse(p.priority),
            p.full_name(),
            p.namespace.clone(),
            p.name.clone(),
            p.requests,
        )
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use podsim_core::{Node, Reason, Resource};

    fn standard_cluster() -> Cluster {
        Cluster::new(vec![
            Node::new("cpu-a", Resource::new(4000, 8192, 0)),
            Node::new("cpu-b", Resource::new(8000, 16384, 0)),
            Node::new("gpu-a", Resource::new(16000, 65536, 2)),
            Node::new("gpu-b", Resource::new(16000, 65536, 4)),
        ])
    }

    fn mixed_pods() -> Vec<Pod> {
        vec![
            Pod::new("web", Resource::new(1000, 2048, 0)).with_namespace("prod"),
            Pod::new("cache", Resource::new(2000, 4096, 0)).with_priority(3),
            Pod::new("train", Resource::new(4000, 16384, 2)).with_priority(10),
            Pod::new("infer", Resource::new(2000, 8192, 1)).with_namespace("ml"),
            Pod::new("batch", Resource::new(6000, 8192, 0)),
            Pod::new("huge", Resource::new(64000, 8192, 0)),
            Pod::new("gpu-hog", Resource::new(1000, 1024, 8)).with_priority(1),
        ]
    }

    fn reversed(pods: &[Pod]) -> Vec<Pod> {
        pods.iter().rev().cloned().collect()
    }

    #[test]
    fn test_admission_order() {
        let pods = vec![
            Pod::new("b", Resource::zero()),
            Pod::new("a", Resource::zero()).with_namespace("z"),
            Pod::new("c", Resource::zero()).with_priority(2),
            Pod::new("a", Resource::zero()),
        ];
        let names: Vec<String> = admission_order(&pods).iter().map(Pod::full_name).collect();
        assert_eq!(names, vec!["c", "a", "b", "z/a"]);

        // Input untouched.
        assert_eq!(pods[0].name, "b");
    }

    #[test]
    fn test_admission_order_ignores_input_order() {
        let pods = vec![
            Pod::new("dup", Resource::new(100, 0, 0)),
            Pod::new("dup", Resource::new(200, 0, 0)),
            Pod::new("x", Resource::zero()).with_priority(-1),
        ];
        assert_eq!(admission_order(&pods), admission_order(&reversed(&pods)));
    }

    #[test]
    fn test_decisions_in_admission_order() {
        let pods = mixed_pods();
        let schedule = run(&standard_cluster(), &pods, Strategy::Binpack);

        assert_eq!(schedule.decisions.len(), pods.len());
        let names: Vec<String> = schedule.decisions.iter().map(|d| d.pod.full_name()).collect();
        let expected: Vec<String> = admission_order(&pods).iter().map(Pod::full_name).collect();
        assert_eq!(names, expected);
        assert_eq!(names[0], "train");
    }

    #[test]
    fn test_gpu_pods_only_land_on_gpu_nodes() {
        for strategy in [Strategy::Binpack, Strategy::Spread] {
            let schedule = run(&standard_cluster(), &mixed_pods(), strategy);
            for decision in schedule.decisions.iter().filter(|d| d.pod.wants_gpu()) {
                if let Some(node) = &decision.node {
                    assert!(schedule.cluster.node(node).unwrap().has_gpu());
                }
            }
        }
    }

    #[test]
    fn test_allocations_are_conserved() {
        for strategy in [Strategy::Binpack, Strategy::Spread] {
            let schedule = run(&standard_cluster(), &mixed_pods(), strategy);
            let placed: Resource = schedule
                .decisions
                .iter()
                .filter(|d| d.is_scheduled())
                .map(|d| d.pod.requests)
                .sum();

            assert_eq!(schedule.cluster.total_allocated(), placed);
            for node in &schedule.cluster.nodes {
                assert!(node.remaining().is_non_negative(), "{} overcommitted", node.name);
            }
        }
    }

    #[test]
    fn test_conservation_counts_pre_existing_allocations() {
        let mut base = standard_cluster();
        base.nodes[0].allocate(&Resource::new(1000, 1024, 0));
        let schedule = run(&base, &mixed_pods(), Strategy::Spread);

        let placed: Resource = schedule
            .decisions
            .iter()
            .filter(|d| d.is_scheduled())
            .map(|d| d.pod.requests)
            .sum();
        let mut expected = base.total_allocated();
        expected.add(&placed);
        assert_eq!(schedule.cluster.total_allocated(), expected);
    }

    #[test]
    fn test_deterministic_regardless_of_input_order() {
        let pods = mixed_pods();
        for strategy in [Strategy::Binpack, Strategy::Spread] {
            let forward = run(&standard_cluster(), &pods, strategy);
            let backward = run(&standard_cluster(), &reversed(&pods), strategy);
            assert_eq!(forward, backward);
        }
    }

    #[test]
    fn test_base_cluster_untouched() {
        let base = standard_cluster();
        let snapshot = base.clone();
        let pods = mixed_pods();

        let schedule = run(&base, &pods, Strategy::Binpack);

        assert_eq!(base, snapshot);
        assert_eq!(pods, mixed_pods());
        assert_ne!(schedule.cluster, base);
    }

    #[test]
    fn test_binpack_vs_spread() {
        let cluster = Cluster::new(vec![
            Node::new("a", Resource::new(1000, 1024, 0)),
            Node::new("b", Resource::new(2000, 2048, 0)),
        ]);
        let pods = vec![Pod::new("p", Resource::new(500, 512, 0))];

        let binpack = run(&cluster, &pods, Strategy::Binpack);
        assert_eq!(binpack.decisions[0].node.as_deref(), Some("a"));

        let spread = run(&cluster, &pods, Strategy::Spread);
        assert_eq!(spread.decisions[0].node.as_deref(), Some("b"));
    }

    #[test]
    fn test_no_gpu_nodes_available() {
        let cluster = Cluster::new(vec![Node::new("cpu", Resource::new(8000, 16384, 0))]);
        let pods = vec![Pod::new("train", Resource::new(1000, 1024, 1))];

        let schedule = run(&cluster, &pods, Strategy::Binpack);
        assert_eq!(schedule.decisions[0].node, None);
        assert_eq!(schedule.decisions[0].reason, Reason::NoGpuNodes);
        assert_eq!(schedule.cluster, cluster);
    }

    #[test]
    fn test_gpu_capacity_exhausted() {
        let mut gpu = Node::new("gpu", Resource::new(8000, 16384, 2));
        gpu.allocate(&Resource::new(0, 0, 2));
        let cluster = Cluster::new(vec![gpu]);
        let pods = vec![Pod::new("train", Resource::new(1000, 1024, 1))];

        let schedule = run(&cluster, &pods, Strategy::Spread);
        assert_eq!(schedule.decisions[0].node, None);
        assert_eq!(schedule.decisions[0].reason, Reason::GpuCapacityExhausted);
    }

    #[test]
    fn test_fallback_to_gpu_node() {
        let cluster = Cluster::new(vec![Node::new("gpu", Resource::new(8000, 16384, 1))]);
        let pods = vec![Pod::new("web", Resource::new(1000, 1024, 0))];

        let schedule = run(&cluster, &pods, Strategy::Binpack);
        assert_eq!(schedule.decisions[0].node.as_deref(), Some("gpu"));
        assert_eq!(schedule.decisions[0].reason, Reason::ScheduledOnGpuFallback);
        assert_eq!(schedule.cluster.nodes[0].allocated, Resource::new(1000, 1024, 0));
    }

    #[test]
    fn test_priority_precedence() {
        let cluster = Cluster::new(vec![Node::new("only", Resource::new(1000, 1024, 0))]);
        let high = Pod::new("zeta", Resource::new(800, 512, 0)).with_priority(5);
        let low = Pod::new("alpha", Resource::new(800, 512, 0)).with_priority(1);

        for pods in [vec![high.clone(), low.clone()], vec![low.clone(), high.clone()]] {
            let schedule = run(&cluster, &pods, Strategy::Binpack);
            let by_name = |name: &str| {
                schedule
                    .decisions
                    .iter()
                    .find(|d| d.pod.name == name)
                    .unwrap()
                    .clone()
            };

            assert_eq!(by_name("zeta").node.as_deref(), Some("only"));
            let rejected = by_name("alpha");
            assert_eq!(rejected.node, None);
            assert_eq!(rejected.reason, Reason::InsufficientCpuMemory);
        }
    }

    #[test]
    fn test_later_pods_see_earlier_allocations() {
        let cluster = Cluster::new(vec![
            Node::new("a", Resource::new(2000, 4096, 0)),
            Node::new("b", Resource::new(2000, 4096, 0)),
        ]);
        let pods = vec![
            Pod::new("p1", Resource::new(1500, 1024, 0)),
            Pod::new("p2", Resource::new(1500, 1024, 0)),
        ];

        let spread = run(&cluster, &pods, Strategy::Spread);
        assert_eq!(spread.decisions[0].node.as_deref(), Some("a"));
        assert_eq!(spread.decisions[1].node.as_deref(), Some("b"));

        let binpack = run(&cluster, &pods, Strategy::Binpack);
        assert_eq!(binpack.decisions[0].node.as_deref(), Some("a"));
        assert_eq!(binpack.decisions[1].node.as_deref(), Some("b"));
    }

    #[test]
    fn test_empty_workload() {
        let schedule = Scheduler::new(Strategy::Spread).run(&standard_cluster(), &[]);
        assert!(schedule.decisions.is_empty());
        assert_eq!(schedule.cluster, standard_cluster());
    }

    #[test]
    fn test_colliding_full_names_order_independent_of_input() {
        let cluster = Cluster::new(vec![Node::new("only", Resource::new(1000, 1024, 0))]);
        let collisions = [
            vec![
                Pod::new("b/c", Resource::new(1000, 1024, 0)).with_namespace("a"),
                Pod::new("c", Resource::new(1000, 1024, 0)).with_namespace("a/b"),
            ],
            vec![
                Pod::new("x", Resource::new(1000, 1024, 0)),
                Pod::new("x", Resource::new(1000, 1024, 0)).with_namespace(""),
            ],
        ];

        for pods in collisions {
            assert_eq!(pods[0].full_name(), pods[1].full_name());
            assert_eq!(admission_order(&pods), admission_order(&reversed(&pods)));

            let forward = run(&cluster, &pods, Strategy::Binpack);
            let backward = run(&cluster, &reversed(&pods), Strategy::Binpack);
            assert_eq!(forward, backward);
            assert_eq!(forward.scheduled_count(), 1);
        }
    }
}
