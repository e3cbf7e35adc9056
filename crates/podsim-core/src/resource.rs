//! Resource vector arithmetic

use serde::{Deserialize, Serialize};

/// Schedulable quantities on a node, or requested by a pod.
///
/// Components are signed: subtracting a request from remaining capacity may go
/// negative, which is only ever used for comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Resource {
    /// CPU in milli-units
    #[serde(rename = "cpuMilli", alias = "cpu", default)]
    pub cpu_milli: i64,
    /// Memory in MB
    #[serde(rename = "memoryMB", alias = "memory", default)]
    pub memory_mb: i64,
    /// GPU count
    #[serde(rename = "gpus", alias = "gpu", default)]
    pub gpus: i64,
}

impl Resource {
    /// Create a new resource vector
    pub const fn new(cpu_milli: i64, memory_mb: i64, gpus: i64) -> Self {
        Self {
            cpu_milli,
            memory_mb,
            gpus,
        }
    }

    /// The zero vector
    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Accumulate `other` into `self`, component-wise
    pub fn add(&mut self, other: &Resource) {
        self.cpu_milli += other.cpu_milli;
        self.memory_mb += other.memory_mb;
        self.gpus += other.gpus;
    }

    /// Component-wise difference; components may be negative
    pub fn minus(&self, other: &Resource) -> Resource {
        Resource {
            cpu_milli: self.cpu_milli - other.cpu_milli,
            memory_mb: self.memory_mb - other.memory_mb,
            gpus: self.gpus - other.gpus,
        }
    }

    /// True if every component of `self` is at least the matching component of `other`
    pub fn covers(&self, other: &Resource) -> bool {
        self.cpu_milli >= other.cpu_milli
            && self.memory_mb >= other.memory_mb
            && self.gpus >= other.gpus
    }

    /// True if no component is negative
    pub fn is_non_negative(&self) -> bool {
        self.covers(&Resource::zero())
    }
}

impl std::iter::Sum for Resource {
    fn sum<I: Iterator<Item = Resource>>(iter: I) -> Self {
        iter.fold(Resource::zero(), |mut acc, r| {
            acc.add(&r);
            acc
        })
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cpu={}m mem={}MB gpu={}",
            self.cpu_milli, self.memory_mb, self.gpus
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates_in_place() {
        let mut acc = Resource::new(100, 256, 0);
        acc.add(&Resource::new(400, 768, 1));
        assert_eq!(acc, Resource::new(500, 1024, 1));
    }

    #[test]
    fn test_minus_may_go_negative() {
        let remaining = Resource::new(500, 512, 0);
        let after = remaining.minus(&Resource::new(1000, 256, 1));
        assert_eq!(after, Resource::new(-500, 256, -1));
        assert!(!after.is_non_negative());
    }

    #[test]
    fn test_covers_checks_every_dimension() {
        let free = Resource::new(1000, 1024, 1);
        assert!(free.covers(&Resource::new(1000, 1024, 1)));
        assert!(!free.covers(&Resource::new(1000, 1025, 0)));
        assert!(!free.covers(&Resource::new(0, 0, 2)));
    }

    #[test]
    fn test_sum() {
        let total: Resource = vec![Resource::new(1, 2, 3), Resource::new(10, 20, 30)]
            .into_iter()
            .sum();
        assert_eq!(total, Resource::new(11, 22, 33));
    }

    #[test]
    fn test_wire_names_and_aliases() {
        let r: Resource =
            serde_json::from_str(r#"{"cpuMilli": 250, "memoryMB": 512, "gpus": 1}"#).unwrap();
        assert_eq!(r, Resource::new(250, 512, 1));

        let aliased: Resource = serde_json::from_str(r#"{"cpu": 250, "memory": 512}"#).unwrap();
        assert_eq!(aliased, Resource::new(250, 512, 0));

        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["cpuMilli"], 250);
        assert_eq!(json["memoryMB"], 512);
        assert_eq!(json["gpus"], 1);
    }
}
