//! Deployment specification.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::de;

/// Orchestrator deployment settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Deployment mode (`replicated`, `global`).
    pub mode: Option<String>,
    /// Replica count.
    pub replicas: Option<u64>,
    /// Service labels.
    #[serde(deserialize_with = "de::labels")]
    pub labels: HashMap<String, String>,
    /// Rolling update behaviour.
    pub update_config: Option<UpdateConfig>,
    /// Rollback behaviour.
    pub rollback_config: Option<UpdateConfig>,
    /// Resource limits and reservations.
    pub resources: Option<Resources>,
}

/// Rolling update or rollback settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Containers updated at a time.
    pub parallelism: Option<u64>,
    /// Wait between batches.
    #[serde(deserialize_with = "de::opt_duration")]
    pub delay: Option<Duration>,
    /// Action on failure (`continue`, `rollback`, `pause`).
    pub failure_action: Option<String>,
    /// Observation window after each task update.
    #[serde(deserialize_with = "de::opt_duration")]
    pub monitor: Option<Duration>,
    /// Tolerated failure ratio.
    pub max_failure_ratio: Option<f64>,
    /// Update order (`stop-first`, `start-first`).
    pub order: Option<String>,
}

/// Resource constraints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Resources {
    /// Upper bounds.
    pub limits: Option<Resource>,
    /// Guaranteed reservations.
    pub reservations: Option<Resource>,
}

/// One side of the resource constraints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Resource {
    /// Fractional CPU count.
    #[serde(deserialize_with = "de::opt_float")]
    pub cpus: Option<f64>,
    /// Memory in bytes.
    #[serde(deserialize_with = "de::opt_bytes")]
    pub memory: Option<i64>,
    /// Device requests.
    pub devices: Vec<DeviceRequest>,
}

impl Resource {
    /// Returns the CPU share expressed in billionths of a CPU.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn nano_cpus(&self) -> Option<i64> {
        self.cpus
            .filter(|c| *c > 0.0)
            .map(|c| (c * 1_000_000_000.0).round() as i64)
    }
}

/// A request for host devices (GPUs and the like).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceRequest {
    /// Required capabilities.
    #[serde(deserialize_with = "de::string_list")]
    pub capabilities: Vec<String>,
    /// Device driver.
    pub driver: Option<String>,
    /// Device count; `all` decodes to `-1`.
    #[serde(deserialize_with = "de::device_count")]
    pub count: Option<i64>,
    /// Explicit device ids.
    #[serde(deserialize_with = "de::string_list")]
    pub device_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nano_cpus_scales_fraction() {
        let res = Resource {
            cpus: Some(0.5),
            ..Resource::default()
        };
        assert_eq!(res.nano_cpus(), Some(500_000_000));
    }

    #[test]
    fn zero_cpus_is_absent() {
        let res = Resource {
            cpus: Some(0.0),
            ..Resource::default()
        };
        assert_eq!(res.nano_cpus(), None);
    }
}
