//! Top-level network and volume definitions.

use std::collections::HashMap;

use serde::Deserialize;

use crate::de;

/// A network declared under `networks:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Network {
    /// Explicit network name; the map key is used when absent.
    pub name: Option<String>,
    /// Network driver.
    pub driver: Option<String>,
    /// Driver options.
    #[serde(deserialize_with = "de::labels")]
    pub driver_opts: HashMap<String, String>,
    /// IP address management.
    pub ipam: Option<IpamConfig>,
    /// Pre-existing network not managed by the deployment.
    #[serde(deserialize_with = "de::external")]
    pub external: bool,
    /// Restrict external access.
    pub internal: bool,
    /// Allow standalone containers to attach.
    pub attachable: bool,
    /// Enable IPv6.
    pub enable_ipv6: bool,
    /// Network labels.
    #[serde(deserialize_with = "de::labels")]
    pub labels: HashMap<String, String>,
}

impl Network {
    /// Returns true when every option still has its default value.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.driver.as_deref().is_none_or(str::is_empty)
            && self.driver_opts.is_empty()
            && !self.internal
            && !self.attachable
            && !self.enable_ipv6
            && self.labels.is_empty()
            && self.ipam.as_ref().is_none_or(IpamConfig::is_empty)
    }
}

/// IP address management configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IpamConfig {
    /// IPAM driver.
    pub driver: Option<String>,
    /// Address pools, in declaration order.
    pub config: Vec<IpamPool>,
}

impl IpamConfig {
    /// Returns true when neither a driver nor pools are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.driver.as_deref().is_none_or(str::is_empty) && self.config.is_empty()
    }
}

/// One IPAM address pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IpamPool {
    /// Subnet in CIDR form.
    pub subnet: Option<String>,
    /// Gateway address.
    pub gateway: Option<String>,
    /// Allocation range.
    pub ip_range: Option<String>,
    /// Reserved auxiliary addresses.
    #[serde(deserialize_with = "de::labels")]
    pub aux_addresses: HashMap<String, String>,
}

/// A volume declared under `volumes:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Volume {
    /// Explicit volume name; the map key is used when absent.
    pub name: Option<String>,
    /// Volume driver.
    pub driver: Option<String>,
    /// Driver options.
    #[serde(deserialize_with = "de::labels")]
    pub driver_opts: HashMap<String, String>,
    /// Pre-existing volume not managed by the deployment.
    #[serde(deserialize_with = "de::external")]
    pub external: bool,
    /// Volume labels.
    #[serde(deserialize_with = "de::labels")]
    pub labels: HashMap<String, String>,
}

impl Volume {
    /// Returns true when every option still has its default value.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.driver.as_deref().is_none_or(str::is_empty)
            && self.driver_opts.is_empty()
            && self.labels.is_empty()
    }
}
