//! Normalized deployment descriptor model.
//!
//! The model is read-only input for the code generator. Name-keyed
//! collections are plain `HashMap`s: consumers must sort keys themselves
//! whenever iteration order reaches their output.

mod build;
mod deploy;
mod network;
mod service;

use std::collections::HashMap;

pub use self::build::{BuildConfig, SshKey};
pub use self::deploy::{DeployConfig, DeviceRequest, Resource, Resources, UpdateConfig};
pub use self::network::{IpamConfig, IpamPool, Network, Volume};
pub use self::service::{
    BlkioConfig, DeviceMapping, DevelopConfig, EnvFile, HealthCheck, Logging, PortConfig,
    Service, ServiceDependency, ServiceNetworkConfig, ServiceSecret, ServiceVolume, ThrottleDevice,
    TmpfsConfig, Ulimit, WatchRule,
};

/// Root of a loaded deployment descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    /// Project name.
    pub name: String,
    /// Services keyed by name.
    pub services: HashMap<String, Service>,
    /// Networks keyed by name.
    pub networks: HashMap<String, Network>,
    /// Volumes keyed by name.
    pub volumes: HashMap<String, Volume>,
}

impl Project {
    /// Creates an empty project with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a service, keyed by its own name.
    #[must_use]
    pub fn with_service(mut self, service: Service) -> Self {
        let _ = self.services.insert(service.name.clone(), service);
        self
    }

    /// Adds a network under the given key.
    #[must_use]
    pub fn with_network(mut self, key: impl Into<String>, network: Network) -> Self {
        let _ = self.networks.insert(key.into(), network);
        self
    }

    /// Adds a volume under the given key.
    #[must_use]
    pub fn with_volume(mut self, key: impl Into<String>, volume: Volume) -> Self {
        let _ = self.volumes.insert(key.into(), volume);
        self
    }

    /// Returns services sorted by name.
    pub fn sorted_services(&self) -> Vec<&Service> {
        let mut services: Vec<&Service> = self.services.values().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        services
    }
}

/// Returns the entries of a map sorted by key.
///
/// Every map that reaches generated output goes through here so that the
/// output never depends on hash iteration order.
pub fn sorted<K: Ord, V>(map: &HashMap<K, V>) -> Vec<(&K, &V)> {
    let mut entries: Vec<(&K, &V)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
