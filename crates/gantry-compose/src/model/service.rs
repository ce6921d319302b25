//! Service definition and its nested configuration records.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use super::{BuildConfig, DeployConfig};
use crate::de;

/// A single service of the deployment.
///
/// Fields are grouped the way the generator consumes them: container-level
/// settings, host/runtime settings, network attachments, platform, and
/// orchestration concerns.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Service name (the key under `services:`).
    #[serde(skip)]
    pub name: String,

    // ── Container-level ──────────────────────────────────────────────
    /// Image reference.
    pub image: Option<String>,
    /// Exposed ports as `port[/protocol]` tokens.
    #[serde(deserialize_with = "de::string_list")]
    pub expose: Vec<String>,
    /// Time to wait before killing the container on stop.
    #[serde(deserialize_with = "de::opt_duration")]
    pub stop_grace_period: Option<Duration>,
    /// Environment variables; a `None` value means "declared without value".
    #[serde(deserialize_with = "de::environment")]
    pub environment: HashMap<String, Option<String>>,
    /// Command override.
    #[serde(deserialize_with = "de::command")]
    pub command: Vec<String>,
    /// Entrypoint override.
    #[serde(deserialize_with = "de::command")]
    pub entrypoint: Vec<String>,
    /// User (and optionally group) the process runs as.
    pub user: Option<String>,
    /// Working directory.
    pub working_dir: Option<String>,
    /// Container hostname.
    pub hostname: Option<String>,
    /// Container domain name.
    pub domainname: Option<String>,
    /// Signal sent to stop the container.
    pub stop_signal: Option<String>,
    /// Container labels.
    #[serde(deserialize_with = "de::labels")]
    pub labels: HashMap<String, String>,
    /// Health check.
    pub healthcheck: Option<HealthCheck>,
    /// Allocate a pseudo-TTY.
    pub tty: bool,
    /// Keep stdin open.
    pub stdin_open: bool,

    // ── Host / runtime ───────────────────────────────────────────────
    /// Published ports.
    #[serde(deserialize_with = "de::ports")]
    pub ports: Vec<PortConfig>,
    /// Volume, bind, and tmpfs mounts.
    #[serde(deserialize_with = "de::service_volumes")]
    pub volumes: Vec<ServiceVolume>,
    /// Restart policy (`no`, `always`, `on-failure[:N]`, `unless-stopped`).
    pub restart: Option<String>,
    /// Run in privileged mode.
    pub privileged: bool,
    /// Mount the root filesystem read-only.
    pub read_only: bool,
    /// Memory limit in bytes.
    #[serde(deserialize_with = "de::opt_bytes")]
    pub mem_limit: Option<i64>,
    /// Size of `/dev/shm` in bytes.
    #[serde(deserialize_with = "de::opt_bytes")]
    pub shm_size: Option<i64>,
    /// DNS servers.
    #[serde(deserialize_with = "de::string_list")]
    pub dns: Vec<String>,
    /// Extra `/etc/hosts` entries, host name to addresses.
    #[serde(deserialize_with = "de::extra_hosts")]
    pub extra_hosts: HashMap<String, Vec<String>>,
    /// Run an init process inside the container.
    pub init: Option<bool>,
    /// Parent cgroup.
    pub cgroup_parent: Option<String>,
    /// Cgroup namespace mode (`host` or `private`).
    pub cgroup: Option<String>,
    /// Usable CPU count (Windows).
    pub cpu_count: Option<i64>,
    /// Usable CPU percent (Windows).
    pub cpu_percent: Option<i64>,
    /// CFS period.
    pub cpu_period: Option<i64>,
    /// CFS quota.
    pub cpu_quota: Option<i64>,
    /// Relative CPU weight.
    pub cpu_shares: Option<i64>,
    /// CPUs the container may run on.
    pub cpuset: Option<String>,
    /// Device cgroup rules.
    pub device_cgroup_rules: Vec<String>,
    /// Device mappings.
    #[serde(deserialize_with = "de::devices")]
    pub devices: Vec<DeviceMapping>,
    /// DNS resolver options.
    #[serde(deserialize_with = "de::string_list")]
    pub dns_opt: Vec<String>,
    /// DNS search domains.
    #[serde(deserialize_with = "de::string_list")]
    pub dns_search: Vec<String>,
    /// Supplementary groups.
    #[serde(deserialize_with = "de::string_list")]
    pub group_add: Vec<String>,
    /// IPC namespace mode.
    pub ipc: Option<String>,
    /// Isolation technology.
    pub isolation: Option<String>,
    /// Log driver configuration.
    pub logging: Option<Logging>,
    /// Memory soft limit in bytes.
    #[serde(deserialize_with = "de::opt_bytes")]
    pub mem_reservation: Option<i64>,
    /// Memory plus swap limit in bytes (`-1` for unlimited).
    #[serde(deserialize_with = "de::opt_bytes")]
    pub memswap_limit: Option<i64>,
    /// OOM killer preference adjustment.
    pub oom_score_adj: Option<i64>,
    /// Disable the OOM killer.
    pub oom_kill_disable: bool,
    /// PID namespace mode.
    pub pid: Option<String>,
    /// Maximum number of processes.
    pub pids_limit: Option<i64>,
    /// OCI runtime name.
    pub runtime: Option<String>,
    /// Security options.
    #[serde(deserialize_with = "de::string_list")]
    pub security_opt: Vec<String>,
    /// Storage driver options.
    #[serde(deserialize_with = "de::labels")]
    pub storage_opt: HashMap<String, String>,
    /// Kernel parameters.
    #[serde(deserialize_with = "de::labels")]
    pub sysctls: HashMap<String, String>,
    /// Resource limits keyed by name (`nofile`, `nproc`, …).
    pub ulimits: HashMap<String, Ulimit>,
    /// User namespace mode.
    pub userns_mode: Option<String>,
    /// UTS namespace mode.
    pub uts: Option<String>,
    /// Containers or services to mount volumes from.
    #[serde(deserialize_with = "de::string_list")]
    pub volumes_from: Vec<String>,
    /// Default volume driver.
    pub volume_driver: Option<String>,
    /// Added kernel capabilities.
    #[serde(deserialize_with = "de::string_list")]
    pub cap_add: Vec<String>,
    /// Dropped kernel capabilities.
    #[serde(deserialize_with = "de::string_list")]
    pub cap_drop: Vec<String>,
    /// Network mode (`host`, `none`, `service:<name>`, …).
    pub network_mode: Option<String>,
    /// Block IO limits.
    pub blkio_config: Option<BlkioConfig>,

    // ── Networking ───────────────────────────────────────────────────
    /// Attached networks; `None` means attached without endpoint settings.
    #[serde(deserialize_with = "de::service_networks")]
    pub networks: HashMap<String, Option<ServiceNetworkConfig>>,
    /// Deprecated service-level MAC address.
    pub mac_address: Option<String>,

    // ── Platform ─────────────────────────────────────────────────────
    /// Target platform, `os[/arch[/variant]]`.
    pub platform: Option<String>,

    // ── Orchestration ────────────────────────────────────────────────
    /// Annotations.
    #[serde(deserialize_with = "de::labels")]
    pub annotations: HashMap<String, String>,
    /// Whether output is attached; only an explicit `false` matters.
    pub attach: Option<bool>,
    /// Development-time file watch rules.
    pub develop: Option<DevelopConfig>,
    /// Granted secrets.
    #[serde(deserialize_with = "de::service_secrets")]
    pub secrets: Vec<ServiceSecret>,
    /// Image build specification.
    #[serde(deserialize_with = "de::opt_build")]
    pub build: Option<BuildConfig>,
    /// Profiles this service belongs to.
    #[serde(deserialize_with = "de::string_list")]
    pub profiles: Vec<String>,
    /// Image pull policy.
    pub pull_policy: Option<String>,
    /// Dependencies keyed by service name.
    #[serde(deserialize_with = "de::depends_on")]
    pub depends_on: HashMap<String, ServiceDependency>,
    /// Environment files.
    #[serde(deserialize_with = "de::env_files")]
    pub env_file: Vec<EnvFile>,
    /// Deployment specification.
    pub deploy: Option<DeployConfig>,
}

impl Service {
    /// Creates a service with only its name set.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Container health check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HealthCheck {
    /// Test command, e.g. `["CMD", "curl", "-f", "http://localhost"]`.
    #[serde(deserialize_with = "de::healthcheck_test")]
    pub test: Vec<String>,
    /// Time between checks.
    #[serde(deserialize_with = "de::opt_duration")]
    pub interval: Option<Duration>,
    /// Time a single check may take.
    #[serde(deserialize_with = "de::opt_duration")]
    pub timeout: Option<Duration>,
    /// Initialization grace period.
    #[serde(deserialize_with = "de::opt_duration")]
    pub start_period: Option<Duration>,
    /// Consecutive failures before the container is unhealthy.
    pub retries: Option<u64>,
    /// Disables any health check inherited from the image.
    pub disable: bool,
}

/// A published port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    /// Container port.
    pub target: u16,
    /// Host port or port range; defaults to the target port.
    #[serde(deserialize_with = "de::opt_string")]
    pub published: Option<String>,
    /// Protocol (`tcp`, `udp`, `sctp`).
    pub protocol: Option<String>,
    /// Host address to bind.
    pub host_ip: Option<String>,
}

/// A volume, bind, or tmpfs mount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceVolume {
    /// Mount type (`bind`, `volume`, `tmpfs`, …); bind when absent.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Host path or volume name.
    pub source: Option<String>,
    /// Path inside the container.
    pub target: String,
    /// Mount read-only.
    pub read_only: bool,
    /// Tmpfs options.
    pub tmpfs: Option<TmpfsConfig>,
}

/// Options of a tmpfs mount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TmpfsConfig {
    /// Size in bytes.
    #[serde(deserialize_with = "de::opt_bytes")]
    pub size: Option<i64>,
    /// File mode.
    #[serde(deserialize_with = "de::opt_file_mode")]
    pub mode: Option<u32>,
}

/// A host device exposed to the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceMapping {
    /// Host device path.
    pub source: String,
    /// Container device path.
    pub target: String,
    /// Cgroup permissions (`rwm`).
    pub permissions: Option<String>,
}

/// Log driver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// Driver name.
    pub driver: Option<String>,
    /// Driver options.
    #[serde(deserialize_with = "de::labels")]
    pub options: HashMap<String, String>,
}

/// A resource limit: either one value for both bounds, or a soft/hard pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "de::RawUlimit")]
pub struct Ulimit {
    /// Single value applied to both bounds.
    pub single: Option<i64>,
    /// Soft limit.
    pub soft: Option<i64>,
    /// Hard limit.
    pub hard: Option<i64>,
}

impl Ulimit {
    /// Returns the `(soft, hard)` pair, applying a single value to both.
    #[must_use]
    pub fn bounds(&self) -> (i64, i64) {
        self.single.map_or_else(
            || (self.soft.unwrap_or(0), self.hard.unwrap_or(0)),
            |v| (v, v),
        )
    }
}

/// Block IO configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlkioConfig {
    /// Relative weight (10–1000).
    pub weight: Option<u16>,
    /// Read rate limits in bytes per second.
    pub device_read_bps: Vec<ThrottleDevice>,
    /// Write rate limits in bytes per second.
    pub device_write_bps: Vec<ThrottleDevice>,
    /// Read rate limits in operations per second.
    pub device_read_iops: Vec<ThrottleDevice>,
    /// Write rate limits in operations per second.
    pub device_write_iops: Vec<ThrottleDevice>,
}

/// A per-device throttle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThrottleDevice {
    /// Device path.
    pub path: String,
    /// Rate (bytes or operations per second).
    #[serde(deserialize_with = "de::bytes")]
    pub rate: i64,
}

/// Endpoint settings of one network attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceNetworkConfig {
    /// Network-scoped aliases.
    #[serde(deserialize_with = "de::string_list")]
    pub aliases: Vec<String>,
    /// Static IPv4 address.
    pub ipv4_address: Option<String>,
    /// Static IPv6 address.
    pub ipv6_address: Option<String>,
    /// Link-local addresses.
    #[serde(deserialize_with = "de::string_list")]
    pub link_local_ips: Vec<String>,
    /// Endpoint MAC address.
    pub mac_address: Option<String>,
    /// Endpoint driver options.
    #[serde(deserialize_with = "de::labels")]
    pub driver_opts: HashMap<String, String>,
}

/// Development configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DevelopConfig {
    /// File watch rules.
    pub watch: Vec<WatchRule>,
}

/// A file watch rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WatchRule {
    /// Action on change (`sync`, `rebuild`, `sync+restart`).
    pub action: String,
    /// Watched host path.
    pub path: String,
    /// Container path to sync into.
    pub target: Option<String>,
    /// Ignore globs.
    #[serde(deserialize_with = "de::string_list")]
    pub ignore: Vec<String>,
}

/// A secret granted to a service or a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceSecret {
    /// Secret name.
    pub source: String,
    /// Mount path or file name.
    pub target: Option<String>,
    /// Owning user id.
    #[serde(deserialize_with = "de::opt_string")]
    pub uid: Option<String>,
    /// Owning group id.
    #[serde(deserialize_with = "de::opt_string")]
    pub gid: Option<String>,
    /// File mode.
    #[serde(deserialize_with = "de::opt_file_mode")]
    pub mode: Option<u32>,
}

/// A dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceDependency {
    /// Start condition (`service_started`, `service_healthy`, …).
    pub condition: String,
    /// Restart the dependent when the dependency restarts.
    pub restart: bool,
    /// Whether the dependency must exist.
    pub required: bool,
}

impl Default for ServiceDependency {
    fn default() -> Self {
        Self {
            condition: "service_started".to_string(),
            restart: false,
            required: true,
        }
    }
}

/// An environment file reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnvFile {
    /// File path.
    pub path: String,
    /// Whether loading fails when the file is missing.
    pub required: bool,
}
