//! Host and runtime settings: published ports, mounts, restart policy,
//! resource limits, namespaces, devices, and block IO throttling.

use gantry_common::constants::{DEFAULT_DEVICE_PERMISSIONS, DEFAULT_HOST_IP, DEFAULT_PROTOCOL};
use gantry_compose::model::{BlkioConfig, PortConfig, Service, ThrottleDevice, sorted};

use super::mount::lower_mount;
use super::{Calls, non_empty};
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Restart policy kinds understood by the builder API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// `always`
    Always,
    /// `unless-stopped`
    UnlessStopped,
    /// `on-failure[:N]`, carrying the retry count.
    OnFailure(i64),
    /// `no`, or an empty policy.
    Never,
}

/// Classifies a restart policy string. Unknown policies yield `None`.
#[must_use]
pub fn classify_restart(policy: &str) -> Option<RestartPolicy> {
    match policy {
        "always" => Some(RestartPolicy::Always),
        "unless-stopped" => Some(RestartPolicy::UnlessStopped),
        "no" | "" => Some(RestartPolicy::Never),
        "on-failure" => Some(RestartPolicy::OnFailure(0)),
        other => other
            .strip_prefix("on-failure:")
            .map(|n| RestartPolicy::OnFailure(n.trim().parse().unwrap_or(0))),
    }
}

impl RestartPolicy {
    fn lower(self) -> Expr {
        match self {
            Self::Always => Expr::call(Namespace::Host, "RestartAlways", vec![]),
            Self::UnlessStopped => Expr::call(Namespace::Host, "RestartUnlessStopped", vec![]),
            Self::OnFailure(n) => Expr::call(Namespace::Host, "RestartOnFailure", vec![Expr::int(n)]),
            Self::Never => Expr::call(Namespace::Host, "RestartNever", vec![]),
        }
    }
}

/// Lowers the host/runtime group of a service.
pub fn lower_host(service: &Service) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Host);

    for port in &service.ports {
        calls.push("PortBinding", port_binding(port));
    }
    calls.extend(service.volumes.iter().filter_map(lower_mount));
    match service.restart.as_deref().map(|p| (p, classify_restart(p))) {
        Some((_, Some(policy))) => calls.extend([policy.lower()]),
        Some((policy, None)) => tracing::debug!(
            service = %service.name,
            policy,
            "unknown restart policy dropped"
        ),
        None => {}
    }

    calls.flag("Privileged", service.privileged);
    calls.flag("ReadonlyRootfs", service.read_only);
    calls.int("Memory", service.mem_limit);
    calls.int("ShmSize", service.shm_size);
    calls.strings("DNS", &service.dns);
    let hosts: Vec<String> = sorted(&service.extra_hosts)
        .into_iter()
        .flat_map(|(host, ips)| ips.iter().map(move |ip| format!("{host}:{ip}")))
        .collect();
    calls.strings("ExtraHosts", &hosts);
    calls.flag("Init", service.init.unwrap_or(false));
    calls.string("CgroupParent", service.cgroup_parent.as_ref());
    calls.string("Cgroup", service.cgroup.as_ref());
    calls.int("CPUCount", service.cpu_count);
    calls.int("CPUPercent", service.cpu_percent);
    calls.int("CPUPeriod", service.cpu_period);
    calls.int("CPUQuota", service.cpu_quota);
    calls.int("CPUShares", service.cpu_shares);
    calls.string("CpusetCpus", service.cpuset.as_ref());
    calls.strings("DeviceCgroupRules", &service.device_cgroup_rules);
    for device in &service.devices {
        let target = if device.target.is_empty() {
            &device.source
        } else {
            &device.target
        };
        let perms = non_empty(device.permissions.as_ref()).unwrap_or(DEFAULT_DEVICE_PERMISSIONS);
        calls.push(
            "Device",
            vec![
                Expr::str(device.source.as_str()),
                Expr::str(target.as_str()),
                Expr::str(perms),
            ],
        );
    }
    calls.strings("DNSOptions", &service.dns_opt);
    calls.strings("DNSSearch", &service.dns_search);
    calls.strings("GroupAdd", &service.group_add);
    calls.string("IpcMode", service.ipc.as_ref());
    calls.string("Isolation", service.isolation.as_ref());
    if let Some(logging) = &service.logging {
        if let Some(driver) = non_empty(logging.driver.as_ref()) {
            calls.push(
                "LogConfig",
                vec![Expr::str(driver), Expr::string_map(sorted(&logging.options))],
            );
        }
    }
    calls.int("MemoryReservation", service.mem_reservation);
    calls.int("MemorySwap", service.memswap_limit);
    calls.int("OomScoreAdj", service.oom_score_adj);
    calls.flag("OomKillDisable", service.oom_kill_disable);
    calls.string("PidMode", service.pid.as_ref());
    calls.int("PidsLimit", service.pids_limit);
    calls.string("Runtime", service.runtime.as_ref());
    calls.strings("SecurityOpt", &service.security_opt);
    calls.string_map("StorageOpt", &service.storage_opt);
    calls.pairs("Sysctl", &service.sysctls);
    calls.ulimits("Ulimit", &service.ulimits);
    calls.string("UsernsMode", service.userns_mode.as_ref());
    calls.string("UTSMode", service.uts.as_ref());
    calls.strings("VolumesFrom", &service.volumes_from);
    calls.string("VolumeDriver", service.volume_driver.as_ref());
    calls.strings("CapAdd", &service.cap_add);
    calls.strings("CapDrop", &service.cap_drop);
    calls.string("NetworkMode", service.network_mode.as_ref());
    if let Some(blkio) = &service.blkio_config {
        lower_blkio(&mut calls, blkio);
    }

    calls.into_vec()
}

fn port_binding(port: &PortConfig) -> Vec<Expr> {
    let target = port.target.to_string();
    let protocol = non_empty(port.protocol.as_ref()).unwrap_or(DEFAULT_PROTOCOL);
    let host_ip = non_empty(port.host_ip.as_ref()).unwrap_or(DEFAULT_HOST_IP);
    let published = non_empty(port.published.as_ref()).unwrap_or(&target);
    vec![
        Expr::str(protocol),
        Expr::str(host_ip),
        Expr::str(published),
        Expr::str(target.as_str()),
    ]
}

fn lower_blkio(calls: &mut Calls, blkio: &BlkioConfig) {
    if let Some(weight) = blkio.weight.filter(|w| *w != 0) {
        calls.push("BlkioWeight", vec![Expr::uint(u64::from(weight))]);
    }
    let throttles: [(&str, &[ThrottleDevice]); 4] = [
        ("BlkioDeviceReadBps", &blkio.device_read_bps),
        ("BlkioDeviceWriteBps", &blkio.device_write_bps),
        ("BlkioDeviceReadIOps", &blkio.device_read_iops),
        ("BlkioDeviceWriteIOps", &blkio.device_write_iops),
    ];
    for (name, devices) in throttles {
        for device in devices {
            calls.push(
                name,
                vec![Expr::str(device.path.as_str()), Expr::int(device.rate)],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use gantry_compose::model::{DeviceMapping, Logging, Ulimit};

    use super::*;

    fn h(name: &str, args: Vec<Expr>) -> Expr {
        Expr::call(Namespace::Host, name, args)
    }

    fn names(calls: &[Expr]) -> Vec<&str> {
        calls
            .iter()
            .filter_map(|c| match c {
                Expr::Call { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn restart_classification() {
        assert_eq!(classify_restart("always"), Some(RestartPolicy::Always));
        assert_eq!(
            classify_restart("unless-stopped"),
            Some(RestartPolicy::UnlessStopped)
        );
        assert_eq!(classify_restart("on-failure"), Some(RestartPolicy::OnFailure(0)));
        assert_eq!(
            classify_restart("on-failure:3"),
            Some(RestartPolicy::OnFailure(3))
        );
        assert_eq!(
            classify_restart("on-failure:x"),
            Some(RestartPolicy::OnFailure(0))
        );
        assert_eq!(classify_restart("no"), Some(RestartPolicy::Never));
        assert_eq!(classify_restart(""), Some(RestartPolicy::Never));
        assert_eq!(classify_restart("sometimes"), None);
    }

    #[test]
    fn unknown_restart_policy_is_dropped() {
        let svc = Service {
            restart: Some("sometimes".into()),
            ..Service::named("a")
        };
        assert!(lower_host(&svc).is_empty());
    }

    #[test]
    fn port_binding_defaults() {
        let svc = Service {
            ports: vec![PortConfig {
                target: 80,
                published: Some("8080".into()),
                ..PortConfig::default()
            }],
            ..Service::named("web")
        };
        assert_eq!(
            lower_host(&svc),
            vec![h(
                "PortBinding",
                vec![
                    Expr::str("tcp"),
                    Expr::str("0.0.0.0"),
                    Expr::str("8080"),
                    Expr::str("80")
                ]
            )]
        );
    }

    #[test]
    fn unpublished_port_binds_target() {
        let svc = Service {
            ports: vec![PortConfig {
                target: 53,
                protocol: Some("udp".into()),
                host_ip: Some("127.0.0.1".into()),
                ..PortConfig::default()
            }],
            ..Service::named("dns")
        };
        assert_eq!(
            lower_host(&svc),
            vec![h(
                "PortBinding",
                vec![
                    Expr::str("udp"),
                    Expr::str("127.0.0.1"),
                    Expr::str("53"),
                    Expr::str("53")
                ]
            )]
        );
    }

    #[test]
    fn extra_hosts_flattened_and_sorted() {
        let mut hosts = HashMap::new();
        let _ = hosts.insert("somehost".to_string(), vec!["10.0.0.2".to_string()]);
        let _ = hosts.insert(
            "alpha".to_string(),
            vec!["10.0.0.1".to_string(), "::1".to_string()],
        );
        let svc = Service {
            extra_hosts: hosts,
            ..Service::named("a")
        };
        assert_eq!(
            lower_host(&svc),
            vec![h(
                "ExtraHosts",
                vec![
                    Expr::str("alpha:10.0.0.1"),
                    Expr::str("alpha:::1"),
                    Expr::str("somehost:10.0.0.2"),
                ]
            )]
        );
    }

    #[test]
    fn device_permissions_default() {
        let svc = Service {
            devices: vec![DeviceMapping {
                source: "/dev/fuse".into(),
                target: String::new(),
                permissions: None,
            }],
            ..Service::named("a")
        };
        assert_eq!(
            lower_host(&svc),
            vec![h(
                "Device",
                vec![
                    Expr::str("/dev/fuse"),
                    Expr::str("/dev/fuse"),
                    Expr::str("rwm")
                ]
            )]
        );
    }

    #[test]
    fn log_config_carries_options_map() {
        let mut options = HashMap::new();
        let _ = options.insert("max-size".to_string(), "10m".to_string());
        let svc = Service {
            logging: Some(Logging {
                driver: Some("json-file".into()),
                options: options.clone(),
            }),
            ..Service::named("a")
        };
        assert_eq!(
            lower_host(&svc),
            vec![h(
                "LogConfig",
                vec![Expr::str("json-file"), Expr::string_map(sorted(&options))]
            )]
        );
    }

    #[test]
    fn ulimit_single_and_pair() {
        let mut limits = HashMap::new();
        let _ = limits.insert(
            "nproc".to_string(),
            Ulimit {
                single: Some(65535),
                ..Ulimit::default()
            },
        );
        let _ = limits.insert(
            "nofile".to_string(),
            Ulimit {
                single: None,
                soft: Some(20000),
                hard: Some(40000),
            },
        );
        let svc = Service {
            ulimits: limits,
            ..Service::named("a")
        };
        assert_eq!(
            lower_host(&svc),
            vec![
                h(
                    "Ulimit",
                    vec![Expr::str("nofile"), Expr::int(20000), Expr::int(40000)]
                ),
                h(
                    "Ulimit",
                    vec![Expr::str("nproc"), Expr::int(65535), Expr::int(65535)]
                ),
            ]
        );
    }

    #[test]
    fn fixed_field_order() {
        let svc = Service {
            restart: Some("always".into()),
            privileged: true,
            mem_limit: Some(512 * 1024 * 1024),
            cap_drop: vec!["ALL".into()],
            network_mode: Some("host".into()),
            init: Some(true),
            blkio_config: Some(BlkioConfig {
                weight: Some(300),
                device_read_bps: vec![ThrottleDevice {
                    path: "/dev/sda".into(),
                    rate: 1024,
                }],
                ..BlkioConfig::default()
            }),
            ..Service::named("a")
        };
        assert_eq!(
            names(&lower_host(&svc)),
            vec![
                "RestartAlways",
                "Privileged",
                "Memory",
                "Init",
                "CapDrop",
                "NetworkMode",
                "BlkioWeight",
                "BlkioDeviceReadBps"
            ]
        );
    }

    #[test]
    fn explicit_init_false_is_absent() {
        let svc = Service {
            init: Some(false),
            ..Service::named("a")
        };
        assert!(lower_host(&svc).is_empty());
    }
}
