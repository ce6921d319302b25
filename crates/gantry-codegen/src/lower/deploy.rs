//! Deployment specification.

use std::time::Duration;

use gantry_compose::model::{DeployConfig, DeviceRequest, Resource, UpdateConfig};

use super::Calls;
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Lowers a deploy spec to the arguments of `service.Deploy(...)`.
pub fn lower_deploy(deploy: &DeployConfig) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Deploy);

    calls.uint("Replicas", deploy.replicas);
    calls.string("Mode", deploy.mode.as_ref());
    calls.pairs("Label", &deploy.labels);
    for (name, update) in [
        ("UpdateConfig", deploy.update_config.as_ref()),
        ("RollbackConfig", deploy.rollback_config.as_ref()),
    ] {
        let args = update.map(lower_update).unwrap_or_default();
        if !args.is_empty() {
            calls.push(name, args);
        }
    }
    if let Some(resources) = &deploy.resources {
        for (name, side) in [
            ("Limits", resources.limits.as_ref()),
            ("Reservations", resources.reservations.as_ref()),
        ] {
            let args = side.map(lower_resource).unwrap_or_default();
            if !args.is_empty() {
                calls.push(name, args);
            }
        }
    }

    calls.into_vec()
}

fn lower_update(update: &UpdateConfig) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Deploy);
    calls.uint("Parallelism", update.parallelism);
    if let Some(delay) = update.delay.map(round_secs).filter(|d| !d.is_zero()) {
        calls.push("Delay", vec![Expr::duration(delay)]);
    }
    calls.string("FailureAction", update.failure_action.as_ref());
    if let Some(monitor) = update
        .monitor
        .map(|d| Duration::from_secs(d.as_secs()))
        .filter(|d| !d.is_zero())
    {
        calls.push("Monitor", vec![Expr::duration(monitor)]);
    }
    if let Some(ratio) = update.max_failure_ratio.filter(|r| *r > 0.0) {
        calls.push("MaxFailureRatio", vec![Expr::float(ratio)]);
    }
    calls.string("Order", update.order.as_ref());
    calls.into_vec()
}

fn lower_resource(resource: &Resource) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Deploy);
    calls.int("MemoryBytes", resource.memory);
    calls.int("NanoCPUs", resource.nano_cpus());
    for device in &resource.devices {
        calls.push("Device", lower_device(device));
    }
    calls.into_vec()
}

fn lower_device(device: &DeviceRequest) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Deploy);
    calls.strings("Capabilities", &device.capabilities);
    calls.string("Driver", device.driver.as_ref());
    calls.int("Count", device.count);
    calls.strings("DeviceIDs", &device.device_ids);
    calls.into_vec()
}

/// Rounds to the nearest whole second, half up.
fn round_secs(d: Duration) -> Duration {
    let secs = d.as_secs() + u64::from(d.subsec_millis() >= 500);
    Duration::from_secs(secs)
}
