//! Network lowering.

use gantry_compose::model::{IpamPool, Network, Project, sorted};

use super::{Calls, non_empty};
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Lowers every non-external network, in ascending key order, to one
/// `network.New(...)` call each.
pub fn lower_networks(project: &Project) -> Vec<Expr> {
    sorted(&project.networks)
        .into_iter()
        .filter(|(_, network)| !network.external)
        .map(|(key, network)| lower_network(key, network))
        .collect()
}

/// Lowers one network. A trivial network yields the name-only form.
pub fn lower_network(key: &str, network: &Network) -> Expr {
    let name = non_empty(network.name.as_ref()).unwrap_or(key);
    let mut args = vec![Expr::str(name)];
    if network.is_trivial() {
        return Expr::call(Namespace::Network, "New", args);
    }

    let mut opts = Calls::new(Namespace::Network);
    opts.string("Driver", network.driver.as_ref());
    opts.pairs("DriverOpt", &network.driver_opts);
    opts.flag("Internal", network.internal);
    opts.flag("Attachable", network.attachable);
    opts.flag("EnableIPv6", network.enable_ipv6);
    opts.pairs("Label", &network.labels);
    if let Some(ipam) = &network.ipam {
        opts.string("IPAMDriver", ipam.driver.as_ref());
        for pool in &ipam.config {
            opts.push("IPAMPool", lower_pool(pool));
        }
    }

    args.extend(opts.into_vec());
    Expr::call(Namespace::Network, "New", args)
}

fn lower_pool(pool: &IpamPool) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Ipam);
    calls.string("Subnet", pool.subnet.as_ref());
    calls.string("Gateway", pool.gateway.as_ref());
    calls.string("IPRange", pool.ip_range.as_ref());
    calls.pairs("AuxAddress", &pool.aux_addresses);
    calls.into_vec()
}
