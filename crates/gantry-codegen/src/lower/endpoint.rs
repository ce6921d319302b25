//! Network attachments of a service.

use gantry_compose::model::{Service, ServiceNetworkConfig, sorted};

use super::{Calls, non_empty};
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Lowers the networking group: one `endpoint.Network(name, ...)` per
/// attached network, in ascending name order.
///
/// The deprecated service-level MAC address applies only to the first
/// attached network, and only when that network has no endpoint settings.
pub fn lower_endpoints(service: &Service) -> Vec<Expr> {
    sorted(&service.networks)
        .into_iter()
        .enumerate()
        .map(|(index, (name, config))| {
            let fallback_mac = if index == 0 && config.is_none() {
                non_empty(service.mac_address.as_ref())
            } else {
                None
            };
            lower_endpoint(name, config.as_ref(), fallback_mac)
        })
        .collect()
}

fn lower_endpoint(
    name: &str,
    config: Option<&ServiceNetworkConfig>,
    fallback_mac: Option<&str>,
) -> Expr {
    let mut args = vec![Expr::str(name)];
    let mut calls = Calls::new(Namespace::Endpoint);
    if let Some(config) = config {
        calls.strings("Aliases", &config.aliases);
        let mut ipam = Calls::new(Namespace::Endpoint);
        ipam.string("IPv4Address", config.ipv4_address.as_ref());
        ipam.string("IPv6Address", config.ipv6_address.as_ref());
        ipam.strings("LinkLocalIPs", &config.link_local_ips);
        if !ipam.is_empty() {
            calls.push("IPAMConfig", ipam.into_vec());
        }
        calls.string("MacAddress", config.mac_address.as_ref());
        calls.pairs("DriverOpt", &config.driver_opts);
    } else if let Some(mac) = fallback_mac {
        calls.push("MacAddress", vec![Expr::str(mac)]);
    }
    args.extend(calls.into_vec());
    Expr::call(Namespace::Endpoint, "Network", args)
}
