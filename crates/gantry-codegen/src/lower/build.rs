//! Image build specification.

use gantry_compose::model::{BuildConfig, sorted};

use super::Calls;
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Lowers a build spec to the arguments of `service.Build(...)`.
pub fn lower_build(build: &BuildConfig) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Build);

    calls.string("Context", build.context.as_ref());
    calls.string("Dockerfile", build.dockerfile.as_ref());
    calls.string("DockerfileInline", build.dockerfile_inline.as_ref());
    calls.string("Target", build.target.as_ref());
    calls.optional_pairs("Arg", &build.args);
    calls.strings("CacheFrom", &build.cache_from);
    calls.strings("CacheTo", &build.cache_to);
    calls.flag("NoCache", build.no_cache);
    for key in &build.ssh {
        let (id, path) = key.resolve();
        if id.is_empty() {
            tracing::debug!(path, "ssh entry without id dropped");
            continue;
        }
        calls.push("SSH", vec![Expr::str(id), Expr::str(path)]);
    }
    calls.pairs("Label", &build.labels);
    calls.string("Network", build.network.as_ref());
    calls.string("Isolation", build.isolation.as_ref());
    calls.flag("Pull", build.pull);
    calls.secrets("Secret", &build.secrets);
    calls.strings("Tags", &build.tags);
    calls.ulimits("Ulimit", &build.ulimits);
    calls.strings("Platforms", &build.platforms);
    calls.flag("Privileged", build.privileged);
    for (host, ips) in sorted(&build.extra_hosts) {
        for ip in ips {
            calls.push(
                "ExtraHost",
                vec![Expr::str(host.as_str()), Expr::str(ip.as_str())],
            );
        }
    }
    calls.pairs("AdditionalContext", &build.additional_contexts);

    calls.into_vec()
}
