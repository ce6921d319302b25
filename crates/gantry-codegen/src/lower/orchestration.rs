//! Orchestration concerns: annotations, attach, watch rules, secrets,
//! build, profiles, pull policy, dependencies, env files, and deploy.

use gantry_common::constants::CONDITION_SERVICE_HEALTHY;
use gantry_compose::model::{Service, WatchRule, sorted};

use super::Calls;
use super::build::lower_build;
use super::deploy::lower_deploy;
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Lowers the orchestration group of a service. An empty result means the
/// service needs no orchestration constructor.
pub fn lower_orchestration(service: &Service) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Service);

    calls.pairs("Annotation", &service.annotations);
    calls.flag("NoAttach", service.attach == Some(false));
    if let Some(develop) = &service.develop {
        for rule in &develop.watch {
            calls.push("Watch", lower_watch(rule));
        }
    }
    calls.secrets("Secret", &service.secrets);
    if let Some(build) = &service.build {
        calls.push("Build", lower_build(build));
    }
    calls.strings("Profiles", &service.profiles);
    calls.string("PullPolicy", service.pull_policy.as_ref());
    for (name, dependency) in sorted(&service.depends_on) {
        let call = if dependency.condition == CONDITION_SERVICE_HEALTHY {
            "DependsOnHealthy"
        } else {
            "DependsOn"
        };
        calls.push(call, vec![Expr::str(name.as_str())]);
    }
    for env_file in service.env_file.iter().filter(|f| !f.path.is_empty()) {
        calls.push("EnvFile", vec![Expr::str(env_file.path.as_str())]);
    }
    if let Some(deploy) = &service.deploy {
        calls.push("Deploy", lower_deploy(deploy));
    }

    calls.into_vec()
}

fn lower_watch(rule: &WatchRule) -> Vec<Expr> {
    let ignore = if rule.ignore.is_empty() {
        Expr::nil()
    } else {
        Expr::string_list(&rule.ignore)
    };
    vec![
        Expr::str(rule.action.as_str()),
        Expr::str(rule.path.as_str()),
        Expr::str(rule.target.as_deref().unwrap_or_default()),
        ignore,
    ]
}
