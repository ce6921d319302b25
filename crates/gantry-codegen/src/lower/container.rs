//! Container-level settings: image, ports exposed by the image, environment,
//! process, identity, labels, and health check.

use gantry_common::constants::DEFAULT_PROTOCOL;
use gantry_compose::model::{HealthCheck, Service};

use super::Calls;
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Lowers the container-level group of a service.
pub fn lower_container(service: &Service) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Container);

    calls.string("Image", service.image.as_ref());
    for token in &service.expose {
        let (port, protocol) = token.split_once('/').unwrap_or((token, DEFAULT_PROTOCOL));
        calls.push("ExposedPort", vec![Expr::str(port), Expr::str(protocol)]);
    }
    if let Some(grace) = service.stop_grace_period {
        let secs = grace.as_secs();
        if secs > 0 {
            calls.push("StopTimeout", vec![Expr::uint(secs)]);
        }
    }
    calls.optional_pairs("Env", &service.environment);
    calls.strings("Cmd", &service.command);
    calls.strings("Entrypoint", &service.entrypoint);
    calls.string("User", service.user.as_ref());
    calls.string("WorkingDir", service.working_dir.as_ref());
    calls.string("Hostname", service.hostname.as_ref());
    calls.string("Domainname", service.domainname.as_ref());
    calls.string("StopSignal", service.stop_signal.as_ref());
    calls.pairs("Label", &service.labels);
    if let Some(check) = service.healthcheck.as_ref().filter(|c| !c.disable) {
        calls.push("Healthcheck", lower_healthcheck(check));
    }
    calls.flag("Tty", service.tty);
    calls.flag("OpenStdin", service.stdin_open);

    calls.into_vec()
}

fn lower_healthcheck(check: &HealthCheck) -> Vec<Expr> {
    let mut calls = Calls::new(Namespace::Healthcheck);
    calls.strings("Test", &check.test);
    for (name, value) in [
        ("Interval", check.interval),
        ("Timeout", check.timeout),
        ("StartPeriod", check.start_period),
    ] {
        if let Some(d) = value.filter(|d| !d.is_zero()) {
            calls.push(name, vec![Expr::duration(d)]);
        }
    }
    calls.uint("Retries", check.retries);
    calls.into_vec()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn c(name: &str, args: Vec<Expr>) -> Expr {
        Expr::call(Namespace::Container, name, args)
    }

    #[test]
    fn empty_service_emits_nothing() {
        assert!(lower_container(&Service::named("web")).is_empty());
    }

    #[test]
    fn image_only() {
        let svc = Service {
            image: Some("nginx:alpine".into()),
            ..Service::named("web")
        };
        assert_eq!(
            lower_container(&svc),
            vec![c("Image", vec![Expr::str("nginx:alpine")])]
        );
    }

    #[test]
    fn exposed_port_protocol_default() {
        let svc = Service {
            expose: vec!["80".into(), "53/udp".into()],
            ..Service::named("dns")
        };
        assert_eq!(
            lower_container(&svc),
            vec![
                c("ExposedPort", vec![Expr::str("80"), Expr::str("tcp")]),
                c("ExposedPort", vec![Expr::str("53"), Expr::str("udp")]),
            ]
        );
    }

    #[test]
    fn stop_timeout_whole_seconds_only_when_positive() {
        let short = Service {
            stop_grace_period: Some(Duration::from_millis(400)),
            ..Service::named("a")
        };
        assert!(lower_container(&short).is_empty());

        let long = Service {
            stop_grace_period: Some(Duration::from_millis(10_900)),
            ..Service::named("a")
        };
        assert_eq!(
            lower_container(&long),
            vec![c("StopTimeout", vec![Expr::uint(10)])]
        );
    }

    #[test]
    fn command_elements_are_positional() {
        let svc = Service {
            command: vec!["npm".into(), "start".into()],
            ..Service::named("app")
        };
        assert_eq!(
            lower_container(&svc),
            vec![c("Cmd", vec![Expr::str("npm"), Expr::str("start")])]
        );
    }

    #[test]
    fn disabled_healthcheck_is_omitted() {
        let svc = Service {
            healthcheck: Some(HealthCheck {
                test: vec!["CMD".into(), "true".into()],
                disable: true,
                ..HealthCheck::default()
            }),
            ..Service::named("a")
        };
        assert!(lower_container(&svc).is_empty());
    }

    #[test]
    fn healthcheck_sub_calls_only_when_set() {
        let svc = Service {
            healthcheck: Some(HealthCheck {
                test: vec!["CMD".into(), "pg_isready".into()],
                interval: Some(Duration::from_secs(10)),
                retries: Some(5),
                ..HealthCheck::default()
            }),
            ..Service::named("db")
        };
        assert_eq!(
            lower_container(&svc),
            vec![c(
                "Healthcheck",
                vec![
                    Expr::call(
                        Namespace::Healthcheck,
                        "Test",
                        vec![Expr::str("CMD"), Expr::str("pg_isready")]
                    ),
                    Expr::call(
                        Namespace::Healthcheck,
                        "Interval",
                        vec![Expr::duration(Duration::from_secs(10))]
                    ),
                    Expr::call(Namespace::Healthcheck, "Retries", vec![Expr::uint(5)]),
                ]
            )]
        );
    }

    #[test]
    fn tty_and_stdin_flags_last() {
        let svc = Service {
            image: Some("busybox".into()),
            tty: true,
            stdin_open: true,
            ..Service::named("shell")
        };
        let calls = lower_container(&svc);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], c("Tty", vec![]));
        assert_eq!(calls[2], c("OpenStdin", vec![]));
    }
}
