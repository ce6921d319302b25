//! Entity lowerers: descriptor model → ordered call nodes.
//!
//! Every lowerer is a pure function. Absence of a field (None, empty,
//! zero, false) never produces a node; key-based fields are always
//! emitted in sorted key order.

pub mod build;
pub mod container;
pub mod deploy;
pub mod endpoint;
pub mod host;
pub mod mount;
pub mod network;
pub mod orchestration;
pub mod platform;
pub mod service;
pub mod volume;

use std::collections::HashMap;

use gantry_compose::model::{ServiceSecret, Ulimit, sorted};

use crate::ast::Expr;
use crate::namespace::Namespace;

/// Accumulates the calls of one configuration group, all in one namespace.
#[derive(Debug)]
pub(crate) struct Calls {
    ns: Namespace,
    calls: Vec<Expr>,
}

impl Calls {
    pub(crate) const fn new(ns: Namespace) -> Self {
        Self {
            ns,
            calls: Vec::new(),
        }
    }

    /// Unconditionally emits `ns.name(args...)`.
    pub(crate) fn push(&mut self, name: &str, args: Vec<Expr>) {
        self.calls.push(Expr::call(self.ns, name, args));
    }

    /// Emits `ns.name()` when `on` is true.
    pub(crate) fn flag(&mut self, name: &str, on: bool) {
        if on {
            self.push(name, Vec::new());
        }
    }

    /// Emits `ns.name("value")` for a present, non-empty string.
    pub(crate) fn string(&mut self, name: &str, value: Option<&String>) {
        if let Some(v) = non_empty(value) {
            self.push(name, vec![Expr::str(v)]);
        }
    }

    /// Emits `ns.name(value)` for a present, non-zero integer.
    pub(crate) fn int(&mut self, name: &str, value: Option<i64>) {
        if let Some(v) = value.filter(|v| *v != 0) {
            self.push(name, vec![Expr::int(v)]);
        }
    }

    /// Emits `ns.name(value)` for a present, non-zero unsigned integer.
    pub(crate) fn uint(&mut self, name: &str, value: Option<u64>) {
        if let Some(v) = value.filter(|v| *v != 0) {
            self.push(name, vec![Expr::uint(v)]);
        }
    }

    /// Emits one `ns.name("v1", "v2", ...)` call for a non-empty list.
    pub(crate) fn strings(&mut self, name: &str, values: &[String]) {
        if !values.is_empty() {
            self.push(name, values.iter().map(|v| Expr::str(v.as_str())).collect());
        }
    }

    /// Emits one `ns.name("key", "value")` call per pair, keys sorted.
    pub(crate) fn pairs(&mut self, name: &str, map: &HashMap<String, String>) {
        for (key, value) in sorted(map) {
            self.push(name, vec![Expr::str(key.as_str()), Expr::str(value.as_str())]);
        }
    }

    /// Like [`Calls::pairs`], with declared-but-unset values as `""`.
    pub(crate) fn optional_pairs(&mut self, name: &str, map: &HashMap<String, Option<String>>) {
        for (key, value) in sorted(map) {
            self.push(
                name,
                vec![
                    Expr::str(key.as_str()),
                    Expr::str(value.as_deref().unwrap_or_default()),
                ],
            );
        }
    }

    /// Emits `ns.name(map[string]string{...})` for a non-empty map.
    pub(crate) fn string_map(&mut self, name: &str, map: &HashMap<String, String>) {
        if !map.is_empty() {
            self.push(name, vec![Expr::string_map(sorted(map))]);
        }
    }

    /// Emits one `ns.name("nofile", soft, hard)` call per limit, names sorted.
    pub(crate) fn ulimits(&mut self, name: &str, limits: &HashMap<String, Ulimit>) {
        for (limit, value) in sorted(limits) {
            let (soft, hard) = value.bounds();
            self.push(
                name,
                vec![Expr::str(limit.as_str()), Expr::int(soft), Expr::int(hard)],
            );
        }
    }

    /// Emits one secret call per entry: source, target, then the
    /// owner/mode option calls that are set.
    pub(crate) fn secrets(&mut self, name: &str, secrets: &[ServiceSecret]) {
        for secret in secrets {
            let mut args = vec![
                Expr::str(secret.source.as_str()),
                Expr::str(secret.target.as_deref().unwrap_or_default()),
            ];
            if let Some(uid) = non_empty(secret.uid.as_ref()) {
                args.push(Expr::call(self.ns, "SecretUID", vec![Expr::str(uid)]));
            }
            if let Some(gid) = non_empty(secret.gid.as_ref()) {
                args.push(Expr::call(self.ns, "SecretGID", vec![Expr::str(gid)]));
            }
            if let Some(mode) = secret.mode {
                args.push(Expr::call(self.ns, "SecretMode", vec![Expr::file_mode(mode)]));
            }
            self.push(name, args);
        }
    }

    /// Appends an already built call.
    pub(crate) fn extend(&mut self, calls: impl IntoIterator<Item = Expr>) {
        self.calls.extend(calls);
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub(crate) fn into_vec(self) -> Vec<Expr> {
        self.calls
    }
}

/// Treats an empty string the same as an absent one.
pub(crate) fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_emit_nothing() {
        let mut calls = Calls::new(Namespace::Host);
        calls.flag("Privileged", false);
        calls.string("Runtime", None);
        calls.string("Runtime", Some(&String::new()));
        calls.int("PidsLimit", None);
        calls.int("PidsLimit", Some(0));
        calls.strings("DNS", &[]);
        calls.pairs("Sysctl", &HashMap::new());
        assert!(calls.is_empty());
    }

    #[test]
    fn pairs_are_sorted() {
        let mut map = HashMap::new();
        let _ = map.insert("b".to_string(), "2".to_string());
        let _ = map.insert("a".to_string(), "1".to_string());
        let mut calls = Calls::new(Namespace::Container);
        calls.pairs("Label", &map);
        let calls = calls.into_vec();
        assert_eq!(
            calls,
            vec![
                Expr::call(
                    Namespace::Container,
                    "Label",
                    vec![Expr::str("a"), Expr::str("1")]
                ),
                Expr::call(
                    Namespace::Container,
                    "Label",
                    vec![Expr::str("b"), Expr::str("2")]
                ),
            ]
        );
    }

    #[test]
    fn unset_optional_pair_becomes_empty_string() {
        let mut map = HashMap::new();
        let _ = map.insert("DEBUG".to_string(), None);
        let mut calls = Calls::new(Namespace::Container);
        calls.optional_pairs("Env", &map);
        assert_eq!(
            calls.into_vec(),
            vec![Expr::call(
                Namespace::Container,
                "Env",
                vec![Expr::str("DEBUG"), Expr::str("")]
            )]
        );
    }

    #[test]
    fn secret_with_owner_and_mode() {
        let mut calls = Calls::new(Namespace::Service);
        calls.secrets(
            "Secret",
            &[ServiceSecret {
                source: "db_pass".into(),
                target: Some("/run/secrets/db".into()),
                uid: Some("1000".into()),
                gid: None,
                mode: Some(0o440),
            }],
        );
        assert_eq!(
            calls.into_vec(),
            vec![Expr::call(
                Namespace::Service,
                "Secret",
                vec![
                    Expr::str("db_pass"),
                    Expr::str("/run/secrets/db"),
                    Expr::call(Namespace::Service, "SecretUID", vec![Expr::str("1000")]),
                    Expr::call(Namespace::Service, "SecretMode", vec![Expr::file_mode(0o440)]),
                ]
            )]
        );
    }
}
