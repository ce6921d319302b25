//! Registry of the Go packages generated code may reference.
//!
//! Every package qualifier printed by the renderer comes from [`Namespace`];
//! retargeting the generator to another builder module only changes the
//! `api_module` root passed to [`Namespace::import_path`].

use std::fmt;

/// A Go package referenced by generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// Builder root: projects, containers, services, lifecycle options.
    Gantry,
    /// Container-level settings.
    Container,
    /// Host and runtime settings.
    Host,
    /// Network endpoint settings.
    Endpoint,
    /// Platform selector.
    Platform,
    /// Orchestration settings.
    Service,
    /// Health check settings.
    Healthcheck,
    /// Image build settings.
    Build,
    /// Deployment settings.
    Deploy,
    /// Top-level network definitions.
    Network,
    /// IPAM pool settings.
    Ipam,
    /// Top-level volume definitions.
    Volume,
    /// Go `context`.
    Context,
    /// Go `errors`.
    Errors,
    /// Go `log`.
    Log,
    /// Go `os`.
    Os,
    /// Go `os/signal`.
    Signal,
    /// Go `syscall`.
    Syscall,
    /// Go `time`.
    Time,
}

impl Namespace {
    /// Every registered namespace.
    pub const ALL: [Self; 19] = [
        Self::Gantry,
        Self::Container,
        Self::Host,
        Self::Endpoint,
        Self::Platform,
        Self::Service,
        Self::Healthcheck,
        Self::Build,
        Self::Deploy,
        Self::Network,
        Self::Ipam,
        Self::Volume,
        Self::Context,
        Self::Errors,
        Self::Log,
        Self::Os,
        Self::Signal,
        Self::Syscall,
        Self::Time,
    ];

    /// Package qualifier used in generated code.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::Gantry => "gantry",
            Self::Container => "container",
            Self::Host => "host",
            Self::Endpoint => "endpoint",
            Self::Platform => "platform",
            Self::Service => "service",
            Self::Healthcheck => "healthcheck",
            Self::Build => "build",
            Self::Deploy => "deploy",
            Self::Network => "network",
            Self::Ipam => "ipam",
            Self::Volume => "volume",
            Self::Context => "context",
            Self::Errors => "errors",
            Self::Log => "log",
            Self::Os => "os",
            Self::Signal => "signal",
            Self::Syscall => "syscall",
            Self::Time => "time",
        }
    }

    /// Whether the package belongs to the Go standard library.
    #[must_use]
    pub const fn is_std(self) -> bool {
        matches!(
            self,
            Self::Context
                | Self::Errors
                | Self::Log
                | Self::Os
                | Self::Signal
                | Self::Syscall
                | Self::Time
        )
    }

    /// Whether calls in this package are configuration calls, which get
    /// one argument per line when they nest further calls.
    #[must_use]
    pub const fn is_config(self) -> bool {
        !self.is_std() && !matches!(self, Self::Gantry)
    }

    /// Import path of the package.
    #[must_use]
    pub fn import_path(self, api_module: &str) -> String {
        match self {
            Self::Signal => "os/signal".to_string(),
            ns if ns.is_std() => ns.alias().to_string(),
            ns => format!("{}/{}", api_module.trim_end_matches('/'), ns.alias()),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn aliases_are_unique() {
        let aliases: HashSet<&str> = Namespace::ALL.iter().map(|ns| ns.alias()).collect();
        assert_eq!(aliases.len(), Namespace::ALL.len());
    }

    #[test]
    fn std_paths() {
        assert_eq!(Namespace::Context.import_path("example.com/x"), "context");
        assert_eq!(Namespace::Signal.import_path("example.com/x"), "os/signal");
    }

    #[test]
    fn builder_paths_follow_module_root() {
        assert_eq!(
            Namespace::Host.import_path("example.com/builder/"),
            "example.com/builder/host"
        );
        assert_eq!(
            Namespace::Gantry.import_path("example.com/builder"),
            "example.com/builder/gantry"
        );
    }

    #[test]
    fn config_namespaces_exclude_root_and_std() {
        assert!(Namespace::Container.is_config());
        assert!(Namespace::Ipam.is_config());
        assert!(!Namespace::Gantry.is_config());
        assert!(!Namespace::Time.is_config());
    }
}
