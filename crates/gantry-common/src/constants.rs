//! System-wide constants and lowering defaults.

/// Application name used in CLI output and generated file headers.
pub const APP_NAME: &str = "gantry";

/// Go package name used when none is given.
pub const DEFAULT_PACKAGE: &str = "main";

/// Go module root of the fluent builder API the generated code targets.
pub const DEFAULT_API_MODULE: &str = "github.com/gantry-dev/gantry-go";

/// Name of the dotenv file looked up next to the first descriptor.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Project name used when neither the options, the descriptor, nor the
/// working directory provide one.
pub const FALLBACK_PROJECT_NAME: &str = "default";

/// Protocol assumed for ports that do not declare one.
pub const DEFAULT_PROTOCOL: &str = "tcp";

/// Host IP a port binding listens on when none is declared.
pub const DEFAULT_HOST_IP: &str = "0.0.0.0";

/// Cgroup permissions given to a device mapping that declares none.
pub const DEFAULT_DEVICE_PERMISSIONS: &str = "rwm";

/// File mode of a tmpfs mount that declares none.
pub const DEFAULT_TMPFS_MODE: u32 = 0o777;

/// Source name substituted for a named-volume mount without a source.
pub const ANONYMOUS_VOLUME: &str = "anonymous";

/// Dependency condition that gates startup on the dependency's health check.
pub const CONDITION_SERVICE_HEALTHY: &str = "service_healthy";

/// Deepest nesting level at which configuration calls still get one
/// argument per line.
pub const MAX_ARGUMENT_BREAK_DEPTH: usize = 6;
