//! Image build specification.

use std::collections::HashMap;

use serde::Deserialize;

use super::{ServiceSecret, Ulimit};
use crate::de;

/// How to build a service's image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build context path or URL.
    pub context: Option<String>,
    /// Dockerfile path relative to the context.
    pub dockerfile: Option<String>,
    /// Inline Dockerfile content.
    pub dockerfile_inline: Option<String>,
    /// Build stage to target.
    pub target: Option<String>,
    /// Build arguments; a `None` value means "declared without value".
    #[serde(deserialize_with = "de::environment")]
    pub args: HashMap<String, Option<String>>,
    /// Cache import sources.
    #[serde(deserialize_with = "de::string_list")]
    pub cache_from: Vec<String>,
    /// Cache export destinations.
    #[serde(deserialize_with = "de::string_list")]
    pub cache_to: Vec<String>,
    /// Disable the build cache.
    pub no_cache: bool,
    /// SSH agent sockets or keys to forward.
    #[serde(deserialize_with = "de::ssh_keys")]
    pub ssh: Vec<SshKey>,
    /// Image labels.
    #[serde(deserialize_with = "de::labels")]
    pub labels: HashMap<String, String>,
    /// Network used during `RUN` instructions.
    pub network: Option<String>,
    /// Isolation technology.
    pub isolation: Option<String>,
    /// Always pull referenced images.
    pub pull: bool,
    /// Build-time secrets.
    #[serde(deserialize_with = "de::service_secrets")]
    pub secrets: Vec<ServiceSecret>,
    /// Additional image tags.
    #[serde(deserialize_with = "de::string_list")]
    pub tags: Vec<String>,
    /// Resource limits for build containers.
    pub ulimits: HashMap<String, Ulimit>,
    /// Target platforms.
    #[serde(deserialize_with = "de::string_list")]
    pub platforms: Vec<String>,
    /// Run build containers privileged.
    pub privileged: bool,
    /// Extra `/etc/hosts` entries for build containers.
    #[serde(deserialize_with = "de::extra_hosts")]
    pub extra_hosts: HashMap<String, Vec<String>>,
    /// Named additional build contexts.
    #[serde(deserialize_with = "de::labels")]
    pub additional_contexts: HashMap<String, String>,
}

impl BuildConfig {
    /// Creates a build spec with only a context path.
    #[must_use]
    pub fn with_context(context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..Self::default()
        }
    }
}

/// An SSH forwarding entry.
///
/// Loaders that only see the short `id=path` token keep it whole in `id`
/// and leave `path` empty; consumers split it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SshKey {
    /// Entry id (`default` for the agent socket).
    pub id: String,
    /// Socket or key path.
    pub path: String,
}

impl SshKey {
    /// Resolves the `(id, path)` pair, splitting a combined `id=path` token
    /// on its first `=` when no explicit path is present.
    #[must_use]
    pub fn resolve(&self) -> (&str, &str) {
        if self.path.is_empty() {
            if let Some((id, path)) = self.id.split_once('=') {
                return (id, path);
            }
        }
        (self.id.as_str(), self.path.as_str())
    }
}
