//! Generator options record.

use serde::{Deserialize, Serialize};

/// Options controlling a single `generate` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Go package clause of the generated file.
    pub package: String,
    /// Whether to emit a runnable `main` entry point.
    pub emit_main: bool,
    /// Overrides the descriptor's project name when set.
    pub project_name: Option<String>,
    /// Profile tags passed to the generated `Up`/`Down` calls.
    pub profiles: Vec<String>,
    /// Go module root of the builder API imports.
    pub api_module: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            package: crate::constants::DEFAULT_PACKAGE.to_string(),
            emit_main: false,
            project_name: None,
            profiles: Vec::new(),
            api_module: crate::constants::DEFAULT_API_MODULE.to_string(),
        }
    }
}

impl GenerateOptions {
    /// Returns the project name the generated program declares, preferring
    /// the override over the descriptor's own name.
    #[must_use]
    pub fn effective_project_name<'a>(&'a self, descriptor_name: &'a str) -> &'a str {
        match self.project_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => descriptor_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_main_package() {
        let opts = GenerateOptions::default();
        assert_eq!(opts.package, "main");
        assert!(!opts.emit_main);
        assert!(opts.profiles.is_empty());
        assert_eq!(opts.api_module, crate::constants::DEFAULT_API_MODULE);
    }

    #[test]
    fn override_wins_over_descriptor_name() {
        let opts = GenerateOptions {
            project_name: Some("shop".into()),
            ..GenerateOptions::default()
        };
        assert_eq!(opts.effective_project_name("demo"), "shop");
    }

    #[test]
    fn empty_override_is_ignored() {
        let opts = GenerateOptions {
            project_name: Some(String::new()),
            ..GenerateOptions::default()
        };
        assert_eq!(opts.effective_project_name("demo"), "demo");
    }

    #[test]
    fn options_serialization_roundtrip() {
        let opts = GenerateOptions {
            emit_main: true,
            profiles: vec!["debug".into()],
            ..GenerateOptions::default()
        };
        let json = serde_json::to_string(&opts).expect("serialize");
        let back: GenerateOptions = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, opts);
    }
}
