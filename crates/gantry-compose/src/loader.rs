//! Descriptor loading: read, merge, interpolate, and decode into the model.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gantry_common::constants::{DEFAULT_ENV_FILE, FALLBACK_PROJECT_NAME};
use gantry_common::error::{GantryError, Result};
use serde::Deserialize;
use serde_yaml::Value;

use crate::interpolate::interpolate_value;
use crate::model::{Network, Project, Service, Volume};

/// Inputs of a load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Descriptor files, merged in order.
    pub files: Vec<PathBuf>,
    /// Dotenv file; defaults to `.env` next to the first descriptor.
    pub env_file: Option<PathBuf>,
    /// Project name override.
    pub project_name: Option<String>,
}

/// Top-level document shape.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Document {
    name: Option<String>,
    services: HashMap<String, Option<Service>>,
    networks: HashMap<String, Option<Network>>,
    volumes: HashMap<String, Option<Volume>>,
}

/// Loads and merges the descriptor files into a [`Project`].
///
/// Variables resolve against the process environment first, then the
/// dotenv file.
///
/// # Errors
///
/// Returns an error if a file cannot be read, is not valid YAML, fails
/// interpolation, or does not match the descriptor schema.
pub fn load(options: &LoadOptions) -> Result<Project> {
    let first = options.files.first().ok_or_else(|| GantryError::Config {
        message: "no descriptor files given".into(),
    })?;
    tracing::info!(files = options.files.len(), "loading descriptors");

    let mut merged = Value::Null;
    for path in &options.files {
        let text = std::fs::read_to_string(path).map_err(|source| GantryError::Io {
            path: path.clone(),
            source,
        })?;
        let doc: Value = serde_yaml::from_str(&text).map_err(|e| GantryError::Descriptor {
            path: path.clone(),
            message: e.to_string(),
        })?;
        merge(&mut merged, doc);
    }

    let dotenv = match &options.env_file {
        Some(path) => crate::dotenv::read(path)?,
        None => {
            let default = first
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_ENV_FILE);
            if default.is_file() {
                crate::dotenv::read(&default)?
            } else {
                HashMap::new()
            }
        }
    };
    let lookup = |name: &str| std::env::var(name).ok().or_else(|| dotenv.get(name).cloned());

    let mut project = decode(merged, &lookup, &source_label(&options.files))?;
    project.name = resolve_project_name(options.project_name.as_deref(), &project.name, first);
    tracing::info!(
        project = %project.name,
        services = project.services.len(),
        networks = project.networks.len(),
        volumes = project.volumes.len(),
        "descriptor loaded"
    );
    Ok(project)
}

/// Decodes a single descriptor from text, resolving variables from `env`.
///
/// # Errors
///
/// Returns an error if the text is not valid YAML, fails interpolation, or
/// does not match the descriptor schema.
pub fn load_from_str(text: &str, env: &HashMap<String, String>) -> Result<Project> {
    let doc: Value = serde_yaml::from_str(text).map_err(|e| GantryError::Descriptor {
        path: PathBuf::from("<input>"),
        message: e.to_string(),
    })?;
    let lookup = |name: &str| env.get(name).cloned();
    let mut project = decode(doc, &lookup, Path::new("<input>"))?;
    if project.name.is_empty() {
        project.name = FALLBACK_PROJECT_NAME.to_string();
    }
    Ok(project)
}

fn source_label(files: &[PathBuf]) -> PathBuf {
    match files {
        [single] => single.clone(),
        _ => PathBuf::from("<merged>"),
    }
}

fn decode<F>(mut doc: Value, lookup: &F, source: &Path) -> Result<Project>
where
    F: Fn(&str) -> Option<String>,
{
    interpolate_value(&mut doc, lookup)?;
    let document: Document = if doc.is_null() {
        Document::default()
    } else {
        serde_yaml::from_value(doc).map_err(|e| GantryError::Descriptor {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?
    };

    let services = document
        .services
        .into_iter()
        .map(|(name, service)| {
            let mut service = service.unwrap_or_default();
            service.name.clone_from(&name);
            normalize_service(&mut service);
            (name, service)
        })
        .collect();

    Ok(Project {
        name: document.name.unwrap_or_default(),
        services,
        networks: document
            .networks
            .into_iter()
            .map(|(k, v)| (k, v.unwrap_or_default()))
            .collect(),
        volumes: document
            .volumes
            .into_iter()
            .map(|(k, v)| (k, v.unwrap_or_default()))
            .collect(),
    })
}

/// Applies the normalizations that decoding alone cannot express.
fn normalize_service(service: &mut Service) {
    if let Some(check) = service.healthcheck.as_mut() {
        if check.test.first().map(String::as_str) == Some("NONE") {
            check.disable = true;
            check.test.clear();
        }
    }
    for device in &mut service.devices {
        if device.target.is_empty() {
            device.target.clone_from(&device.source);
        }
    }
}

/// Deep-merges `overlay` into `base`: mappings merge key by key, anything
/// else is replaced.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        let _ = base_map.insert(key, value);
                    }
                }
            }
        }
        (base, Value::Null) if !base.is_null() => {}
        (base, overlay) => *base = overlay,
    }
}

fn resolve_project_name(override_name: Option<&str>, declared: &str, first: &Path) -> String {
    if let Some(name) = override_name.filter(|n| !n.is_empty()) {
        return name.to_lowercase();
    }
    if !declared.is_empty() {
        return declared.to_lowercase();
    }
    std::fs::canonicalize(first)
        .ok()
        .and_then(|p| {
            p.parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().to_lowercase())
        })
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string())
}
