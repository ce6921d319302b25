//! Serde helpers that fold the descriptor's alternative syntaxes (short
//! strings, lists, maps) into the single normalized model shape.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::model::{
    BuildConfig, DeviceMapping, EnvFile, PortConfig, ServiceDependency, ServiceNetworkConfig,
    ServiceSecret, ServiceVolume, SshKey, Ulimit,
};
use crate::units;

/// Any YAML scalar, kept as its textual form.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrMap<V> {
    Map(HashMap<String, Option<V>>),
    List(Vec<String>),
}

/// Raw shape of a ulimit: `nofile: 1024` or `nofile: {soft: 1, hard: 2}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawUlimit {
    /// One value for both bounds.
    Single(i64),
    /// Explicit bounds.
    Pair {
        /// Soft limit.
        soft: Option<i64>,
        /// Hard limit.
        hard: Option<i64>,
    },
}

impl From<RawUlimit> for Ulimit {
    fn from(raw: RawUlimit) -> Self {
        match raw {
            RawUlimit::Single(v) => Self {
                single: Some(v),
                soft: None,
                hard: None,
            },
            RawUlimit::Pair { soft, hard } => Self {
                single: None,
                soft,
                hard,
            },
        }
    }
}

pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<OneOrMany<Scalar>>::deserialize(d)?;
    Ok(raw
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(Scalar::into_string)
        .collect())
}

pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.map(Scalar::into_string))
}

pub fn opt_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match Option::<Scalar>::deserialize(d)? {
        None => Ok(None),
        #[allow(clippy::cast_precision_loss)]
        Some(Scalar::Int(n)) => Ok(Some(n as f64)),
        Some(Scalar::Float(f)) => Ok(Some(f)),
        Some(Scalar::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid number: {s:?}"))),
        Some(Scalar::Bool(b)) => Err(D::Error::custom(format!("expected a number, got {b}"))),
    }
}

pub fn opt_duration<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
    match Option::<Scalar>::deserialize(d)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => u64::try_from(n)
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| D::Error::custom(format!("negative duration: {n}"))),
        Some(other) => units::parse_duration(&other.into_string())
            .map(Some)
            .map_err(D::Error::custom),
    }
}

pub fn bytes<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(opt_bytes(d)?.unwrap_or_default())
}

pub fn opt_bytes<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Option::<Scalar>::deserialize(d)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => Ok(Some(n)),
        Some(other) => units::parse_bytes(&other.into_string())
            .map(Some)
            .map_err(D::Error::custom),
    }
}

/// File modes are written in octal; a plain YAML integer such as `0440`
/// arrives as decimal 440 and is reinterpreted digit by digit.
pub fn opt_file_mode<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let text = match Option::<Scalar>::deserialize(d)? {
        None => return Ok(None),
        Some(scalar) => scalar.into_string(),
    };
    let digits = text.trim();
    let digits = digits
        .strip_prefix("0o")
        .or_else(|| digits.strip_prefix("0O"))
        .unwrap_or(digits);
    u32::from_str_radix(digits, 8)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("invalid file mode: {text:?}")))
}

pub fn environment<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<HashMap<String, Option<String>>, D::Error> {
    let raw = Option::<ListOrMap<Scalar>>::deserialize(d)?;
    Ok(match raw {
        None => HashMap::new(),
        Some(ListOrMap::Map(map)) => map
            .into_iter()
            .map(|(k, v)| (k, v.map(Scalar::into_string)))
            .collect(),
        Some(ListOrMap::List(items)) => items
            .into_iter()
            .map(|item| match item.split_once('=') {
                Some((k, v)) => (k.to_string(), Some(v.to_string())),
                None => (item, None),
            })
            .collect(),
    })
}

pub fn labels<'de, D: Deserializer<'de>>(d: D) -> Result<HashMap<String, String>, D::Error> {
    Ok(environment(d)?
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_default()))
        .collect())
}

/// Splits a shell-form command string into words, honouring single and
/// double quotes and backslash escapes.
fn shell_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"') | None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    in_word = true;
                }
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

pub fn command<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Shell(String),
        Exec(Vec<Scalar>),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        None => Vec::new(),
        Some(Raw::Shell(line)) => shell_words(&line),
        Some(Raw::Exec(items)) => items.into_iter().map(Scalar::into_string).collect(),
    })
}

pub fn healthcheck_test<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Shell(String),
        Exec(Vec<String>),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        None => Vec::new(),
        Some(Raw::Shell(line)) => vec!["CMD-SHELL".to_string(), line],
        Some(Raw::Exec(items)) => items,
    })
}

pub fn ports<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PortConfig>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Long(PortConfig),
        Short(Scalar),
    }
    let mut out = Vec::new();
    for entry in Option::<Vec<Raw>>::deserialize(d)?.unwrap_or_default() {
        match entry {
            Raw::Long(port) => out.push(port),
            Raw::Short(spec) => {
                out.extend(units::parse_port_spec(&spec.into_string()).map_err(D::Error::custom)?);
            }
        }
    }
    Ok(out)
}

fn looks_like_path(source: &str) -> bool {
    source.starts_with('.') || source.starts_with('/') || source.starts_with('~')
}

fn parse_short_volume(spec: &str) -> ServiceVolume {
    let parts: Vec<&str> = spec.splitn(3, ':').collect();
    let (source, target, mode) = match parts.as_slice() {
        [target] => (None, *target, None),
        [source, target] => (Some(*source), *target, None),
        [source, target, mode] => (Some(*source), *target, Some(*mode)),
        _ => (None, spec, None),
    };
    let kind = match source {
        Some(src) if looks_like_path(src) => "bind",
        _ => "volume",
    };
    let read_only = mode.is_some_and(|m| m.split(',').any(|flag| flag == "ro"));
    ServiceVolume {
        kind: Some(kind.to_string()),
        source: source.map(str::to_string),
        target: target.to_string(),
        read_only,
        tmpfs: None,
    }
}

pub fn service_volumes<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<ServiceVolume>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Short(String),
        Long(ServiceVolume),
    }
    Ok(Option::<Vec<Raw>>::deserialize(d)?
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match entry {
            Raw::Short(spec) => parse_short_volume(&spec),
            Raw::Long(volume) => volume,
        })
        .collect())
}

pub fn extra_hosts<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<HashMap<String, Vec<String>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Map(HashMap<String, OneOrMany<String>>),
        List(Vec<String>),
    }
    let mut hosts: HashMap<String, Vec<String>> = HashMap::new();
    match Option::<Raw>::deserialize(d)? {
        None => {}
        Some(Raw::Map(map)) => {
            for (host, ips) in map {
                hosts.entry(host).or_default().extend(ips.into_vec());
            }
        }
        Some(Raw::List(items)) => {
            for item in items {
                let split = item.split_once('=').or_else(|| item.split_once(':'));
                if let Some((host, ip)) = split {
                    hosts
                        .entry(host.to_string())
                        .or_default()
                        .push(ip.to_string());
                }
            }
        }
    }
    Ok(hosts)
}

pub fn devices<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<DeviceMapping>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Short(String),
        Long(DeviceMapping),
    }
    Ok(Option::<Vec<Raw>>::deserialize(d)?
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match entry {
            Raw::Long(device) => device,
            Raw::Short(spec) => {
                let mut parts = spec.splitn(3, ':');
                let source = parts.next().unwrap_or_default().to_string();
                let target = parts
                    .next()
                    .map_or_else(|| source.clone(), str::to_string);
                let permissions = parts.next().map(str::to_string);
                DeviceMapping {
                    source,
                    target,
                    permissions,
                }
            }
        })
        .collect())
}

pub fn service_networks<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<HashMap<String, Option<ServiceNetworkConfig>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Map(HashMap<String, Option<ServiceNetworkConfig>>),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        None => HashMap::new(),
        Some(Raw::List(names)) => names.into_iter().map(|n| (n, None)).collect(),
        Some(Raw::Map(map)) => map,
    })
}

pub fn depends_on<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<HashMap<String, ServiceDependency>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Map(HashMap<String, Option<ServiceDependency>>),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        None => HashMap::new(),
        Some(Raw::List(names)) => names
            .into_iter()
            .map(|n| (n, ServiceDependency::default()))
            .collect(),
        Some(Raw::Map(map)) => map
            .into_iter()
            .map(|(n, dep)| (n, dep.unwrap_or_default()))
            .collect(),
    })
}

pub fn env_files<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<EnvFile>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Path(String),
        Entry(EnvFile),
    }
    Ok(Option::<OneOrMany<Raw>>::deserialize(d)?
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match entry {
            Raw::Path(path) => EnvFile {
                path,
                required: true,
            },
            Raw::Entry(file) => file,
        })
        .collect())
}

pub fn service_secrets<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<ServiceSecret>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Name(String),
        Entry(ServiceSecret),
    }
    Ok(Option::<Vec<Raw>>::deserialize(d)?
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match entry {
            Raw::Name(source) => ServiceSecret {
                source,
                ..ServiceSecret::default()
            },
            Raw::Entry(secret) => secret,
        })
        .collect())
}

pub fn opt_build<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BuildConfig>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Context(String),
        Full(Box<BuildConfig>),
    }
    Ok(Option::<Raw>::deserialize(d)?.map(|raw| match raw {
        Raw::Context(context) => BuildConfig::with_context(context),
        Raw::Full(config) => *config,
    }))
}

pub fn ssh_keys<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<SshKey>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Map(HashMap<String, Option<String>>),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        None => Vec::new(),
        Some(Raw::List(tokens)) => tokens
            .into_iter()
            .map(|id| SshKey {
                id,
                path: String::new(),
            })
            .collect(),
        Some(Raw::Map(map)) => {
            let mut keys: Vec<SshKey> = map
                .into_iter()
                .map(|(id, path)| SshKey {
                    id,
                    path: path.unwrap_or_default(),
                })
                .collect();
            keys.sort_by(|a, b| a.id.cmp(&b.id));
            keys
        }
    })
}

pub fn external<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Named(serde_yaml::Mapping),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        None => false,
        Some(Raw::Flag(flag)) => flag,
        Some(Raw::Named(_)) => true,
    })
}

pub fn device_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Option::<Scalar>::deserialize(d)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => Ok(Some(n)),
        Some(Scalar::Str(s)) if s == "all" => Ok(Some(-1)),
        Some(other) => {
            let text = other.into_string();
            text.parse::<i64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid device count: {text:?}")))
        }
    }
}
