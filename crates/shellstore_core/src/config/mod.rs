//! Layered key/value configuration.
//!
//! # Responsibility
//! - Resolve string options from explicit values, environment variables,
//!   a Java-style properties file and built-in defaults.
//! - Parse enumerated options strictly.
//!
//! # Invariants
//! - Precedence is explicit > environment > properties file > default.
//! - Enumerated values outside their closed set fail eagerly with
//!   `InvalidEnumValue`; they are never replaced by a default.
//! - Option values are never logged, only keys and sources.

use crate::model::InvalidEnumValue;
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod registry;
pub mod store;

pub use registry::{EventBackend, RegistryConfig};
pub use store::{Credentials, StoreConfig};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        origin: String,
        line: Option<usize>,
        source: java_properties::PropertiesError,
    },
    MissingKey(&'static str),
    InvalidEnumValue {
        key: &'static str,
        source: InvalidEnumValue,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse {
                origin,
                line: Some(line),
                source,
            } => write!(f, "{origin}:{line}: {source}"),
            Self::Parse { origin, source, .. } => write!(f, "{origin}: {source}"),
            Self::MissingKey(key) => write!(f, "missing configuration key `{key}`"),
            Self::InvalidEnumValue { key, source } => write!(f, "{key}: {source}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidEnumValue { source, .. } => Some(source),
            Self::MissingKey(_) => None,
        }
    }
}

/// Storage strategy selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    InMemory,
    Sqlite,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InMemory => "InMemory",
            Self::Sqlite => "SQLite",
        }
    }
}

impl FromStr for Backend {
    type Err = InvalidEnumValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "InMemory" => Ok(Self::InMemory),
            "SQLite" => Ok(Self::Sqlite),
            other => Err(InvalidEnumValue::new("backend", other)),
        }
    }
}

/// On/off switch stored as `Enabled` / `Disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureToggle {
    Enabled,
    Disabled,
}

impl FeatureToggle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

impl From<bool> for FeatureToggle {
    fn from(value: bool) -> Self {
        if value {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

impl FromStr for FeatureToggle {
    type Err = InvalidEnumValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Enabled" => Ok(Self::Enabled),
            "Disabled" => Ok(Self::Disabled),
            other => Err(InvalidEnumValue::new("feature toggle", other)),
        }
    }
}

/// Layered string options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    defaults: BTreeMap<String, String>,
    file: BTreeMap<String, String>,
    env: BTreeMap<String, String>,
    explicit: BTreeMap<String, String>,
}

impl Configuration {
    pub fn with_defaults<K, V>(defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            defaults: defaults
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Resolves `key` through all layers in precedence order.
    pub fn get(&self, key: &str) -> Option<&str> {
        [&self.explicit, &self.env, &self.file, &self.defaults]
            .into_iter()
            .find_map(|layer| layer.get(key))
            .map(String::as_str)
    }

    /// Sets an explicit value, which overrides every other layer.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.explicit.insert(key.into(), value.into());
    }

    pub fn require(&self, key: &'static str) -> ConfigResult<&str> {
        self.get(key).ok_or(ConfigError::MissingKey(key))
    }

    /// Parses an enumerated option.
    ///
    /// # Errors
    /// - `MissingKey` when no layer defines `key`.
    /// - `InvalidEnumValue` when the value is outside the closed set.
    pub fn parse_enum<T>(&self, key: &'static str) -> ConfigResult<T>
    where
        T: FromStr<Err = InvalidEnumValue>,
    {
        self.require(key)?
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidEnumValue { key, source })
    }

    /// Loads properties text into the file layer. Returns the number of keys.
    pub fn load_properties_str(&mut self, origin: &str, source: &str) -> ConfigResult<usize> {
        let parsed = parse_properties(origin, source)?;
        let count = parsed.len();
        self.file.extend(parsed);
        Ok(count)
    }

    pub fn load_properties_file(&mut self, path: &Path) -> ConfigResult<usize> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let count = self.load_properties_str(&path.display().to_string(), &source)?;
        info!(
            "event=config_load module=config status=ok source=file path={} keys={count}",
            path.display()
        );
        Ok(count)
    }

    /// Loads the properties file named by env var `file_key`, or
    /// `default_path` when that variable is unset.
    ///
    /// A file named by `file_key` must exist; a missing default file leaves
    /// the built-in defaults in place.
    pub fn load_file_or_default_with(
        &mut self,
        file_key: &str,
        default_path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        if let Some(path) = lookup(file_key).filter(|value| !value.trim().is_empty()) {
            self.load_properties_file(Path::new(path.trim()))?;
            return Ok(());
        }
        if default_path.is_file() {
            self.load_properties_file(default_path)?;
        } else {
            info!(
                "event=config_load module=config status=skipped source=file path={}",
                default_path.display()
            );
        }
        Ok(())
    }

    /// Copies `prefix + KEY` environment overrides for `keys` into the
    /// environment layer. Returns the number of overrides found.
    pub fn load_from_env_with(
        &mut self,
        prefix: &str,
        keys: &[&str],
        lookup: impl Fn(&str) -> Option<String>,
    ) -> usize {
        let mut found = 0;
        for key in keys {
            if let Some(value) = lookup(&env_var_name(prefix, key)) {
                self.env.insert((*key).to_string(), value);
                found += 1;
            }
        }
        info!("event=config_load module=config status=ok source=env prefix={prefix} keys={found}");
        found
    }
}

/// Environment variable consulted for `key`: `prefix` followed by the key
/// upper-cased with `.` replaced by `_`.
pub fn env_var_name(prefix: &str, key: &str) -> String {
    format!("{prefix}{}", key.replace('.', "_").to_ascii_uppercase())
}

/// Reads a variable from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_properties(origin: &str, source: &str) -> ConfigResult<BTreeMap<String, String>> {
    let values = java_properties::read(source.as_bytes()).map_err(|err| ConfigError::Parse {
        origin: origin.to_string(),
        line: err.line_number(),
        source: err,
    })?;
    Ok(values.into_iter().collect())
}
