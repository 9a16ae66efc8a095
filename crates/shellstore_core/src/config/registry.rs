//! Registry component settings: backend choice and feature switches.
//!
//! Values are exposed as parsed enumerations; nothing here opens a backend.

use crate::config::{process_env, Backend, ConfigResult, Configuration, FeatureToggle};
use crate::model::InvalidEnumValue;
use std::path::Path;
use std::str::FromStr;

pub const ENV_PREFIX: &str = "SHELLSTORE_REGISTRY_";
pub const DEFAULT_FILE_KEY: &str = "SHELLSTORE_REGISTRY";
pub const DEFAULT_CONFIG_PATH: &str = "registry.properties";

pub const BACKEND: &str = "registry.backend";
pub const EVENTS: &str = "registry.events";
pub const AUTHORIZATION: &str = "registry.authorization";
pub const TAGGED_DIRECTORY: &str = "registry.taggedDirectory";

const KEYS: &[&str] = &[BACKEND, EVENTS, AUTHORIZATION, TAGGED_DIRECTORY];

/// Where registry change events go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventBackend {
    None,
    /// Events are emitted as log records.
    Log,
}

impl EventBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Log => "Log",
        }
    }
}

impl FromStr for EventBackend {
    type Err = InvalidEnumValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "None" => Ok(Self::None),
            "Log" => Ok(Self::Log),
            other => Err(InvalidEnumValue::new("event backend", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    values: Configuration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            values: Configuration::with_defaults([
                (BACKEND, Backend::InMemory.as_str()),
                (EVENTS, EventBackend::None.as_str()),
                (AUTHORIZATION, FeatureToggle::Disabled.as_str()),
                (TAGGED_DIRECTORY, FeatureToggle::Disabled.as_str()),
            ]),
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: Backend) -> Self {
        let mut config = Self::default();
        config.set_backend(backend);
        config
    }

    pub fn load_from_default_source(&mut self) -> ConfigResult<()> {
        self.load_with(Path::new(DEFAULT_CONFIG_PATH), process_env)
    }

    /// Loads file and environment layers, then checks every enumerated
    /// option so out-of-set values fail at load time.
    pub fn load_with(
        &mut self,
        default_path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        self.values
            .load_file_or_default_with(DEFAULT_FILE_KEY, default_path, &lookup)?;
        self.values.load_from_env_with(ENV_PREFIX, KEYS, &lookup);
        self.validate()
    }

    pub fn backend(&self) -> ConfigResult<Backend> {
        self.values.parse_enum(BACKEND)
    }

    pub fn set_backend(&mut self, backend: Backend) {
        self.values.set(BACKEND, backend.as_str());
    }

    pub fn events(&self) -> ConfigResult<EventBackend> {
        self.values.parse_enum(EVENTS)
    }

    pub fn set_events(&mut self, events: EventBackend) {
        self.values.set(EVENTS, events.as_str());
    }

    pub fn is_authorization_enabled(&self) -> ConfigResult<bool> {
        Ok(self.values.parse_enum::<FeatureToggle>(AUTHORIZATION)?.is_enabled())
    }

    pub fn enable_authorization(&mut self, enabled: bool) {
        self.values
            .set(AUTHORIZATION, FeatureToggle::from(enabled).as_str());
    }

    pub fn is_tagged_directory_enabled(&self) -> ConfigResult<bool> {
        Ok(self
            .values
            .parse_enum::<FeatureToggle>(TAGGED_DIRECTORY)?
            .is_enabled())
    }

    pub fn enable_tagged_directory(&mut self, enabled: bool) {
        self.values
            .set(TAGGED_DIRECTORY, FeatureToggle::from(enabled).as_str());
    }

    fn validate(&self) -> ConfigResult<()> {
        self.backend()?;
        self.events()?;
        self.is_authorization_enabled()?;
        self.is_tagged_directory_enabled()?;
        Ok(())
    }
}
