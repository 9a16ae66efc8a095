//! Document store connection settings.

use crate::config::{process_env, Backend, ConfigResult, Configuration};
use crate::logging::default_log_level;
use std::fmt::{Debug, Formatter};
use std::path::Path;

/// Prefix of environment overrides, e.g. `SHELLSTORE_STORE_PATH`.
pub const ENV_PREFIX: &str = "SHELLSTORE_";
/// Environment variable naming an explicit properties file.
pub const DEFAULT_FILE_KEY: &str = "SHELLSTORE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "shellstore.properties";

pub const BACKEND: &str = "store.backend";
pub const PATH: &str = "store.path";
pub const COLLECTION: &str = "store.collection";
pub const USER: &str = "store.user";
pub const PASSWORD: &str = "store.password";
pub const LOG_LEVEL: &str = "log.level";
pub const LOG_DIR: &str = "log.dir";

const KEYS: &[&str] = &[BACKEND, PATH, COLLECTION, USER, PASSWORD, LOG_LEVEL, LOG_DIR];

/// Credentials handed to backends that authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    values: Configuration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            values: Configuration::with_defaults([
                (BACKEND, Backend::Sqlite.as_str()),
                (PATH, "shellstore.sqlite3"),
                (COLLECTION, "shells"),
                (LOG_LEVEL, default_log_level()),
            ]),
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the properties file (if any) and then environment overrides
    /// from the process environment.
    pub fn load_from_default_source(&mut self) -> ConfigResult<()> {
        self.load_with(Path::new(DEFAULT_CONFIG_PATH), process_env)
    }

    /// Same as `load_from_default_source` with an injectable environment.
    ///
    /// # Errors
    /// - `Io` / `Parse` when the properties file cannot be read.
    /// - `InvalidEnumValue` when the loaded `store.backend` is out of set.
    pub fn load_with(
        &mut self,
        default_path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        self.values
            .load_file_or_default_with(DEFAULT_FILE_KEY, default_path, &lookup)?;
        self.values.load_from_env_with(ENV_PREFIX, KEYS, &lookup);
        self.backend()?;
        Ok(())
    }

    pub fn backend(&self) -> ConfigResult<Backend> {
        self.values.parse_enum(BACKEND)
    }

    pub fn set_backend(&mut self, backend: Backend) {
        self.values.set(BACKEND, backend.as_str());
    }

    /// SQLite connection target: a file path or `:memory:`.
    pub fn path(&self) -> ConfigResult<&str> {
        self.values.require(PATH)
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.values.set(PATH, path);
    }

    pub fn collection(&self) -> ConfigResult<&str> {
        self.values.require(COLLECTION)
    }

    pub fn set_collection(&mut self, collection: impl Into<String>) {
        self.values.set(COLLECTION, collection);
    }

    /// Returns credentials when a user is configured.
    pub fn credentials(&self) -> Option<Credentials> {
        let user = self.values.get(USER).filter(|user| !user.is_empty())?;
        Some(Credentials {
            user: user.to_string(),
            password: self.values.get(PASSWORD).unwrap_or_default().to_string(),
        })
    }

    pub fn set_credentials(&mut self, user: impl Into<String>, password: impl Into<String>) {
        self.values.set(USER, user);
        self.values.set(PASSWORD, password);
    }

    pub fn log_level(&self) -> ConfigResult<&str> {
        self.values.require(LOG_LEVEL)
    }

    /// Directory for rolling log files; file logging is off when unset.
    pub fn log_dir(&self) -> Option<&str> {
        self.values.get(LOG_DIR).filter(|dir| !dir.trim().is_empty())
    }
}
