//! Persistent store for administration shells and their submodel references.
//!
//! Layers, leaves first: `model` value types, `store` generic document
//! persistence (SQLite or in-memory), `repo` shell-level bookkeeping bound to
//! one identifier. `config`, `db` and `logging` supply the ambient plumbing.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::{Backend, ConfigError, ConfigResult, Configuration, RegistryConfig, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::identifier::{Identifier, IdentifierType};
pub use model::occupation::OccupationState;
pub use model::reference::{Key, KeyElement, KeyType, Reference};
pub use model::shell::Shell;
pub use model::submodel::Submodel;
pub use model::InvalidEnumValue;
pub use repo::shell_repo::{ShellRepoError, ShellRepoResult, ShellRepository, UpdateMode};
pub use store::{
    Document, DocumentStore, MemoryBackend, MemoryDocumentStore, SqliteDocumentStore, StoreError,
    StoreResult, Versioned,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
