//! CLI probe for a configured shell store.
//!
//! # Responsibility
//! - Resolve `StoreConfig` from `shellstore.properties` and `SHELLSTORE_*`.
//! - Open the selected backend and report what it holds.

use log::error;
use shellstore_core::db::open_db_target;
use shellstore_core::{
    init_logging, Backend, DocumentStore, MemoryBackend, MemoryDocumentStore, Shell,
    SqliteDocumentStore, StoreConfig,
};
use std::error::Error;

fn main() {
    if let Err(err) = run() {
        error!("event=cli_probe module=cli status=error error={err}");
        eprintln!("shellstore: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut config = StoreConfig::new();
    config.load_from_default_source()?;
    if let Some(log_dir) = config.log_dir() {
        init_logging(config.log_level()?, log_dir)?;
    }

    let backend = config.backend()?;
    let collection = config.collection()?;
    println!("shellstore_core version={}", shellstore_core::core_version());
    println!("shellstore backend={}", backend.as_str());

    match backend {
        Backend::InMemory => {
            let store = MemoryDocumentStore::<Shell>::try_new(MemoryBackend::new(), collection)?;
            report(&store)
        }
        Backend::Sqlite => {
            let path = config.path()?;
            let conn = open_db_target(path)?;
            println!("shellstore path={path}");
            let store = SqliteDocumentStore::<Shell>::try_new(&conn, collection)?;
            report(&store)
        }
    }
}

fn report<S: DocumentStore<Shell>>(store: &S) -> Result<(), Box<dyn Error>> {
    println!("shellstore collection={}", store.collection());
    println!("shellstore shells={}", store.count()?);
    Ok(())
}
