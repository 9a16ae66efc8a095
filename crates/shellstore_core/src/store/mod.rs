//! Generic document store boundary.
//!
//! # Responsibility
//! - Define the CRUD contract over one document type in one named collection.
//! - Define the optimistic-concurrency primitive (`replace_if_version`).
//! - Provide SQLite and in-memory backends.
//!
//! # Invariants
//! - At most one document per `document_id()` per collection.
//! - `delete` of an absent id is a no-op.
//! - Every committed change bumps the stored version by one; rewriting an
//!   identical body changes nothing, version included.
//! - No client-side caching: every call reflects the latest committed write.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryBackend, MemoryDocumentStore};
pub use sqlite::SqliteDocumentStore;

static COLLECTION_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.\-]{0,119}$").expect("valid collection name regex")
});

pub type StoreResult<T> = Result<T, StoreError>;

/// Serialization contract for anything kept in a `DocumentStore`.
pub trait Document: Serialize + DeserializeOwned {
    /// Lookup key of this document inside its collection.
    fn document_id(&self) -> &str;
}

/// A document together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub document: T,
    pub version: u64,
}

#[derive(Debug)]
pub enum StoreError {
    NotFound {
        collection: String,
        id: String,
    },
    VersionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },
    InvalidCollectionName(String),
    Encode(serde_json::Error),
    /// Persisted body could not be decoded into the document type.
    InvalidData(String),
    Db(DbError),
    /// In-memory backend lock was poisoned by a panicking writer.
    BackendPoisoned(String),
}

impl StoreError {
    /// Whether this failure means the backing store could not be reached or used.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Db(_) | Self::BackendPoisoned(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { collection, id } => {
                write!(f, "document `{id}` not found in collection `{collection}`")
            }
            Self::VersionConflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "document `{id}` is at version {actual}, expected {expected}"
            ),
            Self::InvalidCollectionName(name) => write!(f, "invalid collection name `{name}`"),
            Self::Encode(err) => write!(f, "failed to encode document: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
            Self::Db(err) => write!(f, "document store unavailable: {err}"),
            Self::BackendPoisoned(collection) => {
                write!(f, "in-memory collection `{collection}` is poisoned")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD over documents of type `T` inside one collection.
///
/// Each call is a single round trip to the backing store.
pub trait DocumentStore<T: Document> {
    /// Name of the collection this store is bound to.
    fn collection(&self) -> &str;

    /// Returns every document in the collection, in store-defined order.
    fn retrieve_all(&self) -> StoreResult<Vec<T>>;

    /// Returns one document and the version it is stored at.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no document has this id.
    fn retrieve_versioned(&self, id: &str) -> StoreResult<Versioned<T>>;

    /// Inserts `document`, or fully overwrites the one with the same id.
    fn create_or_replace(&self, document: &T) -> StoreResult<()>;

    /// Overwrites `document` only if it is still stored at `expected_version`.
    ///
    /// Returns the new version on success.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no document has this id.
    /// - `StoreError::VersionConflict` when another write got there first.
    fn replace_if_version(&self, document: &T, expected_version: u64) -> StoreResult<u64>;

    /// Removes the document with `id`. Absent ids are ignored.
    fn delete(&self, id: &str) -> StoreResult<()>;

    fn count(&self) -> StoreResult<u64>;

    /// Returns one document.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no document has this id.
    fn retrieve(&self, id: &str) -> StoreResult<T> {
        self.retrieve_versioned(id).map(|versioned| versioned.document)
    }
}

pub(crate) fn validate_collection_name(name: &str) -> StoreResult<()> {
    if COLLECTION_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidCollectionName(name.to_string()))
    }
}

pub(crate) fn encode_document<T: Document>(document: &T) -> StoreResult<String> {
    serde_json::to_string(document).map_err(StoreError::Encode)
}

pub(crate) fn decode_document<T: Document>(collection: &str, id: &str, body: &str) -> StoreResult<T> {
    serde_json::from_str(body).map_err(|err| {
        StoreError::InvalidData(format!(
            "document `{id}` in collection `{collection}` does not decode: {err}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::{validate_collection_name, StoreError};

    #[test]
    fn collection_names_are_validated() {
        for name in ["shells", "testCollection", "aas.registry-v2", "a_1"] {
            validate_collection_name(name).unwrap();
        }
        for name in ["", "1shells", "has space", "semi;colon"] {
            let err = validate_collection_name(name).unwrap_err();
            assert!(matches!(err, StoreError::InvalidCollectionName(ref value) if value == name));
        }
    }

    #[test]
    fn only_backend_failures_count_as_unavailable() {
        let not_found = StoreError::NotFound {
            collection: "c".to_string(),
            id: "x".to_string(),
        };
        assert!(!not_found.is_unavailable());
        assert!(StoreError::BackendPoisoned("c".to_string()).is_unavailable());
    }
}
