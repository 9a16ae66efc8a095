//! In-memory document store.
//!
//! Documents are kept as encoded JSON bodies so reads always decode a fresh
//! value, matching the SQLite backend's observable behavior. Handles created
//! from clones of one `MemoryBackend` share state.

use crate::store::{
    decode_document, encode_document, validate_collection_name, Document, DocumentStore,
    StoreError, StoreResult, Versioned,
};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
struct StoredDocument {
    body: String,
    version: u64,
}

type Collections = BTreeMap<String, BTreeMap<String, StoredDocument>>;

/// Shared process-local storage for any number of collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Document store bound to one collection of a `MemoryBackend`.
pub struct MemoryDocumentStore<T> {
    backend: MemoryBackend,
    collection: String,
    _document: PhantomData<fn() -> T>,
}

impl<T: Document> MemoryDocumentStore<T> {
    pub fn try_new(backend: MemoryBackend, collection: impl Into<String>) -> StoreResult<Self> {
        let collection = collection.into();
        validate_collection_name(&collection)?;
        Ok(Self {
            backend,
            collection,
            _document: PhantomData,
        })
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.backend
            .collections
            .read()
            .map_err(|_| StoreError::BackendPoisoned(self.collection.clone()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.backend
            .collections
            .write()
            .map_err(|_| StoreError::BackendPoisoned(self.collection.clone()))
    }

    fn not_found(&self, id: &str) -> StoreError {
        StoreError::NotFound {
            collection: self.collection.clone(),
            id: id.to_string(),
        }
    }
}

impl<T: Document> DocumentStore<T> for MemoryDocumentStore<T> {
    fn collection(&self) -> &str {
        self.collection.as_str()
    }

    fn retrieve_all(&self) -> StoreResult<Vec<T>> {
        let collections = self.read()?;
        let Some(documents) = collections.get(&self.collection) else {
            return Ok(Vec::new());
        };
        documents
            .iter()
            .map(|(id, stored)| decode_document(&self.collection, id, &stored.body))
            .collect()
    }

    fn retrieve_versioned(&self, id: &str) -> StoreResult<Versioned<T>> {
        let collections = self.read()?;
        let stored = collections
            .get(&self.collection)
            .and_then(|documents| documents.get(id))
            .ok_or_else(|| self.not_found(id))?;
        Ok(Versioned {
            document: decode_document(&self.collection, id, &stored.body)?,
            version: stored.version,
        })
    }

    fn create_or_replace(&self, document: &T) -> StoreResult<()> {
        let body = encode_document(document)?;
        let mut collections = self.write()?;
        let documents = collections.entry(self.collection.clone()).or_default();
        match documents.get_mut(document.document_id()) {
            Some(stored) if stored.body == body => {}
            Some(stored) => {
                stored.body = body;
                stored.version += 1;
            }
            None => {
                documents.insert(
                    document.document_id().to_string(),
                    StoredDocument { body, version: 1 },
                );
            }
        }
        Ok(())
    }

    fn replace_if_version(&self, document: &T, expected_version: u64) -> StoreResult<u64> {
        let id = document.document_id();
        let body = encode_document(document)?;
        let mut collections = self.write()?;
        let stored = collections
            .get_mut(&self.collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| self.not_found(id))?;

        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual: stored.version,
            });
        }

        stored.body = body;
        stored.version += 1;
        Ok(stored.version)
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let mut collections = self.write()?;
        if let Some(documents) = collections.get_mut(&self.collection) {
            documents.remove(id);
        }
        Ok(())
    }

    fn count(&self) -> StoreResult<u64> {
        let collections = self.read()?;
        let count = collections
            .get(&self.collection)
            .map_or(0, |documents| documents.len());
        Ok(count as u64)
    }
}
