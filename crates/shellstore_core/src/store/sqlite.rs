//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist JSON document bodies in the shared `documents` table, one row
//!   per `(collection, id)`.
//! - Implement version-checked replacement inside an immediate transaction.
//!
//! # Invariants
//! - Rows of other collections are never read or written.
//! - Stored bodies are decoded on every read; nothing is cached.

use crate::store::{
    decode_document, encode_document, validate_collection_name, Document, DocumentStore,
    StoreError, StoreResult, Versioned,
};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::marker::PhantomData;

/// Document store bound to one collection on a migrated connection.
pub struct SqliteDocumentStore<'conn, T> {
    conn: &'conn Connection,
    collection: String,
    _document: PhantomData<fn() -> T>,
}

impl<'conn, T: Document> SqliteDocumentStore<'conn, T> {
    /// Binds a store to `collection` on a connection from `open_db*`.
    ///
    /// # Errors
    /// - `InvalidCollectionName` when the name is empty or malformed.
    /// - `InvalidData` when the connection lacks the `documents` table.
    pub fn try_new(conn: &'conn Connection, collection: impl Into<String>) -> StoreResult<Self> {
        let collection = collection.into();
        validate_collection_name(&collection)?;
        ensure_documents_table(conn)?;
        Ok(Self {
            conn,
            collection,
            _document: PhantomData,
        })
    }
}

impl<T: Document> DocumentStore<T> for SqliteDocumentStore<'_, T> {
    fn collection(&self) -> &str {
        self.collection.as_str()
    }

    fn retrieve_all(&self) -> StoreResult<Vec<T>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, body
             FROM documents
             WHERE collection = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([self.collection.as_str()])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get("id")?;
            let body: String = row.get("body")?;
            documents.push(decode_document(&self.collection, &id, &body)?);
        }
        Ok(documents)
    }

    fn retrieve_versioned(&self, id: &str) -> StoreResult<Versioned<T>> {
        let row = self
            .conn
            .query_row(
                "SELECT body, version
                 FROM documents
                 WHERE collection = ?1
                   AND id = ?2;",
                params![self.collection.as_str(), id],
                |row| Ok((row.get::<_, String>("body")?, row.get::<_, i64>("version")?)),
            )
            .optional()?;

        let Some((body, version)) = row else {
            return Err(self.not_found(id));
        };
        Ok(Versioned {
            document: decode_document(&self.collection, id, &body)?,
            version: parse_version(id, version)?,
        })
    }

    fn create_or_replace(&self, document: &T) -> StoreResult<()> {
        let body = encode_document(document)?;
        let changed = self.conn.execute(
            "INSERT INTO documents (collection, id, body, version)
             VALUES (?1, ?2, ?3, 1)
             ON CONFLICT (collection, id) DO UPDATE
             SET
                body = excluded.body,
                version = documents.version + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE documents.body <> excluded.body;",
            params![self.collection.as_str(), document.document_id(), body],
        )?;
        debug!(
            "event=document_write module=store status=ok collection={} changed={changed}",
            self.collection
        );
        Ok(())
    }

    fn replace_if_version(&self, document: &T, expected_version: u64) -> StoreResult<u64> {
        let id = document.document_id();
        let body = encode_document(document)?;
        let expected = to_db_version(expected_version);

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE documents
             SET
                body = ?3,
                version = version + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?1
               AND id = ?2
               AND version = ?4;",
            params![self.collection.as_str(), id, body, expected],
        )?;

        if changed == 0 {
            let actual = tx
                .query_row(
                    "SELECT version FROM documents WHERE collection = ?1 AND id = ?2;",
                    params![self.collection.as_str(), id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            drop(tx);
            return match actual {
                None => Err(self.not_found(id)),
                Some(actual) => Err(StoreError::VersionConflict {
                    id: id.to_string(),
                    expected: expected_version,
                    actual: parse_version(id, actual)?,
                }),
            };
        }

        tx.commit()?;
        Ok(expected_version + 1)
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![self.collection.as_str(), id],
        )?;
        debug!(
            "event=document_delete module=store status=ok collection={} deleted={changed}",
            self.collection
        );
        Ok(())
    }

    fn count(&self) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1;",
            [self.collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl<T> SqliteDocumentStore<'_, T> {
    fn not_found(&self, id: &str) -> StoreError {
        StoreError::NotFound {
            collection: self.collection.clone(),
            id: id.to_string(),
        }
    }
}

fn parse_version(id: &str, value: i64) -> StoreResult<u64> {
    u64::try_from(value)
        .ok()
        .filter(|version| *version >= 1)
        .ok_or_else(|| {
            StoreError::InvalidData(format!("invalid version `{value}` for document `{id}`"))
        })
}

fn to_db_version(version: u64) -> i64 {
    // Versions beyond i64::MAX cannot exist in storage, so they never match.
    i64::try_from(version).unwrap_or(-1)
}

fn ensure_documents_table(conn: &Connection) -> StoreResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'documents'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(StoreError::InvalidData(
            "connection has no `documents` table; open it through open_db".to_string(),
        ))
    }
}
