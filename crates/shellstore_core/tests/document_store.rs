use rusqlite::{params, Connection};
use shellstore_core::db::{open_db, open_db_in_memory};
use shellstore_core::{
    DocumentStore, Identifier, MemoryBackend, MemoryDocumentStore, Shell, SqliteDocumentStore,
    StoreError, Submodel,
};

const COLLECTION: &str = "testCollection";

fn shell(id: &str, id_short: &str) -> Shell {
    Shell::new(id_short, Identifier::custom(id))
}

fn reset<S: DocumentStore<Shell>>(store: &S) {
    for shell in store.retrieve_all().unwrap() {
        store.delete(shell.identification().id()).unwrap();
    }
    assert_eq!(store.count().unwrap(), 0);
}

macro_rules! for_each_backend {
    ($($scenario:ident),* $(,)?) => {
        mod sqlite_backend {
            $(
                #[test]
                fn $scenario() {
                    let conn = shellstore_core::db::open_db_in_memory().unwrap();
                    let store = shellstore_core::SqliteDocumentStore::<shellstore_core::Shell>::try_new(
                        &conn,
                        super::COLLECTION,
                    )
                    .unwrap();
                    super::reset(&store);
                    super::$scenario(&store);
                }
            )*
        }

        mod memory_backend {
            $(
                #[test]
                fn $scenario() {
                    let backend = shellstore_core::MemoryBackend::new();
                    let store = shellstore_core::MemoryDocumentStore::<shellstore_core::Shell>::try_new(
                        backend,
                        super::COLLECTION,
                    )
                    .unwrap();
                    super::reset(&store);
                    super::$scenario(&store);
                }
            )*
        }
    };
}

for_each_backend!(
    retrieve_all_on_empty_collection_is_empty,
    create_then_retrieve_returns_equal_document,
    create_or_replace_overwrites_whole_document,
    replaying_identical_document_changes_nothing,
    retrieve_missing_id_is_not_found,
    delete_removes_document_and_ignores_absent_ids,
    replace_if_version_applies_only_at_expected_version,
    replace_if_version_on_missing_document_is_not_found,
);

fn retrieve_all_on_empty_collection_is_empty<S: DocumentStore<Shell>>(store: &S) {
    assert!(store.retrieve_all().unwrap().is_empty());
    assert_eq!(store.collection(), COLLECTION);
}

fn create_then_retrieve_returns_equal_document<S: DocumentStore<Shell>>(store: &S) {
    let mut expected = shell("shell-1", "press");
    expected.add_submodel_reference(
        Submodel::new("technical", Identifier::custom("sm-1")).reference(),
    );
    store.create_or_replace(&expected).unwrap();

    assert_eq!(store.retrieve("shell-1").unwrap(), expected);
    assert_eq!(store.retrieve_versioned("shell-1").unwrap().version, 1);
    assert_eq!(store.retrieve_all().unwrap(), vec![expected]);
}

fn create_or_replace_overwrites_whole_document<S: DocumentStore<Shell>>(store: &S) {
    let mut first = shell("shell-1", "first");
    first.add_submodel_reference(Submodel::new("a", Identifier::custom("sm-a")).reference());
    store.create_or_replace(&first).unwrap();

    let second = shell("shell-1", "second");
    store.create_or_replace(&second).unwrap();

    let stored = store.retrieve_versioned("shell-1").unwrap();
    assert_eq!(stored.document, second);
    assert!(stored.document.submodel_references().is_empty());
    assert_eq!(stored.version, 2);
    assert_eq!(store.count().unwrap(), 1);
}

fn replaying_identical_document_changes_nothing<S: DocumentStore<Shell>>(store: &S) {
    let document = shell("shell-1", "press");
    store.create_or_replace(&document).unwrap();
    store.create_or_replace(&document).unwrap();
    store.create_or_replace(&document).unwrap();

    let stored = store.retrieve_versioned("shell-1").unwrap();
    assert_eq!(stored.document, document);
    assert_eq!(stored.version, 1);
    assert_eq!(store.count().unwrap(), 1);
}

fn retrieve_missing_id_is_not_found<S: DocumentStore<Shell>>(store: &S) {
    let err = store.retrieve("missing").unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound { ref collection, ref id } if collection == COLLECTION && id == "missing"
    ));
}

fn delete_removes_document_and_ignores_absent_ids<S: DocumentStore<Shell>>(store: &S) {
    store.create_or_replace(&shell("keep", "keep")).unwrap();
    store.create_or_replace(&shell("drop", "drop")).unwrap();

    store.delete("drop").unwrap();
    store.delete("drop").unwrap();
    store.delete("never-existed").unwrap();

    let remaining = store.retrieve_all().unwrap();
    assert_eq!(remaining, vec![shell("keep", "keep")]);
}

fn replace_if_version_applies_only_at_expected_version<S: DocumentStore<Shell>>(store: &S) {
    store.create_or_replace(&shell("shell-1", "v1")).unwrap();
    let read = store.retrieve_versioned("shell-1").unwrap();

    let new_version = store
        .replace_if_version(&shell("shell-1", "v2"), read.version)
        .unwrap();
    assert_eq!(new_version, read.version + 1);

    let err = store
        .replace_if_version(&shell("shell-1", "stale"), read.version)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionConflict { expected, actual, .. } if expected == read.version && actual == new_version
    ));
    assert_eq!(store.retrieve("shell-1").unwrap().id_short, "v2");
}

fn replace_if_version_on_missing_document_is_not_found<S: DocumentStore<Shell>>(store: &S) {
    let err = store
        .replace_if_version(&shell("ghost", "ghost"), 1)
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn sqlite_collections_on_one_connection_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let shells = SqliteDocumentStore::<Shell>::try_new(&conn, "shells").unwrap();
    let archive = SqliteDocumentStore::<Shell>::try_new(&conn, "archive").unwrap();

    shells.create_or_replace(&shell("shell-1", "live")).unwrap();
    archive.create_or_replace(&shell("shell-1", "archived")).unwrap();
    archive.delete("shell-1").unwrap();

    assert_eq!(shells.retrieve("shell-1").unwrap().id_short, "live");
    assert_eq!(archive.count().unwrap(), 0);
}

#[test]
fn one_backend_serves_several_document_types() {
    let backend = MemoryBackend::new();
    let shells = MemoryDocumentStore::<Shell>::try_new(backend.clone(), "shells").unwrap();
    let submodels = MemoryDocumentStore::<Submodel>::try_new(backend, "submodels").unwrap();

    let submodel = Submodel::new("technical", Identifier::custom("sm-1"));
    submodels.create_or_replace(&submodel).unwrap();
    shells.create_or_replace(&shell("shell-1", "press")).unwrap();

    assert_eq!(submodels.retrieve("sm-1").unwrap(), submodel);
    assert_eq!(shells.count().unwrap(), 1);
    assert_eq!(submodels.count().unwrap(), 1);
}

#[test]
fn sqlite_documents_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shells.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteDocumentStore::<Shell>::try_new(&conn, COLLECTION).unwrap();
        store.create_or_replace(&shell("shell-1", "press")).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteDocumentStore::<Shell>::try_new(&conn, COLLECTION).unwrap();
    assert_eq!(store.retrieve("shell-1").unwrap(), shell("shell-1", "press"));
}

#[test]
fn corrupt_persisted_body_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3);",
        params![COLLECTION, "broken", "{\"idShort\": 42}"],
    )
    .unwrap();
    let store = SqliteDocumentStore::<Shell>::try_new(&conn, COLLECTION).unwrap();

    assert!(matches!(
        store.retrieve("broken").unwrap_err(),
        StoreError::InvalidData(_)
    ));
    assert!(matches!(
        store.retrieve_all().unwrap_err(),
        StoreError::InvalidData(_)
    ));
}

#[test]
fn invalid_collection_names_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let err = SqliteDocumentStore::<Shell>::try_new(&conn, "bad name")
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::InvalidCollectionName(_)));

    let err = MemoryDocumentStore::<Shell>::try_new(MemoryBackend::new(), "")
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::InvalidCollectionName(_)));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteDocumentStore::<Shell>::try_new(&conn, COLLECTION)
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn dropped_table_surfaces_as_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shells.sqlite3");
    let conn = open_db(&path).unwrap();
    let store = SqliteDocumentStore::<Shell>::try_new(&conn, COLLECTION).unwrap();
    conn.execute_batch("DROP TABLE documents;").unwrap();

    let err = store.retrieve("shell-1").unwrap_err();
    assert!(err.is_unavailable());
}
