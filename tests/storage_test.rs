//! Document store tests against a temporary directory.
//!
//! Run with: `cargo test --test storage_test`
use uuid::Uuid;

use contractor_backend::error::AppError;
use contractor_backend::storage::{DocumentStore, UploadedDocument, document_name};

fn upload(name: &str, body: &str) -> UploadedDocument {
    UploadedDocument {
        file_name: name.to_string(),
        bytes: body.as_bytes().to_vec(),
    }
}

#[tokio::test]
async fn test_store_list_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path(), "/storage/");
    let contractor = Uuid::new_v4();

    let first = store.store(contractor, &upload("contract.pdf", "pdf")).await.unwrap();
    let second = store.store(contractor, &upload("contract.pdf", "again")).await.unwrap();

    assert_ne!(first.id, second.id);
    assert!(first.id.ends_with("_contract.pdf"));
    assert_eq!(
        first.url,
        format!("/storage/contratistas/{contractor}/{}", first.id)
    );

    let listed = store.list(contractor).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.windows(2).all(|w| w[0].id <= w[1].id));

    let on_disk = dir
        .path()
        .join("contratistas")
        .join(contractor.to_string())
        .join(&first.id);
    assert_eq!(std::fs::read_to_string(on_disk).unwrap(), "pdf");

    assert!(store.delete(contractor, &first.id).await.unwrap());
    assert!(!store.delete(contractor, &first.id).await.unwrap());
    assert_eq!(store.list(contractor).await.unwrap().len(), 1);

    store.delete_all(contractor).await.unwrap();
    assert!(store.list(contractor).await.unwrap().is_empty());
    // Removing an absent directory is fine.
    store.delete_all(contractor).await.unwrap();
}

#[tokio::test]
async fn test_client_paths_are_stripped() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path(), "/storage");
    let contractor = Uuid::new_v4();

    let stored = store
        .store(contractor, &upload(r"C:\Users\me\invoice.pdf", "x"))
        .await
        .unwrap();
    assert!(stored.id.ends_with("_invoice.pdf"));
    assert!(!stored.id.contains('\\'));
}

#[tokio::test]
async fn test_unknown_contractor_has_no_documents() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path(), "/storage");

    assert!(store.list(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_traversal_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path(), "/storage");

    let result = store.delete(Uuid::new_v4(), "../secrets.txt").await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    for bad in ["", ".", "..", "a/b", r"a\b", "nul\0"] {
        assert!(document_name(bad).is_err(), "{bad:?} should be rejected");
    }
    assert_eq!(document_name("report.pdf").unwrap(), "report.pdf");
}
