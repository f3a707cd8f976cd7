use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;

const CONTRACTORS_DIR: &str = "contratistas";

/// A file received with a contractor create/update request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A stored contractor document, as listed by `GET /api/contratistas/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredDocument {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub url: String,
    #[serde(rename = "fecha")]
    pub modified_at: DateTime<Utc>,
}

/// Local-filesystem store for contractor documents.
///
/// Files live under `<root>/contratistas/<contractor_id>/` and are served
/// read-only under `<public_path>/contratistas/<contractor_id>/`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    public_path: String,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        let public_path = public_path.into();
        Self {
            root: root.into(),
            public_path: public_path.trim_end_matches('/').to_string(),
        }
    }

    fn contractor_dir(&self, contractor_id: Uuid) -> PathBuf {
        self.root
            .join(CONTRACTORS_DIR)
            .join(contractor_id.to_string())
    }

    fn url_for(&self, contractor_id: Uuid, file_name: &str) -> String {
        format!(
            "{}/{CONTRACTORS_DIR}/{contractor_id}/{file_name}",
            self.public_path
        )
    }

    /// Write one upload. The stored name gets a random prefix so repeated
    /// uploads of the same file never overwrite each other.
    pub async fn store(
        &self,
        contractor_id: Uuid,
        document: &UploadedDocument,
    ) -> Result<StoredDocument, AppError> {
        // Browsers may send a full client-side path.
        let original = document
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();
        let original = document_name(original)?;
        let file_name = format!("{}_{original}", Uuid::new_v4().simple());

        let dir = self.contractor_dir(contractor_id);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &document.bytes).await?;
        debug!(%contractor_id, file = %file_name, bytes = document.bytes.len(), "Stored document");

        let modified_at = modified_at(&path).await?;
        Ok(StoredDocument {
            id: file_name.clone(),
            url: self.url_for(contractor_id, &file_name),
            name: file_name,
            modified_at,
        })
    }

    /// List a contractor's documents sorted by name. A contractor without a
    /// directory simply has no documents.
    pub async fn list(&self, contractor_id: Uuid) -> Result<Vec<StoredDocument>, AppError> {
        let dir = self.contractor_dir(contractor_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let modified_at = modified_at(&entry.path()).await?;
            documents.push(StoredDocument {
                id: file_name.clone(),
                url: self.url_for(contractor_id, &file_name),
                name: file_name,
                modified_at,
            });
        }
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }

    /// Delete one document. Returns `false` when it does not exist.
    pub async fn delete(&self, contractor_id: Uuid, document_id: &str) -> Result<bool, AppError> {
        let document_id = document_name(document_id)?;
        let path = self.contractor_dir(contractor_id).join(document_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every document of a contractor.
    pub async fn delete_all(&self, contractor_id: Uuid) -> Result<(), AppError> {
        match tokio::fs::remove_dir_all(self.contractor_dir(contractor_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Accept a bare file name only: no separators, no `.`/`..`, no NUL.
pub fn document_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(AppError::Validation(format!(
            "Invalid document name {name:?}"
        )));
    }
    Ok(name)
}

async fn modified_at(path: &Path) -> Result<DateTime<Utc>, AppError> {
    let metadata = tokio::fs::metadata(path).await?;
    Ok(DateTime::<Utc>::from(metadata.modified()?))
}
