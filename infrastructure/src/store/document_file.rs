//! File-backed document store
//!
//! One markdown file per version at `<data_dir>/documents/document_<v>.md`.
//! Versions that were never written read as the empty string. `delete_all`
//! removes every snapshot matching the `document_*.md` naming scheme and
//! leaves anything else in the directory alone.

use crate::store::atomic::write_atomic;
use async_trait::async_trait;
use roundtable_application::{DocumentStore, StoreError};
use roundtable_domain::DocumentVersion;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct FileDocumentStore {
    dir: PathBuf,
}

impl FileDocumentStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("documents"),
        }
    }

    fn version_path(&self, version: DocumentVersion) -> PathBuf {
        self.dir.join(format!("document_{version}.md"))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn read(&self, version: DocumentVersion) -> Result<String, StoreError> {
        match tokio::fs::read_to_string(self.version_path(version)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, version: DocumentVersion, content: &str) -> Result<(), StoreError> {
        write_atomic(&self.version_path(version), content.as_bytes()).await
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with("document_") && name.ends_with(".md") {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        Ok(())
    }
}
