//! Atomic file writes
//!
//! All durable records go through one write path: serialize to a temp file
//! in the same directory, fsync, rename over the live file. A reader never
//! observes a half-written record, and a crash mid-write leaves the previous
//! record intact.

use roundtable_application::StoreError;
use std::path::Path;
use tokio::io::AsyncWriteExt;

pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
    }
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("record.json");

        write_atomic(&path, b"{\"a\":1}").await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "{\"a\":1}");
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");

        write_atomic(&path, b"old").await.unwrap();
        write_atomic(&path, b"new").await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "new");
    }
}
