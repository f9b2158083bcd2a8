//! File-backed session store
//!
//! Persists the singleton session as pretty-printed JSON at
//! `<data_dir>/state.json`. Loading is forgiving: a missing, unparseable or
//! invalid record reads as "no session" so a fresh create can always
//! proceed. Saving is strict and atomic.

use crate::store::atomic::write_atomic;
use async_trait::async_trait;
use roundtable_application::{SessionStore, StoreError};
use roundtable_domain::Session;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("state.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    "Unreadable session record at {}, treating as no session: {e}",
                    self.path.display()
                );
                return Ok(None);
            }
        };
        if let Err(e) = session.validate() {
            warn!(
                "Invalid session record at {}, treating as no session: {e}",
                self.path.display()
            );
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        write_atomic(&self.path, json.as_bytes()).await
    }

    async fn delete(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
