//! Persistence ports
//!
//! Two narrow stores back the refinement loop: the session record and the
//! versioned document snapshots. Writes must be durable before they return;
//! a reader never observes a half-written record. File-backed adapters live
//! in the infrastructure layer, in-memory doubles next to the controller
//! tests.

use async_trait::async_trait;
use roundtable_domain::{DocumentVersion, Session};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Durable home of the single session record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session. `Ok(None)` when no session has ever been created,
    /// and also when the stored record is corrupt or fails validation;
    /// adapters log the problem and let a fresh create proceed.
    async fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Persist the session. The write is atomic: once this returns, the
    /// durable record is the given session in full.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove the durable record. Removing an absent record is not an error.
    async fn delete(&self) -> Result<(), StoreError>;
}

/// Durable home of the versioned document snapshots.
///
/// Version monotonicity is the caller's obligation; the store itself accepts
/// any write and keeps every version immutable once superseded.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document at `version`. A version that was never written
    /// reads as the empty string, never as an error.
    async fn read(&self, version: DocumentVersion) -> Result<String, StoreError>;

    /// Create or overwrite the document at `version`.
    async fn write(&self, version: DocumentVersion, content: &str) -> Result<(), StoreError>;

    /// Remove every stored version (reset path).
    async fn delete_all(&self) -> Result<(), StoreError>;
}
