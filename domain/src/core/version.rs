//! Document version value object

use serde::{Deserialize, Serialize};

/// Index of a document snapshot (Value Object)
///
/// Versions start at 1 and only ever grow by one per completed round. The
/// snapshot at a given version is immutable once the next version exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentVersion(u64);

impl DocumentVersion {
    /// The initial version every session starts at (an empty document).
    pub const FIRST: DocumentVersion = DocumentVersion(1);

    /// Wrap a raw version number. Validity (>= 1) is checked on session load,
    /// not here, so corrupt snapshots surface as recoverable errors.
    pub fn new(version: u64) -> Self {
        Self(version)
    }

    /// The version produced by the next completed round.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 >= 1
    }
}

impl std::fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
