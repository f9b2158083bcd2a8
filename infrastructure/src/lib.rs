//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod facilitator;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig, FileFacilitatorConfig, FileStorageConfig};
pub use facilitator::{DEFAULT_MODEL, FailoverFacilitator, OpenAiFacilitator, StubFacilitator};
pub use logging::JsonlRoundLogger;
pub use store::{FileDocumentStore, FileSessionStore};
