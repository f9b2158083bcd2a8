//! Durable store adapters
//!
//! File-backed implementations of the session and document store ports.
//! Every write goes through the atomic temp-file + fsync + rename path.

mod atomic;
mod document_file;
mod session_file;

pub use document_file::FileDocumentStore;
pub use session_file::FileSessionStore;
