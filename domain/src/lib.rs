//! Domain layer for roundtable
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Round
//!
//! A round is one turn of the refinement loop: the facilitator publishes a
//! blocking question, every collaborator on the roster answers it, and the
//! answers are consolidated into the next version of the specification
//! document.
//!
//! ## Session
//!
//! The [`session::entities::Session`] aggregate owns the whole loop state:
//! the roster, the current task, the collected answers, the document version
//! counter, and the archive of completed rounds. All state transitions go
//! through its methods so the invariants hold at every step.
//!
//! ## Open Topics
//!
//! Consolidation is non-destructive. Material that cannot be integrated with
//! confidence is tracked under an `## Open Topics` section with `[UNRESOLVED]`
//! markers instead of being dropped, and later rounds are steered toward
//! resolving those entries first.

pub mod core;
pub mod fallback;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use core::{email::Email, error::DomainError, version::DocumentVersion};
pub use prompt::PromptTemplate;
pub use session::{
    entities::{Answer, AnswerOutcome, ArchivedTask, Collaborator, Session, Task, TaskId},
    snapshot::{SessionSnapshot, SnapshotBody, SnapshotStatus},
    status::SessionStatus,
};
