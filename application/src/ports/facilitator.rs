//! Facilitator gateway port
//!
//! Defines the interface to the text-generation service driving the loop:
//! one call produces the round's question, the other consolidates the
//! collected answers into the next document version. Implementations
//! (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use roundtable_domain::{Answer, Email};
use thiserror::Error;

/// Errors that can occur during facilitator gateway operations
#[derive(Error, Debug)]
pub enum FacilitatorError {
    #[error("Facilitator unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Gateway for the two facilitator calls of a round.
///
/// `answers` is the roster-ordered view of the completed round, so the
/// merged document attributes each answer deterministically.
#[async_trait]
pub trait FacilitatorGateway: Send + Sync {
    /// Produce the single most blocking question about the current document.
    async fn generate_question(
        &self,
        app_description: &str,
        current_document: &str,
    ) -> Result<String, FacilitatorError>;

    /// Consolidate the round's answers into the full next document text.
    async fn merge_answers(
        &self,
        app_description: &str,
        current_document: &str,
        answers: &[(Email, Answer)],
    ) -> Result<String, FacilitatorError>;
}
