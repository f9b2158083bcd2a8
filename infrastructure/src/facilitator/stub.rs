//! Deterministic facilitator for offline runs
//!
//! Serves the domain's fallback texts directly: a fixed Open-Topics-framed
//! question and the naive non-destructive merge. Used when `offline` is
//! configured or no API key is present, and as the substitute output of the
//! failover decorator.

use async_trait::async_trait;
use roundtable_application::{FacilitatorError, FacilitatorGateway};
use roundtable_domain::{Answer, Email, fallback};

pub struct StubFacilitator;

#[async_trait]
impl FacilitatorGateway for StubFacilitator {
    async fn generate_question(
        &self,
        _app_description: &str,
        _current_document: &str,
    ) -> Result<String, FacilitatorError> {
        Ok(fallback::question().to_string())
    }

    async fn merge_answers(
        &self,
        _app_description: &str,
        current_document: &str,
        answers: &[(Email, Answer)],
    ) -> Result<String, FacilitatorError> {
        Ok(fallback::merge(current_document, answers))
    }
}
