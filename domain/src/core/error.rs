//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These carry the collaborator-facing rejection taxonomy: every variant
/// except [`DomainError::CorruptState`] maps 1:1 to a reason a lifecycle
/// request can be refused without mutating any state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email not registered: {0}")]
    Unauthorized(String),

    #[error("Not accepting answers right now")]
    NotAcceptingAnswers,

    #[error("Missing {0}")]
    MissingInput(&'static str),

    #[error("No active task")]
    NoActiveTask,

    #[error("Corrupt session state: {0}")]
    CorruptState(String),
}

impl DomainError {
    /// True for rejections the submitting collaborator caused and can fix.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, DomainError::CorruptState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_accepting_display() {
        let error = DomainError::NotAcceptingAnswers;
        assert_eq!(error.to_string(), "Not accepting answers right now");
    }

    #[test]
    fn test_missing_input_display() {
        assert_eq!(DomainError::MissingInput("answer").to_string(), "Missing answer");
    }

    #[test]
    fn test_is_rejection() {
        assert!(DomainError::Unauthorized("x@y.z".into()).is_rejection());
        assert!(DomainError::NotAcceptingAnswers.is_rejection());
        assert!(!DomainError::CorruptState("bad version".into()).is_rejection());
    }
}
