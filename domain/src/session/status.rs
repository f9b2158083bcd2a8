//! Session lifecycle status

use serde::{Deserialize, Serialize};

/// Phase of the refinement loop a session is in (exactly one at a time)
///
/// The cycle is `LlmQuestion -> HumanInput -> LlmUpdate -> LlmQuestion -> ...`
/// with no terminal state while the session lives. The serialized form is the
/// durable wire vocabulary (`LLM_QUESTION` etc.) that state files and the
/// query surface use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// The facilitator is producing the next blocking question.
    #[serde(rename = "LLM_QUESTION")]
    LlmQuestion,
    /// A question is published; collaborator answers are being collected.
    #[serde(rename = "HUMAN_INPUT")]
    HumanInput,
    /// All answers are in; the facilitator is consolidating them.
    #[serde(rename = "LLM_UPDATE")]
    LlmUpdate,
}

impl SessionStatus {
    /// Submissions are only accepted while collecting human input.
    pub fn accepts_answers(self) -> bool {
        matches!(self, SessionStatus::HumanInput)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::LlmQuestion => "LLM_QUESTION",
            SessionStatus::HumanInput => "HUMAN_INPUT",
            SessionStatus::LlmUpdate => "LLM_UPDATE",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_form() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::LlmQuestion).unwrap(),
            "\"LLM_QUESTION\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::HumanInput).unwrap(),
            "\"HUMAN_INPUT\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::LlmUpdate).unwrap(),
            "\"LLM_UPDATE\""
        );
    }

    #[test]
    fn test_round_trip() {
        let status: SessionStatus = serde_json::from_str("\"HUMAN_INPUT\"").unwrap();
        assert_eq!(status, SessionStatus::HumanInput);
    }

    #[test]
    fn test_only_human_input_accepts_answers() {
        assert!(SessionStatus::HumanInput.accepts_answers());
        assert!(!SessionStatus::LlmQuestion.accepts_answers());
        assert!(!SessionStatus::LlmUpdate.accepts_answers());
    }
}
