//! Read-only session view for the state query surface
//!
//! Callers poll this snapshot to observe progress; it is the only thing the
//! outside world ever sees of the session. The serialized shape is the wire
//! form: a bare `{"status":"NO_SESSION"}` object when nothing exists, the
//! flattened body otherwise.

use crate::core::email::Email;
use crate::core::version::DocumentVersion;
use crate::session::entities::{Answer, ArchivedTask, Collaborator, Session, Task, TaskId};
use crate::session::status::SessionStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status vocabulary of the query surface: the three live phases plus the
/// pre-creation / post-reset state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotStatus {
    #[serde(rename = "NO_SESSION")]
    NoSession,
    #[serde(rename = "LLM_QUESTION")]
    LlmQuestion,
    #[serde(rename = "HUMAN_INPUT")]
    HumanInput,
    #[serde(rename = "LLM_UPDATE")]
    LlmUpdate,
}

impl From<SessionStatus> for SnapshotStatus {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::LlmQuestion => SnapshotStatus::LlmQuestion,
            SessionStatus::HumanInput => SnapshotStatus::HumanInput,
            SessionStatus::LlmUpdate => SnapshotStatus::LlmUpdate,
        }
    }
}

impl SnapshotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotStatus::NoSession => "NO_SESSION",
            SnapshotStatus::LlmQuestion => "LLM_QUESTION",
            SnapshotStatus::HumanInput => "HUMAN_INPUT",
            SnapshotStatus::LlmUpdate => "LLM_UPDATE",
        }
    }
}

impl std::fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a live session exposes, document text included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotBody {
    pub version: DocumentVersion,
    pub current_task: Option<Task>,
    pub collaborators: Vec<Collaborator>,
    pub answers: BTreeMap<TaskId, BTreeMap<Email, Answer>>,
    pub task_history: Vec<ArchivedTask>,
    /// Document text at `version`.
    pub document: String,
}

/// One observation of the session state (Value Object)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SnapshotStatus,
    #[serde(flatten)]
    pub body: Option<SnapshotBody>,
}

impl SessionSnapshot {
    /// The snapshot of "no session exists".
    pub fn none() -> Self {
        Self {
            status: SnapshotStatus::NoSession,
            body: None,
        }
    }

    /// Snapshot a live session together with its current document text.
    pub fn active(session: &Session, document: String) -> Self {
        Self {
            status: session.status().into(),
            body: Some(SnapshotBody {
                version: session.version(),
                current_task: session.current_task().cloned(),
                collaborators: session.collaborators().to_vec(),
                answers: session.answers().clone(),
                task_history: session.task_history().to_vec(),
                document,
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        self.body.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_no_session_wire_form() {
        let json = serde_json::to_value(SessionSnapshot::none()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "NO_SESSION" }));
    }

    #[test]
    fn test_active_snapshot_carries_full_state() {
        let mut session = Session::create(
            "Todo app",
            &["a@x.com".to_string(), "b@x.com".to_string()],
        )
        .unwrap();
        session.publish_task("Q1", Utc::now());
        session
            .record_answer(&Email::new("a@x.com"), "A", Utc::now())
            .unwrap();

        let snapshot = SessionSnapshot::active(&session, "# Doc".to_string());
        assert!(snapshot.is_active());
        assert_eq!(snapshot.status, SnapshotStatus::HumanInput);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "HUMAN_INPUT");
        assert_eq!(json["version"], 1);
        assert_eq!(json["document"], "# Doc");
        assert_eq!(json["collaborators"].as_array().unwrap().len(), 2);
        let task_id = session.current_task().unwrap().id.as_str();
        assert!(json["answers"][task_id]["a@x.com"].is_object());
    }

    #[test]
    fn test_snapshot_round_trips() {
        let session =
            Session::create("Todo app", &["a@x.com".to_string()]).unwrap();
        let snapshot = SessionSnapshot::active(&session, String::new());
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert!(back.is_active());
        assert_eq!(back.status, SnapshotStatus::LlmQuestion);
        assert_eq!(back.body.unwrap().version, DocumentVersion::FIRST);
    }
}
