//! Session domain entities
//!
//! [`Session`] is the aggregate the whole refinement loop revolves around:
//! one live instance (or none), advanced round by round. Every mutation of
//! the loop's state is a method on the aggregate so the invariants (one
//! answer per collaborator per task, at most one live answer entry,
//! version strictly +1 per completed round) live in exactly one place.
//! Durability is the caller's concern; these methods are pure in-memory.

use crate::core::email::Email;
use crate::core::error::DomainError;
use crate::core::version::DocumentVersion;
use crate::session::status::SessionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Opaque unique identifier of one round's task (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Mint a fresh id for a new round.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One collaborator in the fixed roster (Entity)
///
/// `answered_current` is display state derived from the live answers map and
/// reset at each new round; presence in the answers map is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub email: Email,
    pub answered_current: bool,
}

impl Collaborator {
    pub fn new(email: Email) -> Self {
        Self {
            email,
            answered_current: false,
        }
    }
}

/// The blocking question of one round (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub question: String,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(question: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::generate(),
            question: question.into(),
            created_at,
        }
    }
}

/// A collaborator's answer to one task (Value Object)
///
/// Immutable once written: resubmission by the same collaborator for the
/// same task is a no-op, never an overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer: String,
    pub submitted_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(answer: impl Into<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            answer: answer.into(),
            submitted_at,
        }
    }
}

/// Permanent record of a completed round (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedTask {
    pub id: TaskId,
    pub question: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Snapshot of the live answers at the moment the round completed.
    pub answers: BTreeMap<Email, Answer>,
}

/// Outcome of recording an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The answer was stored. `all_answered` is true exactly when this
    /// submission completed the roster for the current task.
    Recorded { all_answered: bool },
    /// The collaborator already had an answer for this task; nothing changed.
    Duplicate,
}

/// The singleton refinement session (Aggregate Root)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    app_description: String,
    collaborators: Vec<Collaborator>,
    status: SessionStatus,
    version: DocumentVersion,
    current_task: Option<Task>,
    /// Live answers, keyed by task id. At most one entry (the current task);
    /// completed tasks move their answers into `task_history`.
    answers: BTreeMap<TaskId, BTreeMap<Email, Answer>>,
    task_history: Vec<ArchivedTask>,
}

impl Session {
    /// Create a fresh session at version 1 (empty document), ready for the
    /// first question-generation phase.
    ///
    /// Emails are normalized (trimmed, lowercased), blanks dropped and
    /// duplicates collapsed to their first occurrence, preserving order.
    pub fn create(description: &str, emails: &[String]) -> Result<Self, DomainError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(DomainError::InvalidInput("missing description".to_string()));
        }

        let mut seen = BTreeSet::new();
        let collaborators: Vec<Collaborator> = emails
            .iter()
            .filter_map(|raw| Email::try_new(raw.as_str()))
            .filter(|email| seen.insert(email.clone()))
            .map(Collaborator::new)
            .collect();

        if collaborators.is_empty() {
            return Err(DomainError::InvalidInput(
                "no collaborator emails".to_string(),
            ));
        }

        Ok(Self {
            app_description: description.to_string(),
            collaborators,
            status: SessionStatus::LlmQuestion,
            version: DocumentVersion::FIRST,
            current_task: None,
            answers: BTreeMap::new(),
            task_history: Vec::new(),
        })
    }

    pub fn app_description(&self) -> &str {
        &self.app_description
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn version(&self) -> DocumentVersion {
        self.version
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn collaborators(&self) -> &[Collaborator] {
        &self.collaborators
    }

    pub fn task_history(&self) -> &[ArchivedTask] {
        &self.task_history
    }

    /// Full answers map in its durable shape (at most one live entry).
    pub fn answers(&self) -> &BTreeMap<TaskId, BTreeMap<Email, Answer>> {
        &self.answers
    }

    /// Answers recorded so far for the current task, if any.
    pub fn live_answers(&self) -> Option<&BTreeMap<Email, Answer>> {
        let task = self.current_task.as_ref()?;
        self.answers.get(&task.id)
    }

    /// Live answers in roster order, the deterministic view consolidation
    /// consumes.
    pub fn ordered_live_answers(&self) -> Vec<(Email, Answer)> {
        let Some(live) = self.live_answers() else {
            return Vec::new();
        };
        self.collaborators
            .iter()
            .filter_map(|c| live.get(&c.email).map(|a| (c.email.clone(), a.clone())))
            .collect()
    }

    /// True when every roster member has a live answer for the current task.
    pub fn all_answered(&self) -> bool {
        match self.live_answers() {
            Some(live) => self
                .collaborators
                .iter()
                .all(|c| live.contains_key(&c.email)),
            None => false,
        }
    }

    /// Install a fresh task for the next round: new id, cleared answered
    /// flags, answers collected from a blank slate, status `HumanInput`.
    pub fn publish_task(&mut self, question: impl Into<String>, now: DateTime<Utc>) -> &Task {
        let task = Task::new(question, now);
        for collaborator in &mut self.collaborators {
            collaborator.answered_current = false;
        }
        self.status = SessionStatus::HumanInput;
        self.current_task.insert(task)
    }

    /// Record one collaborator's answer for the current task.
    ///
    /// Rejections follow the submission taxonomy: unknown email, wrong
    /// phase / no task, empty text. A repeat submission by a collaborator
    /// who already answered is reported as [`AnswerOutcome::Duplicate`]
    /// and leaves the stored answer untouched.
    pub fn record_answer(
        &mut self,
        email: &Email,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, DomainError> {
        if !self.collaborators.iter().any(|c| &c.email == email) {
            return Err(DomainError::Unauthorized(email.to_string()));
        }
        if !self.status.accepts_answers() {
            return Err(DomainError::NotAcceptingAnswers);
        }
        let Some(task) = self.current_task.as_ref() else {
            return Err(DomainError::NotAcceptingAnswers);
        };
        if text.trim().is_empty() {
            return Err(DomainError::MissingInput("answer"));
        }

        let task_id = task.id.clone();
        let live = self.answers.entry(task_id).or_default();
        if live.contains_key(email) {
            return Ok(AnswerOutcome::Duplicate);
        }
        live.insert(email.clone(), Answer::new(text, now));

        if let Some(collaborator) = self.collaborators.iter_mut().find(|c| &c.email == email) {
            collaborator.answered_current = true;
        }

        Ok(AnswerOutcome::Recorded {
            all_answered: self.all_answered(),
        })
    }

    /// Flip to `LlmUpdate`, the gate that rejects any further submission for
    /// this task. Persisting the session right after this call is what makes
    /// double-firing of consolidation impossible.
    pub fn begin_consolidation(&mut self) -> Result<(), DomainError> {
        if self.current_task.is_none() {
            return Err(DomainError::NoActiveTask);
        }
        self.status = SessionStatus::LlmUpdate;
        Ok(())
    }

    /// Close the current round after the merged document has been produced:
    /// bump the version, archive the task with its answer snapshot, drop the
    /// live answers entry and return to `LlmQuestion` for the next round.
    ///
    /// The caller persists the returned state in a single atomic write, so a
    /// durable `LlmUpdate` status always means "answers still live, version
    /// not yet bumped", the property restart recovery relies on.
    pub fn complete_round(
        &mut self,
        completed_at: DateTime<Utc>,
    ) -> Result<ArchivedTask, DomainError> {
        let task = self.current_task.clone().ok_or(DomainError::NoActiveTask)?;
        let answers = self.answers.remove(&task.id).unwrap_or_default();

        self.version = self.version.next();
        let archived = ArchivedTask {
            id: task.id,
            question: task.question,
            created_at: task.created_at,
            completed_at,
            answers,
        };
        self.task_history.push(archived.clone());
        self.status = SessionStatus::LlmQuestion;

        Ok(archived)
    }

    /// Shape check applied when loading a durable snapshot. Violations are
    /// recoverable: the loader treats them as "no session".
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.app_description.trim().is_empty() {
            return Err(DomainError::CorruptState("empty description".to_string()));
        }
        if self.collaborators.is_empty() {
            return Err(DomainError::CorruptState("empty roster".to_string()));
        }
        let mut seen = BTreeSet::new();
        for collaborator in &self.collaborators {
            let raw = collaborator.email.as_str();
            if raw.trim().to_lowercase() != raw {
                return Err(DomainError::CorruptState(format!(
                    "email not normalized: {raw}"
                )));
            }
            if !seen.insert(raw) {
                return Err(DomainError::CorruptState(format!("duplicate email: {raw}")));
            }
        }
        if !self.version.is_valid() {
            return Err(DomainError::CorruptState(format!(
                "version {} out of range",
                self.version
            )));
        }
        if self.answers.len() > 1 {
            return Err(DomainError::CorruptState(
                "more than one live answer entry".to_string(),
            ));
        }
        if let Some(task_id) = self.answers.keys().next() {
            match self.current_task.as_ref() {
                Some(task) if &task.id == task_id => {}
                _ => {
                    return Err(DomainError::CorruptState(
                        "live answers for a task that is not current".to_string(),
                    ));
                }
            }
        }
        if self.status == SessionStatus::HumanInput && self.current_task.is_none() {
            return Err(DomainError::CorruptState(
                "collecting answers without a task".to_string(),
            ));
        }
        Ok(())
    }
}
