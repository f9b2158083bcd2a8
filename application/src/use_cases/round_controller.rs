//! Round Controller use case
//!
//! The state machine core of the refinement loop. One controller instance
//! owns the session for the lifetime of the process and drives it through
//! the cycle question generation → answer collection → consolidation →
//! next question.
//!
//! Every mutation is a read-modify-write-persist of the latest durable
//! snapshot, serialized by one process-wide lock. Facilitator calls run
//! outside the lock; while they are in flight the persisted status already
//! rejects submissions, so the lock is never held across slow I/O to the
//! text-generation service.
//!
//! Question generation and consolidation run as detached background phases:
//! the request that triggers them returns as soon as its own write is
//! durable, and callers observe progress through [`RoundController::snapshot`].
//! One-shot callers use [`RoundController::settle`] to wait the phases out.

use crate::ports::facilitator::FacilitatorGateway;
use crate::ports::round_logger::{RoundEvent, RoundLogger};
use crate::ports::store::{DocumentStore, SessionStore, StoreError};
use chrono::Utc;
use roundtable_domain::{
    AnswerOutcome, DocumentVersion, DomainError, Email, Session, SessionSnapshot, SessionStatus,
    fallback,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Errors surfaced by the Round Controller
#[derive(Error, Debug)]
pub enum RoundError {
    #[error("No active session")]
    NoSession,

    #[error("{0}")]
    Rejected(#[from] DomainError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl RoundError {
    /// True for rejections the submitting collaborator caused (bad input,
    /// wrong phase); false for internal failures.
    pub fn is_rejection(&self) -> bool {
        match self {
            RoundError::NoSession => true,
            RoundError::Rejected(e) => e.is_rejection(),
            RoundError::Persistence(_) => false,
        }
    }
}

/// Outcome of a successful answer submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// The collaborator had already answered this task; the stored answer
    /// is untouched.
    pub duplicate: bool,
    /// This submission completed the roster and consolidation has started.
    pub round_completed: bool,
}

/// Use case driving the refinement loop
pub struct RoundController {
    inner: Arc<Inner>,
    phases: Mutex<Vec<JoinHandle<()>>>,
}

/// Shared state the detached phases run against.
struct Inner {
    sessions: Arc<dyn SessionStore>,
    documents: Arc<dyn DocumentStore>,
    facilitator: Arc<dyn FacilitatorGateway>,
    logger: Arc<dyn RoundLogger>,
    /// Serializes every read-modify-write-persist sequence.
    state: Mutex<()>,
}

impl RoundController {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        documents: Arc<dyn DocumentStore>,
        facilitator: Arc<dyn FacilitatorGateway>,
        logger: Arc<dyn RoundLogger>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions,
                documents,
                facilitator,
                logger,
                state: Mutex::new(()),
            }),
            phases: Mutex::new(Vec::new()),
        }
    }

    /// Create a fresh session and kick off round 1.
    ///
    /// Returns once the empty version-1 document and the session record are
    /// durable; question generation proceeds in the background. An existing
    /// session is replaced.
    pub async fn start_session(
        &self,
        description: &str,
        emails: &[String],
    ) -> Result<SessionSnapshot, RoundError> {
        self.abort_phases().await;

        let snapshot = {
            let _guard = self.inner.state.lock().await;
            if self.inner.sessions.load().await?.is_some() {
                warn!("A session already exists, starting over");
            }
            let session = Session::create(description, emails)?;
            self.inner
                .documents
                .write(DocumentVersion::FIRST, "")
                .await?;
            self.inner.sessions.save(&session).await?;
            self.inner.logger.log(RoundEvent::new(
                "session_started",
                json!({
                    "description": session.app_description(),
                    "collaborators": session
                        .collaborators()
                        .iter()
                        .map(|c| c.email.as_str())
                        .collect::<Vec<_>>(),
                }),
            ));
            info!(
                collaborators = session.collaborators().len(),
                "Session started"
            );
            SessionSnapshot::active(&session, String::new())
        };

        self.spawn_phase(Inner::question_phase(Arc::clone(&self.inner)))
            .await;
        Ok(snapshot)
    }

    /// Record one collaborator's answer for the current task.
    ///
    /// The receipt is returned as soon as the answer is durable. When this
    /// submission completes the roster, the status flips to `LlmUpdate` in
    /// the same critical section (late submissions are rejected from that
    /// point on) and consolidation runs in the background.
    pub async fn submit_answer(
        &self,
        email: &str,
        answer: &str,
    ) -> Result<SubmitReceipt, RoundError> {
        let Some(email) = Email::try_new(email) else {
            return Err(DomainError::MissingInput("email").into());
        };

        let round_completed = {
            let _guard = self.inner.state.lock().await;
            let mut session = self
                .inner
                .sessions
                .load()
                .await?
                .ok_or(RoundError::NoSession)?;

            match session.record_answer(&email, answer, Utc::now())? {
                AnswerOutcome::Duplicate => {
                    debug!(%email, "Repeat submission, keeping the stored answer");
                    return Ok(SubmitReceipt {
                        duplicate: true,
                        round_completed: false,
                    });
                }
                AnswerOutcome::Recorded { all_answered } => {
                    self.inner.sessions.save(&session).await?;
                    self.inner.logger.log(RoundEvent::new(
                        "answer_submitted",
                        json!({
                            "email": email.as_str(),
                            "taskId": session.current_task().map(|t| t.id.clone()),
                        }),
                    ));
                    info!(%email, all_answered, "Answer recorded");

                    if all_answered {
                        session.begin_consolidation()?;
                        self.inner.sessions.save(&session).await?;
                        info!("All collaborators answered, consolidation starting");
                    }
                    all_answered
                }
            }
        };

        if round_completed {
            self.spawn_phase(Inner::consolidation_phase(Arc::clone(&self.inner)))
                .await;
        }
        Ok(SubmitReceipt {
            duplicate: false,
            round_completed,
        })
    }

    /// Read-only view of the current state, document text included.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, RoundError> {
        let _guard = self.inner.state.lock().await;
        let Some(session) = self.inner.sessions.load().await? else {
            return Ok(SessionSnapshot::none());
        };
        let document = self.inner.documents.read(session.version()).await?;
        Ok(SessionSnapshot::active(&session, document))
    }

    /// Hard wipe: delete the session record and every document version.
    ///
    /// Unconditional and irreversible. An in-flight background phase
    /// notices the missing session and discards its work.
    pub async fn reset(&self) -> Result<(), RoundError> {
        self.abort_phases().await;

        let _guard = self.inner.state.lock().await;
        self.inner.sessions.delete().await?;
        self.inner.documents.delete_all().await?;
        self.inner
            .logger
            .log(RoundEvent::new("session_reset", json!({})));
        info!("Session reset, all state removed");
        Ok(())
    }

    /// Restart recovery: re-run whichever background phase the durable
    /// status says was interrupted.
    ///
    /// `LlmQuestion` re-runs question generation. `LlmUpdate` re-runs
    /// consolidation, which is safe to repeat: the version bump and archive
    /// persist in one atomic save, so an interrupted run left at most a
    /// document file the session never started referencing. `HumanInput`
    /// needs nothing; the session is waiting for answers.
    pub async fn resume(&self) -> Result<(), RoundError> {
        let status = {
            let _guard = self.inner.state.lock().await;
            match self.inner.sessions.load().await? {
                Some(session) => session.status(),
                None => return Ok(()),
            }
        };

        match status {
            SessionStatus::LlmQuestion => {
                info!("Resuming interrupted question generation");
                self.spawn_phase(Inner::question_phase(Arc::clone(&self.inner)))
                    .await;
            }
            SessionStatus::LlmUpdate => {
                info!("Resuming interrupted consolidation");
                self.spawn_phase(Inner::consolidation_phase(Arc::clone(&self.inner)))
                    .await;
            }
            SessionStatus::HumanInput => {
                debug!("Session is collecting answers, nothing to resume");
            }
        }
        Ok(())
    }

    /// Wait for the in-flight background phases to finish.
    ///
    /// One-shot callers use this before exiting so question generation and
    /// consolidation complete inside the process. Long-lived callers never
    /// need it; progression is driven by the phases themselves.
    pub async fn settle(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut phases = self.phases.lock().await;
                std::mem::take(&mut *phases)
            };
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        warn!("Background phase panicked: {e}");
                    }
                }
            }
        }
    }

    async fn spawn_phase(&self, phase: impl Future<Output = ()> + Send + 'static) {
        let handle = tokio::spawn(phase);
        let mut phases = self.phases.lock().await;
        phases.retain(|h| !h.is_finished());
        phases.push(handle);
    }

    /// Stop tracked phases before the state they run against is replaced.
    /// Phase writes are atomic saves, so cancellation never leaves a torn
    /// record.
    async fn abort_phases(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut phases = self.phases.lock().await;
            std::mem::take(&mut *phases)
        };
        for handle in handles {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Inner {
    /// Question-generation phase: `LlmQuestion` → `HumanInput`.
    ///
    /// Reads the document at the current version, asks the facilitator for
    /// the next blocking question and publishes it as a fresh task. A
    /// gateway error substitutes the deterministic fallback question, so
    /// the phase only ever stops early on a store failure or when the
    /// session was replaced or reset underneath it.
    async fn question_phase(self: Arc<Self>) {
        let (description, version) = {
            let _guard = self.state.lock().await;
            match self.sessions.load().await {
                Ok(Some(session)) if session.status() == SessionStatus::LlmQuestion => (
                    session.app_description().to_string(),
                    session.version(),
                ),
                Ok(_) => {
                    debug!("No session awaiting a question, discarding phase");
                    return;
                }
                Err(e) => {
                    error!("Question phase could not load the session: {e}");
                    return;
                }
            }
        };

        let document = match self.documents.read(version).await {
            Ok(document) => document,
            Err(e) => {
                error!("Question phase could not read document v{version}: {e}");
                return;
            }
        };

        let question = match self
            .facilitator
            .generate_question(&description, &document)
            .await
        {
            Ok(question) => question,
            Err(e) => {
                warn!("Question generation failed ({e}), substituting the fallback question");
                fallback::question().to_string()
            }
        };

        let _guard = self.state.lock().await;
        let mut session = match self.sessions.load().await {
            Ok(Some(session)) if session.status() == SessionStatus::LlmQuestion => session,
            Ok(_) => {
                debug!("Session changed while generating the question, discarding phase");
                return;
            }
            Err(e) => {
                error!("Question phase could not reload the session: {e}");
                return;
            }
        };

        let task = session.publish_task(question, Utc::now());
        let (task_id, question_text) = (task.id.clone(), task.question.clone());
        if let Err(e) = self.sessions.save(&session).await {
            error!("Question phase could not persist the new task: {e}");
            return;
        }
        self.logger.log(RoundEvent::new(
            "question_generated",
            json!({
                "taskId": task_id,
                "question": question_text,
                "version": session.version(),
            }),
        ));
        info!(%task_id, "Question published, collecting answers");
    }

    /// Consolidation phase: `LlmUpdate` → archived round → next question.
    ///
    /// Entered with the `LlmUpdate` flip already durable, so no submission
    /// can slip in while the merge is in flight. The merged text is written
    /// as the next version, then the version bump, archive entry and return
    /// to `LlmQuestion` persist in one atomic save. Ends by chaining
    /// straight into question generation for the next round.
    async fn consolidation_phase(self: Arc<Self>) {
        let captured = {
            let _guard = self.state.lock().await;
            match self.sessions.load().await {
                Ok(Some(session)) if session.status() == SessionStatus::LlmUpdate => {
                    session.current_task().map(|task| {
                        (
                            session.app_description().to_string(),
                            session.version(),
                            task.id.clone(),
                            session.ordered_live_answers(),
                        )
                    })
                }
                Ok(_) => None,
                Err(e) => {
                    error!("Consolidation could not load the session: {e}");
                    return;
                }
            }
        };
        let Some((description, version, task_id, answers)) = captured else {
            debug!("No round awaiting consolidation, discarding phase");
            return;
        };

        let document = match self.documents.read(version).await {
            Ok(document) => document,
            Err(e) => {
                error!("Consolidation could not read document v{version}: {e}");
                return;
            }
        };

        let merged = match self
            .facilitator
            .merge_answers(&description, &document, &answers)
            .await
        {
            Ok(merged) => merged,
            Err(e) => {
                warn!("Consolidation failed ({e}), substituting the fallback merge");
                fallback::merge(&document, &answers)
            }
        };

        {
            let _guard = self.state.lock().await;
            let mut session = match self.sessions.load().await {
                Ok(Some(session)) => session,
                Ok(None) => {
                    debug!("Session gone before consolidation finished, discarding phase");
                    return;
                }
                Err(e) => {
                    error!("Consolidation could not reload the session: {e}");
                    return;
                }
            };
            let still_current = session.status() == SessionStatus::LlmUpdate
                && session.current_task().is_some_and(|t| t.id == task_id);
            if !still_current {
                debug!("Round superseded before consolidation finished, discarding phase");
                return;
            }

            let next_version = session.version().next();
            if let Err(e) = self.documents.write(next_version, &merged).await {
                error!("Consolidation could not write document v{next_version}: {e}");
                return;
            }
            let archived = match session.complete_round(Utc::now()) {
                Ok(archived) => archived,
                Err(e) => {
                    error!("Consolidation could not close the round: {e}");
                    return;
                }
            };
            if let Err(e) = self.sessions.save(&session).await {
                error!("Consolidation could not persist the completed round: {e}");
                return;
            }
            self.logger.log(RoundEvent::new(
                "round_consolidated",
                json!({
                    "taskId": archived.id,
                    "version": session.version(),
                    "answers": archived.answers.len(),
                }),
            ));
            info!(version = %session.version(), "Round consolidated");
        }

        // The loop continues without external prompting.
        self.question_phase().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::facilitator::FacilitatorError;
    use async_trait::async_trait;
    use roundtable_domain::Answer;
    use std::collections::BTreeMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    #[derive(Default)]
    struct MemorySessions {
        session: StdMutex<Option<Session>>,
    }

    #[async_trait]
    impl SessionStore for MemorySessions {
        async fn load(&self) -> Result<Option<Session>, StoreError> {
            Ok(self.session.lock().unwrap().clone())
        }

        async fn save(&self, session: &Session) -> Result<(), StoreError> {
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        async fn delete(&self) -> Result<(), StoreError> {
            *self.session.lock().unwrap() = None;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryDocuments {
        documents: StdMutex<BTreeMap<DocumentVersion, String>>,
    }

    #[async_trait]
    impl DocumentStore for MemoryDocuments {
        async fn read(&self, version: DocumentVersion) -> Result<String, StoreError> {
            Ok(self
                .documents
                .lock()
                .unwrap()
                .get(&version)
                .cloned()
                .unwrap_or_default())
        }

        async fn write(&self, version: DocumentVersion, content: &str) -> Result<(), StoreError> {
            self.documents
                .lock()
                .unwrap()
                .insert(version, content.to_string());
            Ok(())
        }

        async fn delete_all(&self) -> Result<(), StoreError> {
            self.documents.lock().unwrap().clear();
            Ok(())
        }
    }

    /// Deterministic facilitator: numbered questions, recognizable merges.
    #[derive(Default)]
    struct ScriptedFacilitator {
        question_calls: AtomicUsize,
        merge_calls: AtomicUsize,
        fail: bool,
        /// Merges wait for a permit when set, so tests can hold a round
        /// open mid-consolidation.
        merge_gate: Option<Semaphore>,
    }

    impl ScriptedFacilitator {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn gated() -> Self {
            Self {
                merge_gate: Some(Semaphore::new(0)),
                ..Self::default()
            }
        }

        fn release_merge(&self) {
            if let Some(gate) = &self.merge_gate {
                gate.add_permits(1);
            }
        }
    }

    #[async_trait]
    impl FacilitatorGateway for ScriptedFacilitator {
        async fn generate_question(
            &self,
            _app_description: &str,
            _current_document: &str,
        ) -> Result<String, FacilitatorError> {
            let n = self.question_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(FacilitatorError::Unavailable("scripted outage".into()));
            }
            Ok(format!("Q{n}"))
        }

        async fn merge_answers(
            &self,
            _app_description: &str,
            current_document: &str,
            answers: &[(Email, Answer)],
        ) -> Result<String, FacilitatorError> {
            if let Some(gate) = &self.merge_gate {
                let permit = gate.acquire().await.expect("gate closed");
                permit.forget();
            }
            self.merge_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FacilitatorError::Unavailable("scripted outage".into()));
            }
            let lines = answers
                .iter()
                .map(|(email, answer)| format!("{email}={}", answer.answer))
                .collect::<Vec<_>>()
                .join(";");
            Ok(format!("{current_document}|merged[{lines}]"))
        }
    }

    /// Captures the event type sequence.
    #[derive(Default)]
    struct RecordingLogger {
        events: StdMutex<Vec<&'static str>>,
    }

    impl RoundLogger for RecordingLogger {
        fn log(&self, event: RoundEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    struct Harness {
        controller: RoundController,
        sessions: Arc<MemorySessions>,
        documents: Arc<MemoryDocuments>,
        facilitator: Arc<ScriptedFacilitator>,
        logger: Arc<RecordingLogger>,
    }

    fn harness_with(facilitator: ScriptedFacilitator) -> Harness {
        let sessions = Arc::new(MemorySessions::default());
        let documents = Arc::new(MemoryDocuments::default());
        let facilitator = Arc::new(facilitator);
        let logger = Arc::new(RecordingLogger::default());
        let controller = RoundController::new(
            Arc::clone(&sessions) as Arc<dyn SessionStore>,
            Arc::clone(&documents) as Arc<dyn DocumentStore>,
            Arc::clone(&facilitator) as Arc<dyn FacilitatorGateway>,
            Arc::clone(&logger) as Arc<dyn RoundLogger>,
        );
        Harness {
            controller,
            sessions,
            documents,
            facilitator,
            logger,
        }
    }

    fn harness() -> Harness {
        harness_with(ScriptedFacilitator::default())
    }

    fn roster() -> Vec<String> {
        vec!["a@x.com".to_string(), "b@x.com".to_string()]
    }

    async fn started(h: &Harness) {
        h.controller
            .start_session("Todo app", &roster())
            .await
            .unwrap();
        h.controller.settle().await;
    }

    #[tokio::test]
    async fn test_start_initializes_version_one_and_publishes_question() {
        let h = harness();
        let initial = h
            .controller
            .start_session("Todo app", &roster())
            .await
            .unwrap();
        assert_eq!(initial.status.as_str(), "LLM_QUESTION");

        h.controller.settle().await;
        let snap = h.controller.snapshot().await.unwrap();
        assert_eq!(snap.status.as_str(), "HUMAN_INPUT");
        let body = snap.body.unwrap();
        assert_eq!(body.version, DocumentVersion::FIRST);
        assert_eq!(body.document, "");
        assert_eq!(body.current_task.unwrap().question, "Q1");
        assert_eq!(body.collaborators.len(), 2);
        assert!(body.collaborators.iter().all(|c| !c.answered_current));
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_input() {
        let h = harness();
        let err = h.controller.start_session("  ", &roster()).await.unwrap_err();
        assert!(matches!(err, RoundError::Rejected(DomainError::InvalidInput(_))));

        let err = h
            .controller
            .start_session("Todo app", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RoundError::Rejected(DomainError::InvalidInput(_))));

        h.controller.settle().await;
        assert!(!h.controller.snapshot().await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_full_round_completes_exactly_once() {
        let h = harness();
        started(&h).await;

        let first = h
            .controller
            .submit_answer("a@x.com", "Use email login")
            .await
            .unwrap();
        assert_eq!(
            first,
            SubmitReceipt {
                duplicate: false,
                round_completed: false
            }
        );

        let second = h
            .controller
            .submit_answer("b@x.com", "Use SSO only")
            .await
            .unwrap();
        assert!(second.round_completed);

        h.controller.settle().await;
        let body = h.controller.snapshot().await.unwrap().body.unwrap();
        assert_eq!(body.version, DocumentVersion::new(2));
        assert_eq!(body.task_history.len(), 1);
        assert_eq!(
            body.document,
            "|merged[a@x.com=Use email login;b@x.com=Use SSO only]"
        );
        // Next round is already open
        assert_eq!(body.current_task.unwrap().question, "Q2");
        assert_eq!(h.facilitator.merge_calls.load(Ordering::SeqCst), 1);

        let archived = &body.task_history[0];
        assert_eq!(archived.answers.len(), 2);
        assert_eq!(
            archived.answers[&Email::new("a@x.com")].answer,
            "Use email login"
        );
    }

    #[tokio::test]
    async fn test_duplicate_submission_keeps_first_answer() {
        let h = harness();
        started(&h).await;

        h.controller
            .submit_answer("a@x.com", "first")
            .await
            .unwrap();
        let receipt = h
            .controller
            .submit_answer("a@x.com", "second")
            .await
            .unwrap();
        assert!(receipt.duplicate);
        assert!(!receipt.round_completed);

        h.controller.settle().await;
        let body = h.controller.snapshot().await.unwrap().body.unwrap();
        assert_eq!(body.version, DocumentVersion::FIRST);
        let task_id = body.current_task.unwrap().id;
        assert_eq!(body.answers[&task_id][&Email::new("a@x.com")].answer, "first");
        assert_eq!(h.facilitator.merge_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submission_taxonomy() {
        let h = harness();

        let err = h.controller.submit_answer("a@x.com", "hi").await.unwrap_err();
        assert!(matches!(err, RoundError::NoSession));

        started(&h).await;

        let err = h
            .controller
            .submit_answer("nobody@x.com", "hi")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RoundError::Rejected(DomainError::Unauthorized(_))
        ));

        let err = h.controller.submit_answer("a@x.com", "   ").await.unwrap_err();
        assert!(matches!(
            err,
            RoundError::Rejected(DomainError::MissingInput("answer"))
        ));

        let err = h.controller.submit_answer("  ", "hi").await.unwrap_err();
        assert!(matches!(
            err,
            RoundError::Rejected(DomainError::MissingInput("email"))
        ));
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_late_submission_rejected_while_consolidating() {
        let h = harness_with(ScriptedFacilitator::gated());
        started(&h).await;

        h.controller.submit_answer("a@x.com", "A").await.unwrap();
        let receipt = h.controller.submit_answer("b@x.com", "B").await.unwrap();
        assert!(receipt.round_completed);

        // Consolidation is parked on the merge gate; the flip to LLM_UPDATE
        // is already durable.
        let err = h.controller.submit_answer("a@x.com", "late").await.unwrap_err();
        assert!(matches!(
            err,
            RoundError::Rejected(DomainError::NotAcceptingAnswers)
        ));

        h.facilitator.release_merge();
        h.controller.settle().await;
        let body = h.controller.snapshot().await.unwrap().body.unwrap();
        assert_eq!(body.version, DocumentVersion::new(2));
        assert_eq!(body.task_history.len(), 1);
    }

    #[tokio::test]
    async fn test_round_survives_total_gateway_outage() {
        let h = harness_with(ScriptedFacilitator::failing());
        started(&h).await;

        let snap = h.controller.snapshot().await.unwrap();
        let question = snap.body.unwrap().current_task.unwrap().question;
        assert_eq!(question, fallback::question());

        h.controller.submit_answer("a@x.com", "Use email login").await.unwrap();
        h.controller.submit_answer("b@x.com", "Use SSO only").await.unwrap();
        h.controller.settle().await;

        let body = h.controller.snapshot().await.unwrap().body.unwrap();
        assert_eq!(body.version, DocumentVersion::new(2));
        assert_eq!(body.task_history.len(), 1);
        // Conflicting answers are tracked, never dropped
        assert!(body.document.contains("## Incorporated Answers"));
        assert!(body.document.contains("- a@x.com: Use email login"));
        assert!(body.document.contains("## Open Topics"));
        assert!(body.document.contains("[UNRESOLVED]"));
        // The loop kept going: the next round is open on the fallback question
        assert_eq!(
            h.controller
                .snapshot()
                .await
                .unwrap()
                .status
                .as_str(),
            "HUMAN_INPUT"
        );
    }

    #[tokio::test]
    async fn test_reset_wipes_session_and_documents() {
        let h = harness();
        started(&h).await;
        h.controller.submit_answer("a@x.com", "A").await.unwrap();
        h.controller.submit_answer("b@x.com", "B").await.unwrap();
        h.controller.settle().await;

        h.controller.reset().await.unwrap();
        assert!(!h.controller.snapshot().await.unwrap().is_active());
        assert!(h.documents.documents.lock().unwrap().is_empty());
        assert!(h.sessions.session.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_start_replaces_existing_session() {
        let h = harness();
        started(&h).await;
        h.controller.submit_answer("a@x.com", "A").await.unwrap();

        h.controller
            .start_session("Chat app", &["c@x.com".to_string()])
            .await
            .unwrap();
        h.controller.settle().await;

        let body = h.controller.snapshot().await.unwrap().body.unwrap();
        assert_eq!(body.version, DocumentVersion::FIRST);
        assert_eq!(body.collaborators.len(), 1);
        assert_eq!(body.collaborators[0].email.as_str(), "c@x.com");
        assert!(body.task_history.is_empty());
    }

    #[tokio::test]
    async fn test_resume_republishes_interrupted_question() {
        let h = harness();
        // A crash left the session durable but the question never published.
        let session = Session::create("Todo app", &roster()).unwrap();
        h.sessions.save(&session).await.unwrap();
        h.documents.write(DocumentVersion::FIRST, "").await.unwrap();

        h.controller.resume().await.unwrap();
        h.controller.settle().await;

        let snap = h.controller.snapshot().await.unwrap();
        assert_eq!(snap.status.as_str(), "HUMAN_INPUT");
        assert!(snap.body.unwrap().current_task.is_some());
    }

    #[tokio::test]
    async fn test_resume_completes_interrupted_consolidation_once() {
        let h = harness();
        // A crash hit after the LLM_UPDATE flip was durable.
        let mut session = Session::create("Todo app", &roster()).unwrap();
        session.publish_task("Q1", Utc::now());
        session
            .record_answer(&Email::new("a@x.com"), "A", Utc::now())
            .unwrap();
        session
            .record_answer(&Email::new("b@x.com"), "B", Utc::now())
            .unwrap();
        session.begin_consolidation().unwrap();
        h.sessions.save(&session).await.unwrap();
        h.documents.write(DocumentVersion::FIRST, "").await.unwrap();

        h.controller.resume().await.unwrap();
        h.controller.settle().await;

        let body = h.controller.snapshot().await.unwrap().body.unwrap();
        assert_eq!(body.version, DocumentVersion::new(2));
        assert_eq!(body.task_history.len(), 1);
        assert_eq!(body.task_history[0].question, "Q1");
        assert_eq!(h.facilitator.merge_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resume_leaves_open_round_waiting() {
        let h = harness();
        let mut session = Session::create("Todo app", &roster()).unwrap();
        session.publish_task("Q1", Utc::now());
        session
            .record_answer(&Email::new("a@x.com"), "A", Utc::now())
            .unwrap();
        h.sessions.save(&session).await.unwrap();

        h.controller.resume().await.unwrap();
        h.controller.settle().await;

        let snap = h.controller.snapshot().await.unwrap();
        assert_eq!(snap.status.as_str(), "HUMAN_INPUT");
        assert_eq!(snap.body.unwrap().current_task.unwrap().question, "Q1");
        assert_eq!(h.facilitator.question_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.facilitator.merge_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_both_retained() {
        let h = harness();
        started(&h).await;

        let (ra, rb) = tokio::join!(
            h.controller.submit_answer("a@x.com", "A"),
            h.controller.submit_answer("b@x.com", "B"),
        );
        let (ra, rb) = (ra.unwrap(), rb.unwrap());
        assert!(!ra.duplicate && !rb.duplicate);
        // Exactly one of the two observed roster completion
        assert!(ra.round_completed ^ rb.round_completed);

        h.controller.settle().await;
        let body = h.controller.snapshot().await.unwrap().body.unwrap();
        assert_eq!(body.task_history[0].answers.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_same_collaborator_collapses_to_one() {
        let h = harness();
        started(&h).await;

        let (r1, r2) = tokio::join!(
            h.controller.submit_answer("a@x.com", "one"),
            h.controller.submit_answer("a@x.com", "two"),
        );
        let (r1, r2) = (r1.unwrap(), r2.unwrap());
        assert!(r1.duplicate ^ r2.duplicate);

        let body = h.controller.snapshot().await.unwrap().body.unwrap();
        let task_id = body.current_task.unwrap().id;
        assert_eq!(body.answers[&task_id].len(), 1);
    }

    #[tokio::test]
    async fn test_round_event_sequence() {
        let h = harness();
        started(&h).await;
        h.controller.submit_answer("a@x.com", "A").await.unwrap();
        h.controller.submit_answer("b@x.com", "B").await.unwrap();
        h.controller.settle().await;
        h.controller.reset().await.unwrap();

        let events = h.logger.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "session_started",
                "question_generated",
                "answer_submitted",
                "answer_submitted",
                "round_consolidated",
                "question_generated",
                "session_reset",
            ]
        );
    }
}
