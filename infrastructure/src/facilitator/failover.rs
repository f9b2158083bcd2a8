//! Failover decorator for the facilitator gateway
//!
//! Wraps a primary gateway with a bounded timeout and substitutes the
//! deterministic fallback output on any error. From the caller's point of
//! view both calls always succeed, so a gateway outage can slow a round
//! down but never stall it. Each substitution is recorded in the round log.

use async_trait::async_trait;
use roundtable_application::{FacilitatorError, FacilitatorGateway, RoundEvent, RoundLogger};
use roundtable_domain::{Answer, Email, fallback};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub struct FailoverFacilitator<P> {
    primary: P,
    timeout: Duration,
    logger: Arc<dyn RoundLogger>,
}

impl<P: FacilitatorGateway> FailoverFacilitator<P> {
    pub fn new(primary: P, timeout: Duration, logger: Arc<dyn RoundLogger>) -> Self {
        Self {
            primary,
            timeout,
            logger,
        }
    }

    fn note_fallback(&self, phase: &'static str, error: &FacilitatorError) {
        warn!("Facilitator {phase} call failed ({error}), substituting the deterministic fallback");
        self.logger.log(RoundEvent::new(
            "fallback_used",
            json!({
                "phase": phase,
                "reason": error.to_string(),
            }),
        ));
    }
}

#[async_trait]
impl<P: FacilitatorGateway> FacilitatorGateway for FailoverFacilitator<P> {
    async fn generate_question(
        &self,
        app_description: &str,
        current_document: &str,
    ) -> Result<String, FacilitatorError> {
        let call = self
            .primary
            .generate_question(app_description, current_document);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(question)) => Ok(question),
            Ok(Err(e)) => {
                self.note_fallback("question", &e);
                Ok(fallback::question().to_string())
            }
            Err(_) => {
                self.note_fallback("question", &FacilitatorError::Timeout);
                Ok(fallback::question().to_string())
            }
        }
    }

    async fn merge_answers(
        &self,
        app_description: &str,
        current_document: &str,
        answers: &[(Email, Answer)],
    ) -> Result<String, FacilitatorError> {
        let call = self
            .primary
            .merge_answers(app_description, current_document, answers);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(merged)) => Ok(merged),
            Ok(Err(e)) => {
                self.note_fallback("merge", &e);
                Ok(fallback::merge(current_document, answers))
            }
            Err(_) => {
                self.note_fallback("merge", &FacilitatorError::Timeout);
                Ok(fallback::merge(current_document, answers))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use roundtable_application::NoRoundLogger;
    use std::sync::Mutex;

    struct HealthyPrimary;

    #[async_trait]
    impl FacilitatorGateway for HealthyPrimary {
        async fn generate_question(
            &self,
            _d: &str,
            _c: &str,
        ) -> Result<String, FacilitatorError> {
            Ok("real question".to_string())
        }

        async fn merge_answers(
            &self,
            _d: &str,
            _c: &str,
            _a: &[(Email, Answer)],
        ) -> Result<String, FacilitatorError> {
            Ok("real merge".to_string())
        }
    }

    struct BrokenPrimary;

    #[async_trait]
    impl FacilitatorGateway for BrokenPrimary {
        async fn generate_question(
            &self,
            _d: &str,
            _c: &str,
        ) -> Result<String, FacilitatorError> {
            Err(FacilitatorError::Unavailable("down".to_string()))
        }

        async fn merge_answers(
            &self,
            _d: &str,
            _c: &str,
            _a: &[(Email, Answer)],
        ) -> Result<String, FacilitatorError> {
            Err(FacilitatorError::RequestFailed("500".to_string()))
        }
    }

    struct HangingPrimary;

    #[async_trait]
    impl FacilitatorGateway for HangingPrimary {
        async fn generate_question(
            &self,
            _d: &str,
            _c: &str,
        ) -> Result<String, FacilitatorError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok("too late".to_string())
        }

        async fn merge_answers(
            &self,
            _d: &str,
            _c: &str,
            _a: &[(Email, Answer)],
        ) -> Result<String, FacilitatorError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok("too late".to_string())
        }
    }

    #[derive(Default)]
    struct CapturingLogger {
        events: Mutex<Vec<String>>,
    }

    impl RoundLogger for CapturingLogger {
        fn log(&self, event: RoundEvent) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{}", event.event_type, event.payload["phase"]));
        }
    }

    fn answers() -> Vec<(Email, Answer)> {
        vec![(Email::new("a@x.com"), Answer::new("A", Utc::now()))]
    }

    #[tokio::test]
    async fn test_healthy_primary_passes_through() {
        let failover = FailoverFacilitator::new(
            HealthyPrimary,
            Duration::from_secs(1),
            Arc::new(NoRoundLogger),
        );
        assert_eq!(
            failover.generate_question("d", "").await.unwrap(),
            "real question"
        );
        assert_eq!(
            failover.merge_answers("d", "", &answers()).await.unwrap(),
            "real merge"
        );
    }

    #[tokio::test]
    async fn test_primary_error_substitutes_fallback() {
        let logger = Arc::new(CapturingLogger::default());
        let failover = FailoverFacilitator::new(
            BrokenPrimary,
            Duration::from_secs(1),
            Arc::clone(&logger) as Arc<dyn RoundLogger>,
        );

        let question = failover.generate_question("d", "").await.unwrap();
        assert_eq!(question, fallback::question());

        let merged = failover.merge_answers("d", "doc", &answers()).await.unwrap();
        assert!(merged.contains("doc"));
        assert!(merged.contains("- a@x.com: A"));

        let events = logger.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "fallback_used:\"question\"".to_string(),
                "fallback_used:\"merge\"".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_hanging_primary_times_out_to_fallback() {
        let failover = FailoverFacilitator::new(
            HangingPrimary,
            Duration::from_millis(10),
            Arc::new(NoRoundLogger),
        );
        let question = failover.generate_question("d", "").await.unwrap();
        assert_eq!(question, fallback::question());

        let merged = failover.merge_answers("d", "", &answers()).await.unwrap();
        assert!(merged.contains("## Incorporated Answers"));
    }
}
