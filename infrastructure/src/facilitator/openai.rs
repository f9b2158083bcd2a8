//! OpenAI chat-completions facilitator
//!
//! Drives both facilitator calls through the chat-completions endpoint with
//! bearer auth. Prompt texts come from the domain's [`PromptTemplate`];
//! this adapter only speaks the wire protocol. Timeouts and fallback are
//! the failover decorator's concern, not this adapter's.

use async_trait::async_trait;
use roundtable_application::{FacilitatorError, FacilitatorGateway};
use roundtable_domain::{Answer, Email, PromptTemplate};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default chat model when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-5";

pub struct OpenAiFacilitator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiFacilitator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, FacilitatorError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ]
        });

        debug!(model = %self.model, "Sending chat-completions request");
        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FacilitatorError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FacilitatorError::RequestFailed(format!(
                "OpenAI API error {status}: {body}"
            )));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| FacilitatorError::InvalidResponse(e.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                FacilitatorError::InvalidResponse("no choices in response".to_string())
            })?;
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl FacilitatorGateway for OpenAiFacilitator {
    async fn generate_question(
        &self,
        app_description: &str,
        current_document: &str,
    ) -> Result<String, FacilitatorError> {
        self.chat(
            PromptTemplate::question_system(),
            &PromptTemplate::question_prompt(app_description, current_document),
        )
        .await
    }

    async fn merge_answers(
        &self,
        app_description: &str,
        current_document: &str,
        answers: &[(Email, Answer)],
    ) -> Result<String, FacilitatorError> {
        self.chat(
            PromptTemplate::merge_system(),
            &PromptTemplate::merge_prompt(app_description, current_document, answers),
        )
        .await
    }
}
