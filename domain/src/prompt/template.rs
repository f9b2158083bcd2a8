//! Prompt templates for the refinement loop

use crate::core::email::Email;
use crate::fallback;
use crate::session::entities::Answer;

/// Templates for generating prompts at each phase of a round
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for question generation
    pub fn question_system() -> &'static str {
        "You help iteratively build precise technical specifications and drive \
         resolution of open topics."
    }

    /// User prompt for question generation
    pub fn question_prompt(app_description: &str, current_document: &str) -> String {
        let document = if current_document.is_empty() {
            "(empty)"
        } else {
            current_document
        };
        format!(
            r#"You are an expert specification facilitator for an app.
APP DESCRIPTION: {app_description}

CURRENT DOCUMENT:
{document}

Task:
1) Review the document, prioritizing any section titled "Open Topics" or "Unresolved".
2) Identify the single most blocking unresolved issue, contradiction, ambiguity, or missing decision.
3) Output ONE concise, actionable question/request for comment to resolve that specific issue.

Rules:
- Prefer questions that directly resolve items already listed under "Open Topics".
- If no open topics are listed, ask about the most critical missing requirement.
- Output ONLY the question text (no preamble or bullets)."#
        )
    }

    /// System prompt for consolidation
    pub fn merge_system() -> &'static str {
        r#"You merge feedback into a single authoritative software specification in Markdown. If input cannot be integrated, you explicitly track it under "Open Topics" for later resolution."#
    }

    /// User prompt for consolidation. Answers are rendered in the same
    /// attributed bullet format the offline merge produces.
    pub fn merge_prompt(
        app_description: &str,
        current_document: &str,
        answers: &[(Email, Answer)],
    ) -> String {
        let answer_lines = fallback::answer_lines(answers);
        format!(
            r###"Consolidate the following human answers into the current specification. Improve clarity, structure, and completeness while preserving existing validated content. Produce ONLY the full updated specification in markdown (no preamble text).

APP DESCRIPTION: {app_description}

CURRENT DOCUMENT START
{current_document}
CURRENT DOCUMENT END

HUMAN ANSWERS START
{answer_lines}
HUMAN ANSWERS END

Integration policy:
- If answers are contradictory, ambiguous, incomplete, or cannot be confidently integrated, DO NOT force-fit them.
- Instead, create or update a visible section titled "## Open Topics" near the end of the document with bullet points:
  - [UNRESOLVED] Short name of the issue: succinct description of what is missing or conflicting.
  - Optionally summarize conflicting proposals (attribute to roles/emails if clear).
- Only remove an item from "Open Topics" when it is fully resolved by the new content.
- Preserve all validated content and the overall structure.
- Keep headings and terminology consistent throughout."###
        )
    }
}
