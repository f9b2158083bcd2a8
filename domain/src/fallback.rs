//! Deterministic facilitator fallback
//!
//! When the external text-generation service is unreachable, times out or
//! errors, the round must still complete. These functions are the substitute
//! output: a fixed Open-Topics-oriented question, and a naive merge that
//! concatenates the document with the round's answers. The merge never
//! discards input it cannot integrate: conflicting material is surfaced
//! under an `## Open Topics` section with an `[UNRESOLVED]` marker, to be
//! reconciled by a later round. That non-destructive behavior is a
//! correctness property of consolidation; every merge path, live or
//! substituted, must preserve it.

use crate::core::email::Email;
use crate::session::entities::Answer;

/// Heading of the section tracking unresolved or conflicting items.
pub const OPEN_TOPICS_HEADING: &str = "## Open Topics";

/// Marker prefix for entries awaiting resolution.
pub const UNRESOLVED_MARKER: &str = "[UNRESOLVED]";

/// Fixed substitute for a generated question. Points collaborators at the
/// Open Topics section first, mirroring what the live facilitator is asked
/// to prioritize.
pub fn question() -> &'static str {
    "Which of the listed Open Topics is the most blocking, and what is your \
     decision on it? If none are listed, please clarify the most critical \
     missing requirement in one specific area (scope, users, or success \
     criteria)."
}

/// Render the round's answers as one attributed bullet line each.
pub fn answer_lines(answers: &[(Email, Answer)]) -> String {
    answers
        .iter()
        .map(|(email, answer)| format!("- {}: {}", email, answer.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitute merge: current document plus the attributed answers, with an
/// Open Topics block appended when two or more bullet-style answer lines
/// suggest material that may conflict. Existing document content (any prior
/// Open Topics section included) is carried over verbatim; nothing is ever
/// dropped here.
pub fn merge(current_document: &str, answers: &[(Email, Answer)]) -> String {
    let lines = answer_lines(answers);
    let open_topics = if bullet_line_count(&lines) >= 2 {
        format!(
            "\n\n{OPEN_TOPICS_HEADING}\n- {UNRESOLVED_MARKER} Potential inconsistencies among \
             collaborator answers detected by the offline facilitator. Please reconcile in the \
             next round."
        )
    } else {
        String::new()
    };

    format!(
        "# Specification (Offline Update)\n\n{current_document}\n\n## Incorporated Answers\n{lines}{open_topics}"
    )
    .trim()
    .to_string()
}

/// Count lines that look like markdown bullets (`-` followed by whitespace),
/// including bullets embedded inside multi-line answers.
fn bullet_line_count(text: &str) -> usize {
    text.lines()
        .filter(|line| {
            line.starts_with('-') && line.chars().nth(1).is_some_and(char::is_whitespace)
        })
        .count()
}
