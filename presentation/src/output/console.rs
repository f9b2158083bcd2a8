//! Console output formatter for session snapshots

use colored::Colorize;
use roundtable_domain::{SessionSnapshot, SnapshotBody, SnapshotStatus};

/// How many document lines the full snapshot view shows before cutting off
const PREVIEW_LINES: usize = 12;

/// Formats session snapshots for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete snapshot
    pub fn format(snapshot: &SessionSnapshot) -> String {
        let Some(body) = &snapshot.body else {
            return format!(
                "{}\nStart one with `roundtable start \"<description>\" -e <email>...`\n",
                "No active session.".yellow()
            );
        };

        let mut output = String::new();

        // Header
        output.push_str(&Self::header("Roundtable Session"));
        output.push('\n');

        // Status and version
        output.push_str(&format!(
            "{} {}  {}\n",
            "Status:".cyan().bold(),
            Self::status_badge(snapshot.status),
            Self::status_meaning(snapshot.status).dimmed()
        ));
        output.push_str(&format!(
            "{} version {}\n",
            "Document:".cyan().bold(),
            body.version
        ));

        // Current question
        output.push_str(&Self::section_header("Current Question"));
        match &body.current_task {
            Some(task) => {
                output.push_str(&format!("{}\n", task.question.bold()));
                output.push_str(&format!(
                    "{}\n",
                    format!("Asked: {}", task.created_at.format("%Y-%m-%d %H:%M UTC")).dimmed()
                ));
            }
            None => {
                output.push_str(&format!(
                    "{}\n",
                    "The facilitator is drafting the next question...".dimmed()
                ));
            }
        }

        // Roster with answered ticks
        output.push_str(&Self::section_header("Roster"));
        for collaborator in &body.collaborators {
            if collaborator.answered_current {
                output.push_str(&format!("  {} {}\n", "v".green(), collaborator.email));
            } else {
                output.push_str(&format!(
                    "  {} {} {}\n",
                    ".".yellow(),
                    collaborator.email,
                    "(pending)".dimmed()
                ));
            }
        }

        // Answers collected this round
        let live_answers = body
            .current_task
            .as_ref()
            .and_then(|task| body.answers.get(&task.id))
            .filter(|answers| !answers.is_empty());
        if let Some(answers) = live_answers {
            output.push_str(&Self::section_header("Answers This Round"));
            for (email, answer) in answers {
                output.push_str(&format!(
                    "  {} {}\n",
                    format!("{}:", email).yellow(),
                    Self::indent(&answer.answer, "    ").trim_start()
                ));
            }
        }

        // Document preview
        output.push_str(&Self::section_header("Document Preview"));
        if body.document.trim().is_empty() {
            output.push_str(&format!(
                "{}\n",
                "(empty until the first round completes)".dimmed()
            ));
        } else {
            let lines: Vec<&str> = body.document.lines().collect();
            for line in lines.iter().take(PREVIEW_LINES) {
                output.push_str(&format!("  {}\n", line));
            }
            if lines.len() > PREVIEW_LINES {
                output.push_str(&format!(
                    "{}\n",
                    format!(
                        "  ... {} more lines (`roundtable document` prints the full text)",
                        lines.len() - PREVIEW_LINES
                    )
                    .dimmed()
                ));
            }
        }

        // History summary
        if !body.task_history.is_empty() {
            output.push_str(&Self::section_header("History"));
            for (index, round) in body.task_history.iter().enumerate() {
                output.push_str(&format!(
                    "  Round {}: {} ({} answers, completed {})\n",
                    index + 1,
                    round.question,
                    round.answers.len(),
                    round.completed_at.format("%Y-%m-%d")
                ));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON (the serialized snapshot, wire shape)
    pub fn format_json(snapshot: &SessionSnapshot) -> String {
        serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    /// The current document text only, suitable for piping
    pub fn format_document(snapshot: &SessionSnapshot) -> String {
        match &snapshot.body {
            Some(body) => body.document.clone(),
            None => "No active session.".to_string(),
        }
    }

    /// The archived rounds, questions and answers in full
    pub fn format_history(snapshot: &SessionSnapshot) -> String {
        let Some(body) = &snapshot.body else {
            return "No active session.".to_string();
        };
        if body.task_history.is_empty() {
            return "No completed rounds yet.".to_string();
        }

        let mut output = String::new();
        for (index, round) in body.task_history.iter().enumerate() {
            output.push_str(&format!(
                "{}  {}\n",
                format!("Round {}", index + 1).cyan().bold(),
                format!("completed {}", round.completed_at.format("%Y-%m-%d %H:%M UTC")).dimmed()
            ));
            output.push_str(&format!("  {} {}\n", "Q:".bold(), round.question));
            for (email, answer) in &round.answers {
                output.push_str(&format!(
                    "  {} {}\n",
                    format!("{}:", email).yellow(),
                    Self::indent(&answer.answer, "    ").trim_start()
                ));
            }
            output.push('\n');
        }
        output.trim_end().to_string()
    }

    /// One-line summary for the interactive console
    pub fn status_line(snapshot: &SessionSnapshot) -> String {
        let Some(body) = &snapshot.body else {
            return "No active session. /start to begin.".to_string();
        };
        let detail = match snapshot.status {
            SnapshotStatus::HumanInput => {
                let (answered, total) = Self::roster_progress(body);
                format!("{} of {} answered", answered, total)
            }
            SnapshotStatus::LlmQuestion => "question on the way".to_string(),
            SnapshotStatus::LlmUpdate => "consolidating answers".to_string(),
            SnapshotStatus::NoSession => String::new(),
        };
        format!(
            "Status: {}  version {}  {}",
            Self::status_badge(snapshot.status),
            body.version,
            detail.dimmed()
        )
    }

    fn roster_progress(body: &SnapshotBody) -> (usize, usize) {
        let answered = body
            .current_task
            .as_ref()
            .and_then(|task| body.answers.get(&task.id))
            .map(|answers| answers.len())
            .unwrap_or(0);
        (answered, body.collaborators.len())
    }

    fn status_badge(status: SnapshotStatus) -> String {
        match status {
            SnapshotStatus::NoSession => status.as_str().dimmed().to_string(),
            SnapshotStatus::LlmQuestion => status.as_str().yellow().bold().to_string(),
            SnapshotStatus::HumanInput => status.as_str().green().bold().to_string(),
            SnapshotStatus::LlmUpdate => status.as_str().cyan().bold().to_string(),
        }
    }

    fn status_meaning(status: SnapshotStatus) -> &'static str {
        match status {
            SnapshotStatus::NoSession => "no session exists",
            SnapshotStatus::LlmQuestion => "the facilitator is drafting the next question",
            SnapshotStatus::HumanInput => "waiting for collaborator answers",
            SnapshotStatus::LlmUpdate => "merging answers into the next version",
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
