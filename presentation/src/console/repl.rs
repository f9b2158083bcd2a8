//! Interactive facilitator console

use crate::ConsoleFormatter;
use crate::PhaseSpinner;
use roundtable_application::RoundController;
use roundtable_domain::SessionSnapshot;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;

/// Interactive console over a live controller.
///
/// Background phases keep running while the prompt is open, so `/status`
/// after `/start` or a completing `/answer` shows the loop progressing the
/// same way a deployed instance would.
pub struct ConsoleRepl {
    controller: Arc<RoundController>,
    quiet: bool,
}

impl ConsoleRepl {
    /// Create a new ConsoleRepl
    pub fn new(controller: Arc<RoundController>) -> Self {
        Self {
            controller,
            quiet: false,
        }
    }

    /// Suppress progress indicators
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Run the interactive console
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Command history persists next to the other per-user data
        let history_path = dirs::data_dir().map(|p| p.join("roundtable").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome().await;

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line);

                    if !line.starts_with('/') {
                        println!("Commands start with '/'. Type /help for the list.");
                        continue;
                    }
                    if self.handle_command(line).await {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    self.drain().await;
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    async fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│      Roundtable - Facilitator Console       │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        if let Ok(snapshot) = self.controller.snapshot().await {
            println!("{}", ConsoleFormatter::status_line(&snapshot));
        }
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /start <emails> <description> - Start a session (emails comma-separated)");
        println!("  /answer <email> <text>        - Answer the current question");
        println!("  /status                       - Show the session state");
        println!("  /document                     - Print the current document");
        println!("  /history                      - Show completed rounds");
        println!("  /reset                        - Delete the session and documents");
        println!("  /help                         - Show this help");
        println!("  /quit                         - Exit, waiting for background work");
        println!();
    }

    /// Handle slash commands. Returns true if the console should exit.
    async fn handle_command(&self, line: &str) -> bool {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/quit" | "/exit" | "/q" => {
                self.drain().await;
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                Self::print_help();
                false
            }
            "/start" => {
                self.cmd_start(rest).await;
                false
            }
            "/answer" => {
                self.cmd_answer(rest).await;
                false
            }
            "/status" => {
                self.show(ConsoleFormatter::format).await;
                false
            }
            "/document" => {
                self.show(ConsoleFormatter::format_document).await;
                false
            }
            "/history" => {
                self.show(ConsoleFormatter::format_history).await;
                false
            }
            "/reset" => {
                self.cmd_reset(rest).await;
                false
            }
            _ => {
                println!("Unknown command: {}", command);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn cmd_start(&self, rest: &str) {
        let Some((emails_csv, description)) = rest.split_once(char::is_whitespace) else {
            println!("Usage: /start <email,email,...> <description>");
            return;
        };
        let emails: Vec<String> = emails_csv
            .split(',')
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect();

        match self
            .controller
            .start_session(description.trim(), &emails)
            .await
        {
            Ok(_) => {
                println!("Session started. The facilitator is drafting the first question.");
                println!("Use /status to check for it.");
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    async fn cmd_answer(&self, rest: &str) {
        let Some((email, text)) = rest.split_once(char::is_whitespace) else {
            println!("Usage: /answer <email> <text>");
            return;
        };

        match self.controller.submit_answer(email, text.trim()).await {
            Ok(receipt) if receipt.duplicate => {
                println!("Already answered this round; the stored answer is kept.");
            }
            Ok(receipt) if receipt.round_completed => {
                println!("Answer recorded. The roster is complete, consolidation is running.");
                println!("Use /status to follow it.");
            }
            Ok(_) => println!("Answer recorded."),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    async fn cmd_reset(&self, rest: &str) {
        if rest != "yes" {
            println!("This deletes the session and every document version.");
            println!("Type /reset yes to confirm.");
            return;
        }
        match self.controller.reset().await {
            Ok(()) => println!("Session wiped."),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    async fn show(&self, render: fn(&SessionSnapshot) -> String) {
        match self.controller.snapshot().await {
            Ok(snapshot) => println!("{}", render(&snapshot)),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    /// Wait out in-flight background phases before leaving the process.
    async fn drain(&self) {
        if self.quiet {
            self.controller.settle().await;
            return;
        }
        let spinner = PhaseSpinner::start("Finishing background facilitator work...");
        self.controller.settle().await;
        spinner.finish_and_clear();
    }
}
