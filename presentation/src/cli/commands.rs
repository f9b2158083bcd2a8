//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for session snapshots
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted snapshot with roster and document preview
    Full,
    /// Only the current document text
    Document,
    /// JSON output (the serialized snapshot)
    Json,
}

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Facilitated spec refinement - one blocking question per round")]
#[command(long_about = r#"
Roundtable drives an iterative requirement-refinement loop for a team:
an automated facilitator asks one blocking question per round, every
collaborator answers, and the answers are merged into a new version of
the specification document.

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. ./roundtable.toml     Project-level config
3. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable start "Team task board for a small startup" -e ana@corp.dev -e ben@corp.dev
  roundtable answer ana@corp.dev "Billing is out of scope for v1"
  roundtable status
  roundtable console
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Override the data directory from config
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Run on the deterministic offline facilitator
    #[arg(long, global = true)]
    pub offline: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full", global = true)]
    pub output: OutputFormat,
}

/// Session commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a new session (replaces any existing one)
    Start {
        /// What the team is building
        description: String,

        /// Collaborator email (repeat once per person)
        #[arg(short, long = "email", value_name = "EMAIL", required = true)]
        emails: Vec<String>,
    },

    /// Submit one collaborator's answer to the current question
    Answer {
        /// Collaborator email
        email: String,

        /// Answer text
        text: String,
    },

    /// Show the current session state
    Status,

    /// Print the current document text
    Document,

    /// Show the archived rounds
    History,

    /// Delete the session and every document version
    Reset {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    /// Interactive facilitator console
    Console,
}
