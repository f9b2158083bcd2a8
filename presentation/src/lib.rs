//! Presentation layer for roundtable
//!
//! This crate contains CLI definitions, output formatters,
//! progress indication, and the interactive facilitator console.

pub mod cli;
pub mod console;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat};
pub use console::ConsoleRepl;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::PhaseSpinner;
