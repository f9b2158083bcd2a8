//! CLI argument definitions for the roundtable binary

pub mod commands;

pub use commands::{Cli, Command, OutputFormat};
