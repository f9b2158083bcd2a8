//! Output formatting for session snapshots

pub mod console;

pub use console::ConsoleFormatter;
