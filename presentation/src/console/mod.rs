//! Interactive console module
//!
//! Provides a readline-based facilitator console over a live controller.

mod repl;

pub use repl::ConsoleRepl;
