//! Prompt domain
//!
//! Templates for the two facilitator calls of a round: question generation
//! and answer consolidation.

mod template;

pub use template::PromptTemplate;
