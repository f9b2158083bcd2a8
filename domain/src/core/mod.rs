//! Core domain primitives shared across the session model

pub mod email;
pub mod error;
pub mod version;
