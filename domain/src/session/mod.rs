//! The session aggregate and its lifecycle vocabulary

pub mod entities;
pub mod snapshot;
pub mod status;
