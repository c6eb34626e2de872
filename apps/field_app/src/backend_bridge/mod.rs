//! Worker thread hosting the async collaborators.

pub mod commands;
pub mod runtime;
