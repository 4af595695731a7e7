//! CLI commands.

pub mod batch;
pub mod classify;
pub mod config;
pub mod extract;
pub mod validate;
