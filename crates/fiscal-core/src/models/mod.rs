//! Data models for documents, expenses and engine configuration.

pub mod config;
pub mod document;
pub mod expense;
mod lenient;
