//! Mock backend for testing
//!
//! Answers every prompt with a canned response, or fails, and counts calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GenerativeError;

use super::GenerativeBackend;

/// Mock generative backend.
#[derive(Clone)]
pub struct MockBackend {
    response: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// A backend that answers with an empty JSON object.
    pub fn new() -> Self {
        Self::with_response("{}")
    }

    /// A backend that always answers `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            calls: Arc::default(),
        }
    }

    /// A backend whose every call fails with an API error.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Arc::default(),
        }
    }

    /// Prompts received so far, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, GenerativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().ok_or_else(|| GenerativeError::Api {
            status: 503,
            body: "mock backend unavailable".to_string(),
        })
    }
}
