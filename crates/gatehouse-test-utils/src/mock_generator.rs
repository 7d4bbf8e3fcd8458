// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text generator for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_core::{ContextMessage, Generator, GeneratorError};
use tokio::sync::Mutex;

/// One recorded `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCall {
    pub prompt: String,
    pub prior_turns: Vec<ContextMessage>,
}

/// A mock generator that returns pre-configured results.
///
/// Results are popped from a FIFO queue. When the queue is empty, the reply
/// echoes the prompt as `"echo: <prompt>"`.
#[derive(Clone, Default)]
pub struct MockGenerator {
    results: Arc<Mutex<VecDeque<Result<String, GeneratorError>>>>,
    calls: Arc<Mutex<Vec<GenerateCall>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock generator pre-loaded with the given replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            results: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            calls: Arc::default(),
        }
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.results.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a failure for the next call.
    pub async fn add_error(&self, error: GeneratorError) {
        self.results.lock().await.push_back(Err(error));
    }

    /// Every call made so far, in order.
    pub async fn calls(&self) -> Vec<GenerateCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        prior_turns: &[ContextMessage],
    ) -> Result<String, GeneratorError> {
        self.calls.lock().await.push(GenerateCall {
            prompt: prompt.to_string(),
            prior_turns: prior_turns.to_vec(),
        });
        self.results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(format!("echo: {prompt}")))
    }
}
