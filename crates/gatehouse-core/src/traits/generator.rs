// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text generator capability invoked by the caller after admission.

use async_trait::async_trait;

use crate::error::GeneratorError;
use crate::types::ContextMessage;

/// External text generation service.
///
/// Gatehouse never calls this itself from the limiter or store; the
/// conversation flow invokes it between a context read and the append of
/// both turns.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produces a reply to `prompt` given the prior turns, oldest first.
    async fn generate(
        &self,
        prompt: &str,
        prior_turns: &[ContextMessage],
    ) -> Result<String, GeneratorError>;
}
