// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admission-gated conversation turn.
//!
//! Context is read before the generator runs and both turns are written only
//! after it succeeds, so a concurrent request for the same bucket never sees
//! a half-recorded exchange.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gatehouse_config::model::{GatehouseConfig, MemoryConfig};
use gatehouse_core::{ActorId, Category, Clock, GatehouseError, Generator, Role, ScopeId};
use gatehouse_limiter::AdmissionLimiter;
use gatehouse_memory::ContextStore;
use tracing::{debug, info, warn};

/// Result of one admitted-or-not request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The generator produced this reply; both turns were recorded.
    Replied(String),
    /// The limiter denied the request. Nothing was read or written.
    Throttled { retry_after: Duration },
}

/// Limiter, store, and memory settings for one running application.
pub struct Gatehouse {
    limiter: Arc<AdmissionLimiter>,
    store: Arc<ContextStore>,
    memory: MemoryConfig,
}

impl Gatehouse {
    pub fn new(limiter: Arc<AdmissionLimiter>, store: Arc<ContextStore>, memory: MemoryConfig) -> Self {
        Self {
            limiter,
            store,
            memory,
        }
    }

    /// Builds both components from configuration, sharing one clock.
    pub fn from_config(config: &GatehouseConfig, clock: Arc<dyn Clock>) -> Self {
        let limiter = AdmissionLimiter::from_config(&config.limiter, clock.clone());
        let store = ContextStore::from_config(&config.memory, clock);
        Self::new(Arc::new(limiter), Arc::new(store), config.memory.clone())
    }

    pub fn limiter(&self) -> &Arc<AdmissionLimiter> {
        &self.limiter
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// Runs one request through the limiter, the store, and `generator`.
    ///
    /// A generator failure is returned as [`GatehouseError::Generator`] and
    /// leaves the store untouched; the admission stays counted.
    pub async fn converse(
        &self,
        actor: &ActorId,
        scope: &ScopeId,
        category: Category,
        prompt: &str,
        generator: &dyn Generator,
    ) -> Result<Outcome, GatehouseError> {
        if !self.limiter.allow(actor, category) {
            let retry_after = self.limiter.retry_after(actor, category);
            debug!(actor = %actor, category = %category, ?retry_after, "request throttled");
            return Ok(Outcome::Throttled { retry_after });
        }

        let context = if self.memory.enabled {
            self.store.context(actor, scope, self.memory.context_turns)
        } else {
            Vec::new()
        };

        let started = Instant::now();
        let result = generator.generate(prompt, &context).await;
        metrics::histogram!("gatehouse_generation_seconds").record(started.elapsed().as_secs_f64());
        let reply = result.inspect_err(|e| {
            warn!(actor = %actor, category = %category, error = %e, "generator failed");
        })?;

        if self.memory.enabled {
            self.store.append(actor, scope, Role::User, prompt);
            self.store.append(actor, scope, Role::Assistant, reply.as_str());
        }

        info!(
            actor = %actor,
            scope = %scope,
            category = %category,
            context_turns = context.len(),
            reply_len = reply.len(),
            "request answered"
        );
        Ok(Outcome::Replied(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::GeneratorError;
    use gatehouse_test_utils::{ManualClock, MockGenerator};

    fn gatehouse(config: &GatehouseConfig) -> Gatehouse {
        Gatehouse::from_config(config, Arc::new(ManualClock::new()))
    }

    #[tokio::test]
    async fn generator_failure_records_no_turns() {
        let gh = gatehouse(&GatehouseConfig::default());
        let generator = MockGenerator::new();
        generator.add_error(GeneratorError::Authentication).await;
        let actor = ActorId::from("a");

        let err = gh
            .converse(&actor, &ScopeId::Unscoped, Category::Chat, "hi", &generator)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatehouseError::Generator(GeneratorError::Authentication)
        ));
        assert_eq!(gh.store().stats(&actor, &ScopeId::Unscoped).total_turns, 0);
        assert_eq!(gh.limiter().stats(&actor).global.used, 1);
    }

    #[tokio::test]
    async fn disabled_memory_skips_reads_and_writes() {
        let mut config = GatehouseConfig::default();
        config.memory.enabled = false;
        let gh = gatehouse(&config);
        let generator = MockGenerator::new();
        let actor = ActorId::from("a");

        for _ in 0..2 {
            gh.converse(&actor, &ScopeId::Unscoped, Category::Ask, "q", &generator)
                .await
                .unwrap();
        }
        assert_eq!(gh.store().global_stats().turns, 0);
        assert!(generator.calls().await.iter().all(|c| c.prior_turns.is_empty()));
    }
}
