//! Builders to construct tier engines from configuration.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::core::{
    AuditSink, Classifier, EngineError, IdGenerator, InMemoryAuditSink, ProcessRegistry,
    TierEngine,
};
use crate::infra::InMemoryRegistry;

/// Step-wise construction of a [`TierEngine`].
pub struct EngineBuilder<G> {
    config: EngineConfig,
    registry: Arc<G>,
    ids: Option<Box<dyn IdGenerator>>,
    audit: Option<Box<dyn AuditSink>>,
}

impl<G> EngineBuilder<G>
where
    G: ProcessRegistry,
{
    /// Start a builder over `registry`.
    pub fn new(config: EngineConfig, registry: Arc<G>) -> Self {
        Self {
            config,
            registry,
            ids: None,
            audit: None,
        }
    }

    /// Configuration the engine will be built from.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Use a custom identifier source.
    #[must_use]
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Attach an in-memory audit sink sized by `audit_capacity` and return a
    /// reader handle to it alongside the builder.
    #[must_use]
    pub fn with_memory_audit(self) -> (Self, InMemoryAuditSink) {
        let sink = InMemoryAuditSink::new(self.config.audit_capacity);
        let reader = sink.clone();
        (self.with_audit(Box::new(sink)), reader)
    }

    /// Validate the configuration and assemble the engine.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`] if the configuration is invalid.
    pub fn build(self) -> Result<TierEngine<G>, EngineError> {
        self.config
            .validate()
            .map_err(|e| EngineError::Validation(format!("config invalid: {e}")))?;

        let mut engine = TierEngine::new(self.registry, Classifier::new(self.config.policy));
        if let Some(ids) = self.ids {
            engine = engine.with_id_generator(ids);
        }
        if let Some(audit) = self.audit {
            engine = engine.with_audit(audit);
        }
        tracing::debug!("tier engine built");
        Ok(engine)
    }
}

/// Build an engine over a fresh in-memory registry.
///
/// # Errors
///
/// [`EngineError::Validation`] if the configuration is invalid.
pub fn build_engine(cfg: &EngineConfig) -> Result<TierEngine<InMemoryRegistry>, EngineError> {
    EngineBuilder::new(cfg.clone(), Arc::new(InMemoryRegistry::new())).build()
}
