//! Placeholder for an engine the configuration does not provide.

use async_trait::async_trait;
use fncall_application::ports::generation_engine::{
    EngineError, GenerationEngine, GenerationRequest,
};
use fncall_domain::EngineKind;

/// Fails every attempt with [`EngineError::NotConfigured`].
pub struct UnconfiguredEngine {
    kind: EngineKind,
    hint: String,
}

impl UnconfiguredEngine {
    pub fn new(kind: EngineKind, hint: impl Into<String>) -> Self {
        Self {
            kind,
            hint: hint.into(),
        }
    }
}

#[async_trait]
impl GenerationEngine for UnconfiguredEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, EngineError> {
        Err(EngineError::NotConfigured(self.hint.clone()))
    }
}
