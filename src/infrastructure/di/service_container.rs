//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::CladeService;
use crate::config::Settings;
use crate::infrastructure::traits::{DocumentSource, HttpDocumentSource};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Document retrieval abstraction
    pub source: Arc<dyn DocumentSource>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let source = HttpDocumentSource::new(&settings).map_err(InfraError::Source)?;
        Ok(Self::with_deps(settings, Arc::new(source)))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, source: Arc<dyn DocumentSource>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, source }
    }

    pub fn clade_service(&self) -> CladeService {
        CladeService::new(Arc::clone(&self.source))
    }
}
