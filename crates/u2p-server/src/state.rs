//! Application state.

use std::sync::Arc;

use u2p_git::MirrorRepository;

use crate::forwarder::ConversionForwarder;
use crate::metrics::ConversionMetrics;
use crate::template::PathTemplate;
use crate::validation::RequestValidator;

/// Application state shared across all handlers.
///
/// Everything here is built once at startup and read-only afterwards; the
/// mirror is the only mutable resource and guards itself.
#[derive(Clone)]
pub struct AppState {
    repository: Arc<dyn MirrorRepository>,
    template: Arc<PathTemplate>,
    validator: Arc<RequestValidator>,
    forwarder: ConversionForwarder,
    metrics: ConversionMetrics,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(
        repository: Arc<dyn MirrorRepository>,
        template: PathTemplate,
        validator: RequestValidator,
        forwarder: ConversionForwarder,
    ) -> Self {
        Self {
            repository,
            template: Arc::new(template),
            validator: Arc::new(validator),
            forwarder,
            metrics: ConversionMetrics::new(),
        }
    }

    /// Returns the mirror.
    pub fn repository(&self) -> &dyn MirrorRepository {
        self.repository.as_ref()
    }

    /// Returns the compiled path template.
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Returns the request validator.
    pub fn validator(&self) -> &RequestValidator {
        &self.validator
    }

    /// Returns the conversion forwarder.
    pub fn forwarder(&self) -> &ConversionForwarder {
        &self.forwarder
    }

    /// Returns the conversion metrics.
    pub fn metrics(&self) -> &ConversionMetrics {
        &self.metrics
    }
}
