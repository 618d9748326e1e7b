//! Shared application state for the exporter.
//!
//! Built once in `main` and handed to both the refresh loop (through the
//! publisher) and the HTTP handlers. There is no ambient global registry.

use std::sync::Arc;

use crate::config::ExporterConfig;
use crate::obs::MetricRegistry;
use crate::publisher::QuotaPublisher;
use crate::source::QuotaSource;

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<ExporterConfig>,
    registry: Arc<MetricRegistry>,
    publisher: Arc<QuotaPublisher>,
}

impl AppState {
    pub fn new(cfg: ExporterConfig, source: Arc<dyn QuotaSource>) -> Self {
        let registry = Arc::new(MetricRegistry::new());
        let publisher = Arc::new(QuotaPublisher::new(
            cfg.project_id.clone(),
            source,
            Arc::clone(&registry),
        ));
        Self {
            cfg: Arc::new(cfg),
            registry,
            publisher,
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.cfg
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn publisher(&self) -> Arc<QuotaPublisher> {
        Arc::clone(&self.publisher)
    }
}
