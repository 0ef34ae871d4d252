use crate::config::{AppConfig, DEFAULT_PORT};
use crate::handler::RequestHandler;
use crate::models::ModelInfo;
use emolens_classifiers::{build_classifier, Classifier};
use emolens_core::Result;
use emolens_telemetry::{MetricsCollector, MonitoringAggregator, SqliteStore, Store};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Classify-then-log pipeline for submissions and page visits
    pub handler: Arc<RequestHandler>,

    /// Count-by-category summaries for the monitor view
    pub aggregator: MonitoringAggregator,

    /// In-process counters for `/api/stats`
    pub metrics: MetricsCollector,

    /// Model reported by `/api/health`
    pub model: Arc<ModelInfo>,

    /// Prometheus renderer, absent when no recorder is installed
    pub prometheus: Option<PrometheusHandle>,

    /// Port the UI is served on; local origins on it pass CORS
    pub port: u16,
}

impl AppState {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn Store>,
        model: ModelInfo,
        reject_blank_input: bool,
    ) -> Self {
        let metrics = MetricsCollector::new();
        let handler = RequestHandler::new(classifier, store.clone(), metrics.clone())
            .with_reject_blank_input(reject_blank_input);

        Self {
            handler: Arc::new(handler),
            aggregator: MonitoringAggregator::new(store),
            metrics,
            model: Arc::new(model),
            prometheus: None,
            port: DEFAULT_PORT,
        }
    }

    /// Load the model and open the log database described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let classifier = build_classifier(&config.model)?;
        let model = ModelInfo {
            name: classifier.model_name().to_string(),
            label_table: classifier.label_table().version().to_string(),
        };

        let store = SqliteStore::open_and_init(&config.database_path)?;
        info!(
            "Model '{}' ready, logging to {}",
            model.name,
            config.database_path.display()
        );

        Ok(Self::new(
            Arc::new(classifier),
            Arc::new(store),
            model,
            config.reject_blank_input,
        )
        .with_port(config.port))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
