//! Submission handling
//!
//! One submission runs validate, classify, log and respond to completion.
//! Validation and classification failures abort before anything is written.
//! A failed log write is reported alongside the result instead of replacing
//! it.

use emolens_classifiers::Classifier;
use emolens_core::{EmotionCategory, EmotionScores, Error, Result, Timestamp};
use emolens_telemetry::{MetricsCollector, Store};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the page shows for one classified text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub raw_text: String,
    pub label: EmotionCategory,
    pub glyph: String,
    /// Highest probability across categories
    pub confidence: f64,
    pub probabilities: EmotionScores,
    pub predicted_at: Timestamp,
}

/// Outcome of a successful classification
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub result: PredictionResult,
    /// Set when the prediction could not be logged
    pub storage_warning: Option<String>,
}

impl Submission {
    pub fn is_logged(&self) -> bool {
        self.storage_warning.is_none()
    }
}

pub struct RequestHandler {
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn Store>,
    metrics: MetricsCollector,
    reject_blank_input: bool,
}

impl RequestHandler {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn Store>,
        metrics: MetricsCollector,
    ) -> Self {
        Self {
            classifier,
            store,
            metrics,
            reject_blank_input: true,
        }
    }

    /// Pass blank text through to the classifier instead of rejecting it
    pub fn with_reject_blank_input(mut self, reject: bool) -> Self {
        self.reject_blank_input = reject;
        self
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Classify `raw_text` and append exactly one prediction record for it
    pub async fn handle_submission(&self, raw_text: &str, now: Timestamp) -> Result<Submission> {
        self.metrics.record_submission();

        if self.reject_blank_input && raw_text.trim().is_empty() {
            self.metrics.record_validation_rejection();
            metrics::counter!("emolens_errors_total", "kind" => "validation").increment(1);
            return Err(Error::validation("text must not be empty"));
        }

        let classification = match self.classifier.classify(raw_text).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Classification failed: {}", e);
                self.metrics.record_classification_failure();
                metrics::counter!("emolens_errors_total", "kind" => e.kind()).increment(1);
                return Err(match e {
                    Error::Classifier(_) => e,
                    other => Error::classifier(other.to_string()),
                });
            }
        };

        let label = classification.label;
        let confidence = classification.scores.confidence();

        self.metrics.record_prediction(classification.latency_us);
        metrics::counter!("emolens_predictions_total", "label" => label.as_str()).increment(1);
        metrics::histogram!("emolens_classification_latency_us")
            .record(classification.latency_us as f64);
        debug!(
            label = %label,
            confidence,
            latency_us = classification.latency_us,
            "Text classified"
        );

        let storage_warning = match self
            .record_prediction(raw_text.to_string(), label, confidence, now)
            .await
        {
            Ok(()) => None,
            Err(e) => {
                warn!("Prediction was classified but not logged: {}", e);
                self.metrics.record_storage_failure();
                metrics::counter!("emolens_errors_total", "kind" => "storage").increment(1);
                Some(format!("prediction was not saved: {e}"))
            }
        };

        info!(label = %label, confidence, logged = storage_warning.is_none(), "Submission handled");

        Ok(Submission {
            result: PredictionResult {
                raw_text: raw_text.to_string(),
                label,
                glyph: label.glyph().to_string(),
                confidence,
                probabilities: classification.scores,
                predicted_at: now,
            },
            storage_warning,
        })
    }

    /// Log one page render
    pub async fn record_visit(&self, page_name: &str, now: Timestamp) -> Result<()> {
        let store = self.store.clone();
        let page = page_name.to_string();
        let result = tokio::task::spawn_blocking(move || store.record_visit(&page, now))
            .await
            .map_err(|e| Error::internal(format!("visit logging task failed: {e}")))?;

        match &result {
            Ok(()) => {
                self.metrics.record_visit();
                metrics::counter!("emolens_page_visits_total", "page" => page_name.to_string())
                    .increment(1);
            }
            Err(_) => {
                self.metrics.record_storage_failure();
                metrics::counter!("emolens_errors_total", "kind" => "storage").increment(1);
            }
        }
        result
    }

    async fn record_prediction(
        &self,
        raw_text: String,
        label: EmotionCategory,
        confidence: f64,
        now: Timestamp,
    ) -> Result<()> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            store.record_prediction(&raw_text, label, confidence, now)
        })
        .await
        .map_err(|e| Error::storage(format!("logging task failed: {e}")))?
    }
}
