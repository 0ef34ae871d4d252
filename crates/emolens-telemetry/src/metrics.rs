//! In-process counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cheap-to-clone counters shared by every request handler
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    page_visits: AtomicU64,
    submissions: AtomicU64,
    predictions: AtomicU64,
    validation_rejections: AtomicU64,
    classification_failures: AtomicU64,
    storage_failures: AtomicU64,
    classification_latency_us: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub fn record_visit(&self) {
        self.inner.page_visits.fetch_add(1, Ordering::Relaxed);
    }

    /// Any text submitted for classification, successful or not
    pub fn record_submission(&self) {
        self.inner.submissions.fetch_add(1, Ordering::Relaxed);
    }

    /// A successful classification and its latency
    pub fn record_prediction(&self, latency_us: u64) {
        self.inner.predictions.fetch_add(1, Ordering::Relaxed);
        self.inner
            .classification_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
    }

    pub fn record_validation_rejection(&self) {
        self.inner
            .validation_rejections
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classification_failure(&self) {
        self.inner
            .classification_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_storage_failure(&self) {
        self.inner.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            page_visits: self.inner.page_visits.load(Ordering::Relaxed),
            submissions: self.inner.submissions.load(Ordering::Relaxed),
            predictions: self.inner.predictions.load(Ordering::Relaxed),
            validation_rejections: self.inner.validation_rejections.load(Ordering::Relaxed),
            classification_failures: self.inner.classification_failures.load(Ordering::Relaxed),
            storage_failures: self.inner.storage_failures.load(Ordering::Relaxed),
            classification_latency_us: self
                .inner
                .classification_latency_us
                .load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub page_visits: u64,
    pub submissions: u64,
    pub predictions: u64,
    pub validation_rejections: u64,
    pub classification_failures: u64,
    pub storage_failures: u64,
    pub classification_latency_us: u64,
}

impl MetricsSnapshot {
    /// Mean classification latency over successful predictions
    pub fn avg_classification_latency_us(&self) -> u64 {
        if self.predictions == 0 {
            0
        } else {
            self.classification_latency_us / self.predictions
        }
    }

    /// Share of submissions that produced a prediction
    pub fn success_rate(&self) -> f64 {
        if self.submissions == 0 {
            0.0
        } else {
            self.predictions as f64 / self.submissions as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let metrics = MetricsCollector::new();

        metrics.record_visit();
        metrics.record_submission();
        metrics.record_prediction(4000);
        metrics.record_submission();
        metrics.record_prediction(2000);
        metrics.record_submission();
        metrics.record_validation_rejection();
        metrics.record_storage_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.page_visits, 1);
        assert_eq!(snapshot.submissions, 3);
        assert_eq!(snapshot.predictions, 2);
        assert_eq!(snapshot.validation_rejections, 1);
        assert_eq!(snapshot.storage_failures, 1);
        assert_eq!(snapshot.classification_failures, 0);
        assert_eq!(snapshot.avg_classification_latency_us(), 3000);
        assert!((snapshot.success_rate() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = MetricsCollector::new();
        let other = metrics.clone();
        other.record_classification_failure();

        assert_eq!(metrics.snapshot().classification_failures, 1);
        assert_eq!(MetricsCollector::default().snapshot().avg_classification_latency_us(), 0);
    }
}
