//! Test doubles shared by the web integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use emolens_classifiers::{ClassificationResult, Classifier};
use emolens_core::{EmotionCategory, EmotionScores, Error, Result, Timestamp};
use emolens_telemetry::{PageVisit, PredictionRecord, Store};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Always answers with the same label and scores
pub struct FixedClassifier {
    label: EmotionCategory,
    scores: EmotionScores,
    calls: AtomicUsize,
}

impl FixedClassifier {
    /// `label` gets `top`, the rest share the remainder evenly
    pub fn new(label: EmotionCategory, top: f64) -> Self {
        let rest = (1.0 - top) / (EmotionCategory::COUNT - 1) as f64;
        let mut values = [rest; EmotionCategory::COUNT];
        values[label.index()] = top;
        Self {
            label,
            scores: EmotionScores::new(values),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut result = ClassificationResult::new(self.label, self.scores);
        result.latency_us = 120;
        Ok(result)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Model unavailable
pub struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        Err(Error::classifier("model not loaded"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Refuses every input with a validation error of its own
pub struct RejectingClassifier;

#[async_trait]
impl Classifier for RejectingClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        Err(Error::validation("input cannot be vectorized"))
    }

    fn name(&self) -> &str {
        "rejecting"
    }
}

/// In-memory store that keeps rows in insertion order
#[derive(Default)]
pub struct MemoryStore {
    visits: Mutex<Vec<PageVisit>>,
    predictions: Mutex<Vec<PredictionRecord>>,
}

impl Store for MemoryStore {
    fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    fn record_visit(&self, page_name: &str, visited_at: Timestamp) -> Result<()> {
        self.visits.lock().push(PageVisit {
            page_name: page_name.to_string(),
            visited_at,
        });
        Ok(())
    }

    fn record_prediction(
        &self,
        raw_text: &str,
        label: EmotionCategory,
        confidence: f64,
        predicted_at: Timestamp,
    ) -> Result<()> {
        self.predictions.lock().push(PredictionRecord {
            raw_text: raw_text.to_string(),
            predicted_label: label,
            confidence,
            predicted_at,
        });
        Ok(())
    }

    fn list_visits(&self) -> Result<Vec<PageVisit>> {
        Ok(self.visits.lock().clone())
    }

    fn list_predictions(&self) -> Result<Vec<PredictionRecord>> {
        Ok(self.predictions.lock().clone())
    }
}

/// Every operation fails as if the disk were gone
pub struct FailingStore;

impl Store for FailingStore {
    fn ensure_schema(&self) -> Result<()> {
        Err(Error::storage("disk I/O error"))
    }

    fn record_visit(&self, _page_name: &str, _visited_at: Timestamp) -> Result<()> {
        Err(Error::storage("disk I/O error"))
    }

    fn record_prediction(
        &self,
        _raw_text: &str,
        _label: EmotionCategory,
        _confidence: f64,
        _predicted_at: Timestamp,
    ) -> Result<()> {
        Err(Error::storage("disk I/O error"))
    }

    fn list_visits(&self) -> Result<Vec<PageVisit>> {
        Err(Error::storage("disk I/O error"))
    }

    fn list_predictions(&self) -> Result<Vec<PredictionRecord>> {
        Err(Error::storage("disk I/O error"))
    }
}

/// Gains one row every time it is scanned, like a store under a steady writer
#[derive(Default)]
pub struct GrowingStore {
    inner: MemoryStore,
}

impl Store for GrowingStore {
    fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    fn record_visit(&self, page_name: &str, visited_at: Timestamp) -> Result<()> {
        self.inner.record_visit(page_name, visited_at)
    }

    fn record_prediction(
        &self,
        raw_text: &str,
        label: EmotionCategory,
        confidence: f64,
        predicted_at: Timestamp,
    ) -> Result<()> {
        self.inner
            .record_prediction(raw_text, label, confidence, predicted_at)
    }

    fn list_visits(&self) -> Result<Vec<PageVisit>> {
        self.inner.record_visit("Home", emolens_core::now_ist())?;
        self.inner.list_visits()
    }

    fn list_predictions(&self) -> Result<Vec<PredictionRecord>> {
        self.inner
            .record_prediction("more", EmotionCategory::Sadness, 0.5, emolens_core::now_ist())?;
        self.inner.list_predictions()
    }
}
